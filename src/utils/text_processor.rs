use regex::Regex;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Collapse every run of whitespace (newlines included) into a single space.
///
/// Leading and trailing runs become one space each; nothing is trimmed.
pub fn normalize_whitespace(text: &str) -> String {
    whitespace_re().replace_all(text, " ").into_owned()
}

/// Join normalized fragments into one stream. Each fragment is followed by a
/// single space, so the stream always ends with one.
pub fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    let mut full_text = String::new();
    for fragment in fragments {
        full_text.push_str(fragment.as_ref());
        full_text.push(' ');
    }
    full_text
}
