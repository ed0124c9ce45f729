use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use super::record::HormoneRecord;

/// Piece of the text stream produced by [`HeaderSet::split_keep_headers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Header(&'a str),
}

impl<'a> Segment<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Segment::Text(s) | Segment::Header(s) => *s,
        }
    }
}

/// Known section headers and the pattern that finds them.
#[derive(Debug, Clone)]
pub struct HeaderSet {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    pattern: Regex,
}

impl HeaderSet {
    /// Build the header alternation. Earlier headers win when two match at
    /// the same position.
    pub fn new<I, S>(headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();

        if headers.is_empty() {
            anyhow::bail!("Header set must not be empty");
        }
        if headers.iter().any(|h| h.is_empty()) {
            anyhow::bail!("Header set must not contain empty headers");
        }

        let alternation = headers
            .iter()
            .map(|h| regex::escape(h))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("(?:{})", alternation))?;

        let mut index = HashMap::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            index.entry(header.clone()).or_insert(i);
        }

        Ok(Self {
            headers,
            index,
            pattern,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn position(&self, text: &str) -> Option<usize> {
        self.index.get(text).copied()
    }

    /// Split `text` on every header occurrence, keeping the headers.
    ///
    /// The result alternates text and header segments and always starts and
    /// ends with a (possibly empty) text segment.
    pub fn split_keep_headers<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut last = 0;

        for m in self.pattern.find_iter(text) {
            segments.push(Segment::Text(&text[last..m.start()]));
            segments.push(Segment::Header(m.as_str()));
            last = m.end();
        }
        segments.push(Segment::Text(&text[last..]));

        segments
    }

    /// Partition `text` into a fresh record keyed by this header set.
    ///
    /// A body is the text between a header and the next header, with spaces
    /// and commas stripped from both ends. A repeated header keeps the body of
    /// its last occurrence. Text before the first header is dropped.
    pub fn categorize(&self, text: &str) -> HormoneRecord {
        let mut record = HormoneRecord::new(self.headers.iter().cloned());
        let mut current: Option<usize> = None;

        for segment in self.split_keep_headers(text) {
            match segment {
                Segment::Header(header) => current = self.position(header),
                Segment::Text(section) => {
                    let section = section.trim();
                    let Some(pos) = current else { continue };
                    if section.is_empty() {
                        continue;
                    }
                    let hormones = section.trim_matches(|c: char| c == ',' || c == ' ');
                    debug!("{} -> {:?}", self.headers[pos], hormones);
                    record.set_at(pos, hormones.to_string());
                }
            }
        }

        record
    }
}

/// One-shot [`HeaderSet::categorize`].
pub fn categorize_text<S: AsRef<str>>(text: &str, headers: &[S]) -> Result<HormoneRecord> {
    let set = HeaderSet::new(headers.iter().map(|h| h.as_ref().to_string()))?;
    Ok(set.categorize(text))
}
