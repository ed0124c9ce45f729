use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Gland header to hormone text, in header order.
///
/// Every header is present; headers never seen in the text map to `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HormoneRecord {
    entries: Vec<(String, String)>,
}

impl HormoneRecord {
    /// Fresh record with an empty body for every header
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: headers
                .into_iter()
                .map(|h| (h.into(), String::new()))
                .collect(),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, body)| body.as_str())
    }

    pub(crate) fn set_at(&mut self, index: usize, body: String) {
        self.entries[index].1 = body;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(h, b)| (h.as_str(), b.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Headers that received a non-empty body
    pub fn matched(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, body)| !body.is_empty())
            .map(|(header, _)| header)
    }
}

impl Serialize for HormoneRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (header, body) in &self.entries {
            map.serialize_entry(header, body)?;
        }
        map.end()
    }
}

/// Python `repr` quoting: single quotes unless the text holds a single
/// quote and no double quote.
fn quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    write!(f, "{}", quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            c if c == quote => write!(f, "\\{}", c)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "{}", quote)
}

/// Mapping form: `{'Liver': 'IGF-1', 'Adrenal': ''}`
impl fmt::Display for HormoneRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (header, body)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            quoted(f, header)?;
            f.write_str(": ")?;
            quoted(f, body)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_all_empty() {
        let record = HormoneRecord::new(["Liver", "Kidney"]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("Liver"), Some(""));
        assert_eq!(record.get("Thymus"), None);
        assert_eq!(record.matched().count(), 0);
    }

    #[test]
    fn test_display_and_json_keep_order() {
        let mut record = HormoneRecord::new(["Kidney", "Adrenal"]);
        record.set_at(1, "Cortisol, Aldosterone".to_string());

        assert_eq!(
            record.to_string(),
            "{'Kidney': '', 'Adrenal': 'Cortisol, Aldosterone'}"
        );
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"Kidney":"","Adrenal":"Cortisol, Aldosterone"}"#
        );
        assert_eq!(record.matched().collect::<Vec<_>>(), vec!["Adrenal"]);
    }

    #[test]
    fn test_display_escapes_quotes() {
        let mut record = HormoneRecord::new(["Liver"]);
        record.set_at(0, "it's".to_string());
        assert_eq!(record.to_string(), r#"{'Liver': "it's"}"#);

        record.set_at(0, r#"it's "IGF-1""#.to_string());
        assert_eq!(record.to_string(), r#"{'Liver': 'it\'s "IGF-1"'}"#);
    }
}
