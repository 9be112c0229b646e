//! Tool Input Protocol
//!
//! Tools receive a flat `key=value;key=value` string from the planner.
//! [`ToolInput::parse`] splits it into a field map; each tool then coerces
//! the string values it needs (money, month counts, names).
//!
//! Parsing is deliberately literal: no trimming, no case folding. A segment
//! must contain exactly one `=`.

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

/// Failure to decompose or read a tool input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolInputError {
    /// A `;`-separated segment did not split into exactly `key` and `value`
    #[error("malformed segment '{segment}', expected key=value")]
    Malformed { segment: String },

    /// A required key was absent after parsing
    #[error("missing field '{0}'")]
    MissingField(String),
}

/// Parsed `key=value;key=value` record
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolInput {
    fields: HashMap<String, String>,
}

impl ToolInput {
    /// Parse a raw tool input string.
    ///
    /// A repeated key keeps its last value.
    pub fn parse(raw: &str) -> Result<Self, ToolInputError> {
        let mut fields = HashMap::new();

        for segment in raw.split(';') {
            let mut parts = segment.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => {
                    fields.insert(key.to_string(), value.to_string());
                }
                _ => {
                    return Err(ToolInputError::Malformed {
                        segment: segment.to_string(),
                    });
                }
            }
        }

        Ok(Self { fields })
    }

    /// Look up a field by exact key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Look up a field that must be present
    pub fn require(&self, key: &str) -> Result<&str, ToolInputError> {
        self.get(key)
            .ok_or_else(|| ToolInputError::MissingField(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromStr for ToolInput {
    type Err = ToolInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Encode key/value pairs back into the wire convention
pub fn encode_fields<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let input = ToolInput::parse("harga=250000000;dp=50000000;tenor=60").unwrap();
        assert_eq!(input.len(), 3);
        assert_eq!(input.get("harga"), Some("250000000"));
        assert_eq!(input.get("dp"), Some("50000000"));
        assert_eq!(input.get("tenor"), Some("60"));
    }

    #[test]
    fn test_parse_single_pair() {
        let input = ToolInput::parse("model=Avanza").unwrap();
        assert_eq!(input.len(), 1);
        assert_eq!(input.get("model"), Some("Avanza"));
    }

    #[test]
    fn test_segment_without_separator_is_malformed() {
        let err = ToolInput::parse("model=Avanza;tenor").unwrap_err();
        assert_eq!(
            err,
            ToolInputError::Malformed {
                segment: "tenor".into()
            }
        );
    }

    #[test]
    fn test_double_separator_is_malformed() {
        assert!(ToolInput::parse("model=a=b").is_err());
        assert!(ToolInput::parse("").is_err());
    }

    #[test]
    fn test_no_trimming_or_folding() {
        let input = ToolInput::parse("Model= Avanza").unwrap();
        assert_eq!(input.get("Model"), Some(" Avanza"));
        assert_eq!(input.get("model"), None);
    }

    #[test]
    fn test_repeated_key_keeps_last() {
        let input = ToolInput::parse("kota=Bandung;kota=Medan").unwrap();
        assert_eq!(input.len(), 1);
        assert_eq!(input.get("kota"), Some("Medan"));
    }

    #[test]
    fn test_require_reports_missing_field() {
        let input: ToolInput = "kota=Jakarta".parse().unwrap();
        assert_eq!(input.require("kota"), Ok("Jakarta"));
        assert_eq!(
            input.require("model"),
            Err(ToolInputError::MissingField("model".into()))
        );
    }

    #[test]
    fn test_encode_fields() {
        assert_eq!(encode_fields([("model", "Avanza")]), "model=Avanza");
        assert_eq!(encode_fields([("a", "1"), ("b", "2")]), "a=1;b=2");
    }
}
