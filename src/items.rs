//! # Request Items
//!
//! Classifies command-line tokens into request items:
//!
//! ```text
//! name:=<json>    raw JSON field     meta.count:=5
//! name=<text>     string field       user.name=widget
//! Name:<text>     header             X-Trace:abc123
//! ```
//!
//! Separators are tried in that order. The first one present anywhere in
//! the token decides the grammar, and the token is split at its leftmost
//! occurrence, so `a:b:c` is the header `a` with value `b:c` and
//! `a:=[1,2]` is never read as a header.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

const RAW_JSON_SEPARATOR: &str = ":=";
const FIELD_SEPARATOR: &str = "=";
const HEADER_SEPARATOR: &str = ":";

/// A `.`-separated location inside the request document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottedPath {
    segments: Vec<String>,
}

impl DottedPath {
    /// Split a name on `.`. Empty segments are kept as-is, so the empty
    /// name addresses the root-level key `""`.
    pub fn parse(name: &str) -> Self {
        Self {
            segments: name.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Intermediate keys and the leaf key.
    pub fn split_leaf(&self) -> (&[String], &str) {
        match self.segments.split_last() {
            Some((leaf, parents)) => (parents, leaf.as_str()),
            None => (&[], ""),
        }
    }
}

impl fmt::Display for DottedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// A classified command-line token.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestItem {
    /// `name:=<json>`
    RawJson { path: DottedPath, value: Value },
    /// `name=<text>`, always a JSON string
    Field { path: DottedPath, value: String },
    /// `Name:<text>`
    Header { name: String, value: String },
}

/// Classify a single token.
pub fn classify(token: &str) -> Result<RequestItem> {
    if let Some((name, raw)) = token.split_once(RAW_JSON_SEPARATOR) {
        let value = serde_json::from_str(raw).map_err(|source| Error::InvalidJson {
            token: token.to_string(),
            raw: raw.to_string(),
            source,
        })?;
        tracing::debug!("'{}' classified as raw JSON field", token);
        return Ok(RequestItem::RawJson {
            path: DottedPath::parse(name),
            value,
        });
    }

    if let Some((name, value)) = token.split_once(FIELD_SEPARATOR) {
        tracing::debug!("'{}' classified as field", token);
        return Ok(RequestItem::Field {
            path: DottedPath::parse(name),
            value: value.to_string(),
        });
    }

    if let Some((name, value)) = token.split_once(HEADER_SEPARATOR) {
        tracing::debug!("'{}' classified as header", token);
        return Ok(RequestItem::Header {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    Err(Error::InvalidInput {
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_json_should_take_priority_over_other_separators() {
        let item = classify("a:=[1,2]").unwrap();
        assert_eq!(
            item,
            RequestItem::RawJson {
                path: DottedPath::parse("a"),
                value: json!([1, 2]),
            }
        );

        // '=' and ':' inside the JSON value do not matter
        let item = classify("opts:={\"k\":\"x=y\"}").unwrap();
        assert_eq!(
            item,
            RequestItem::RawJson {
                path: DottedPath::parse("opts"),
                value: json!({"k": "x=y"}),
            }
        );
    }

    #[test]
    fn raw_json_should_win_even_when_equals_appears_earlier() {
        // ':=' is checked first, wherever it occurs
        let item = classify("a=b:=1").unwrap();
        assert_eq!(
            item,
            RequestItem::RawJson {
                path: DottedPath::parse("a=b"),
                value: json!(1),
            }
        );
    }

    #[test]
    fn field_should_split_at_first_equals() {
        let item = classify("query=a=b").unwrap();
        assert_eq!(
            item,
            RequestItem::Field {
                path: DottedPath::parse("query"),
                value: "a=b".to_string(),
            }
        );
    }

    #[test]
    fn field_should_win_over_header_separator() {
        let item = classify("url=http://example.com").unwrap();
        assert_eq!(
            item,
            RequestItem::Field {
                path: DottedPath::parse("url"),
                value: "http://example.com".to_string(),
            }
        );
    }

    #[test]
    fn field_value_should_never_be_parsed_as_json() {
        let item = classify("count=5").unwrap();
        assert_eq!(
            item,
            RequestItem::Field {
                path: DottedPath::parse("count"),
                value: "5".to_string(),
            }
        );
    }

    #[test]
    fn header_should_split_at_first_colon() {
        let item = classify("a:b:c").unwrap();
        assert_eq!(
            item,
            RequestItem::Header {
                name: "a".to_string(),
                value: "b:c".to_string(),
            }
        );
    }

    #[test]
    fn empty_name_should_be_accepted() {
        let item = classify("=value").unwrap();
        assert_eq!(
            item,
            RequestItem::Field {
                path: DottedPath::parse(""),
                value: "value".to_string(),
            }
        );
        assert_eq!(DottedPath::parse("").segments(), [String::new()]);
    }

    #[test]
    fn token_without_separator_should_be_invalid() {
        let err = classify("justaword").unwrap_err();
        assert!(matches!(err, Error::InvalidInput { token } if token == "justaword"));
    }

    #[test]
    fn unparsable_raw_json_should_name_token_and_fragment() {
        let err = classify("x:={bad").unwrap_err();
        match err {
            Error::InvalidJson { token, raw, .. } => {
                assert_eq!(token, "x:={bad");
                assert_eq!(raw, "{bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dotted_path_should_split_leaf() {
        let path = DottedPath::parse("a.b.c");
        let (parents, leaf) = path.split_leaf();
        assert_eq!(parents, ["a".to_string(), "b".to_string()]);
        assert_eq!(leaf, "c");
        assert_eq!(path.to_string(), "a.b.c");
    }
}
