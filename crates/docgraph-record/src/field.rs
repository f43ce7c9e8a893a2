//! Header field schema and values
//!
//! The schema is closed: only the keys listed here survive into a record.

use serde::{Deserialize, Serialize};

/// Canonical key holding the document identifier
pub const ID_FIELD: &str = "bip";

/// Key under which the compliance score is stored, after all fields
pub const SCORE_KEY: &str = "compliance_score";

/// Required header fields, in emission order
pub const REQUIRED_FIELDS: [&str; 8] = [
    ID_FIELD,
    "title",
    "author",
    "comments_uri",
    "status",
    "type",
    "created",
    "license",
];

/// Optional header fields, in emission order
pub const OPTIONAL_FIELDS: [&str; 8] = [
    "layer",
    "discussions_to",
    "comments_summary",
    "license_code",
    "post_history",
    "requires",
    "replaces",
    "superseded_by",
];

/// Fields whose values are line lists rather than text
pub const LIST_FIELDS: [&str; 2] = ["author", "license"];

/// Fields holding comma-separated document references
pub const REFERENCE_FIELDS: [&str; 3] = ["requires", "replaces", "superseded_by"];

/// Whether `key` holds a line list
#[inline]
#[must_use]
pub fn is_list_field(key: &str) -> bool {
    LIST_FIELDS.contains(&key)
}

/// Whether `key` belongs to the schema
#[inline]
#[must_use]
pub fn is_schema_field(key: &str) -> bool {
    REQUIRED_FIELDS.contains(&key) || OPTIONAL_FIELDS.contains(&key)
}

/// All schema keys in emission order
pub fn schema_fields() -> impl Iterator<Item = &'static str> {
    REQUIRED_FIELDS.into_iter().chain(OPTIONAL_FIELDS)
}

/// Header field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single trimmed string
    Text(String),
    /// One entry per non-empty line
    List(Vec<String>),
}

impl FieldValue {
    /// Text content, if this is a text value
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// List entries, if this is a list value
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_sixteen_fields_in_order() {
        let fields: Vec<_> = schema_fields().collect();
        assert_eq!(fields.len(), 16);
        assert_eq!(fields[0], "bip");
        assert_eq!(fields[8], "layer");
        assert_eq!(fields[15], "superseded_by");
    }

    #[test]
    fn list_fields_are_required() {
        for key in LIST_FIELDS {
            assert!(REQUIRED_FIELDS.contains(&key));
        }
        assert!(is_list_field("author"));
        assert!(!is_list_field("title"));
    }

    #[test]
    fn field_value_untagged_json() {
        let text: FieldValue = serde_json::from_str("\"Final\"").unwrap();
        assert_eq!(text.as_text(), Some("Final"));
        let list: FieldValue = serde_json::from_str("[\"a\", \"b\"]").unwrap();
        assert_eq!(list.as_list().map(<[String]>::len), Some(2));
    }
}
