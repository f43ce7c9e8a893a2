//! Normalized preamble (the per-document field record)
//!
//! A [`Preamble`] always carries every schema field in schema order, with
//! absent fields set to `None`, followed by the compliance score.

use crate::field::{schema_fields, FieldValue, ID_FIELD};
use crate::id::{DocumentId, IdError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered, schema-restricted field map plus compliance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PreambleIn", into = "PreambleOut")]
pub struct Preamble {
    fields: IndexMap<String, Option<FieldValue>>,
    compliance_score: Option<f64>,
}

/// Wire shape: fields flattened, score as a trailing key
#[derive(Serialize)]
struct PreambleOut {
    #[serde(flatten)]
    fields: IndexMap<String, Option<FieldValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compliance_score: Option<f64>,
}

/// Read shape: values that do not fit a field are dropped, not fatal
#[derive(Deserialize)]
struct PreambleIn {
    #[serde(flatten)]
    fields: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    compliance_score: Option<f64>,
}

impl Default for Preamble {
    fn default() -> Self {
        Self::new()
    }
}

impl Preamble {
    /// Preamble with every schema field set to null
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: schema_fields().map(|k| (k.to_string(), None)).collect(),
            compliance_score: None,
        }
    }

    /// Build from arbitrary parsed fields
    ///
    /// Non-schema keys are dropped; missing schema keys become null.
    #[must_use]
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<FieldValue>)>,
        K: AsRef<str>,
    {
        let mut preamble = Self::new();
        for (key, value) in fields {
            if let Some(value) = value {
                preamble.set(key.as_ref(), value);
            }
        }
        preamble
    }

    /// Set a schema field; returns `false` if `key` is not in the schema
    pub fn set(&mut self, key: &str, value: FieldValue) -> bool {
        match self.fields.get_mut(key) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Field value, if present and non-null
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key).and_then(Option::as_ref)
    }

    /// Text value of a field
    #[inline]
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// List value of a field (empty if absent or not a list)
    #[inline]
    #[must_use]
    pub fn list(&self, key: &str) -> &[String] {
        self.get(key).and_then(FieldValue::as_list).unwrap_or(&[])
    }

    /// Iterate `(key, value)` in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Compliance score (0–100), if computed
    #[inline]
    #[must_use]
    pub fn compliance_score(&self) -> Option<f64> {
        self.compliance_score
    }

    /// Attach the compliance score
    #[inline]
    pub fn set_compliance_score(&mut self, score: f64) {
        self.compliance_score = Some(score);
    }

    /// Raw identifier text
    #[inline]
    #[must_use]
    pub fn raw_identifier(&self) -> Option<&str> {
        self.text(ID_FIELD)
    }

    /// Resolve the canonical identifier
    ///
    /// # Errors
    /// [`IdError`] if the identifier field is absent or not purely numeric
    pub fn identifier(&self) -> Result<DocumentId, IdError> {
        self.raw_identifier().ok_or(IdError::Empty)?.parse()
    }
}

impl From<PreambleIn> for Preamble {
    fn from(repr: PreambleIn) -> Self {
        let mut preamble = Self::from_fields(
            repr.fields
                .into_iter()
                .map(|(k, v)| (k, serde_json::from_value::<FieldValue>(v).ok())),
        );
        preamble.compliance_score = repr.compliance_score;
        preamble
    }
}

impl From<Preamble> for PreambleOut {
    fn from(preamble: Preamble) -> Self {
        Self {
            fields: preamble.fields,
            compliance_score: preamble.compliance_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Preamble {
        let mut p = Preamble::new();
        p.set("bip", "0032".into());
        p.set("title", "Hierarchical Deterministic Wallets".into());
        p.set("author", vec!["Pieter Wuille".to_string()].into());
        p.set_compliance_score(88.24);
        p
    }

    #[test]
    fn new_preamble_has_all_fields_null() {
        let p = Preamble::new();
        assert_eq!(p.iter().count(), 16);
        assert!(p.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn set_rejects_unknown_keys() {
        let mut p = Preamble::new();
        assert!(!p.set("proposed_replacement", "1".into()));
        assert!(p.set("status", "Final".into()));
        assert_eq!(p.text("status"), Some("Final"));
    }

    #[test]
    fn serialized_order_is_schema_then_score() {
        let json = serde_json::to_string(&sample()).unwrap();
        let bip = json.find("\"bip\"").unwrap();
        let superseded = json.find("\"superseded_by\"").unwrap();
        let score = json.find("\"compliance_score\"").unwrap();
        assert!(bip < superseded && superseded < score);
        assert!(json.contains("\"layer\":null"));
    }

    #[test]
    fn json_round_trip() {
        let p = sample();
        let json = serde_json::to_string_pretty(&p).unwrap();
        let back: Preamble = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert_eq!(back.identifier().unwrap(), DocumentId::new(32));
    }

    #[test]
    fn deserialize_conforms_to_schema() {
        let json = r#"{"title": "T", "extra": "dropped", "contributors": 3, "bip": "9"}"#;
        let p: Preamble = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = p.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.first(), Some(&"bip"));
        assert_eq!(keys.len(), 16);
        assert!(p.get("extra").is_none());
        assert_eq!(p.compliance_score(), None);
    }

    #[test]
    fn list_accessor_defaults_to_empty() {
        let p = sample();
        assert_eq!(p.list("author"), ["Pieter Wuille".to_string()]);
        assert!(p.list("license").is_empty());
        assert!(p.list("title").is_empty());
    }
}
