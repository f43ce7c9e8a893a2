//! Reference syntax of a corpus

use serde::{Deserialize, Serialize};

/// How a corpus writes references to its own documents
///
/// `id_prefix` appears in structured fields and storage keys (`bip-0032`);
/// `mention_keyword` introduces free-text mentions (`BIP 32`, `BIP-0032`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSyntax {
    /// Prefix stripped from structured reference tokens, case-insensitively
    pub id_prefix: String,
    /// Literal keyword introducing a mention, case-sensitive
    pub mention_keyword: String,
}

impl Default for ReferenceSyntax {
    fn default() -> Self {
        Self {
            id_prefix: "bip-".to_string(),
            mention_keyword: "BIP".to_string(),
        }
    }
}

impl ReferenceSyntax {
    /// Create syntax with an explicit prefix and keyword
    #[must_use]
    pub fn new(id_prefix: impl Into<String>, mention_keyword: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            mention_keyword: mention_keyword.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_bip() {
        let syntax = ReferenceSyntax::default();
        assert_eq!(syntax.id_prefix, "bip-");
        assert_eq!(syntax.mention_keyword, "BIP");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let syntax: ReferenceSyntax = toml::from_str(r#"id_prefix = "document-""#).unwrap();
        assert_eq!(syntax, ReferenceSyntax::new("document-", "BIP"));
    }
}
