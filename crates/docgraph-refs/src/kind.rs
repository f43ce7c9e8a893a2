//! Relation kinds between documents

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Kind of a directed reference between two documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Target is a prerequisite of the source
    Requires,
    /// Source replaces the target
    Replaces,
    /// Source is superseded by the target
    SupersededBy,
    /// Source mentions the target in its body
    Mentions,
}

impl RelationKind {
    /// Kinds backed by a structured header field
    pub const STRUCTURED: [Self; 3] = [Self::Requires, Self::Replaces, Self::SupersededBy];

    /// Header field carrying this relation, if any
    #[inline]
    #[must_use]
    pub const fn field(self) -> Option<&'static str> {
        match self {
            Self::Requires => Some("requires"),
            Self::Replaces => Some("replaces"),
            Self::SupersededBy => Some("superseded_by"),
            Self::Mentions => None,
        }
    }

    /// Whether an edge of this kind points from the referenced document
    /// to the referencing one
    ///
    /// `requires` and `replaces` point target → self; the rest point
    /// self → target.
    #[inline]
    #[must_use]
    pub const fn points_inward(self) -> bool {
        matches!(self, Self::Requires | Self::Replaces)
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requires => "requires",
            Self::Replaces => "replaces",
            Self::SupersededBy => "superseded_by",
            Self::Mentions => "mentions",
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_display() {
        for kind in [
            RelationKind::Requires,
            RelationKind::Replaces,
            RelationKind::SupersededBy,
            RelationKind::Mentions,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn direction() {
        assert!(RelationKind::Requires.points_inward());
        assert!(RelationKind::Replaces.points_inward());
        assert!(!RelationKind::SupersededBy.points_inward());
        assert!(!RelationKind::Mentions.points_inward());
    }

    #[test]
    fn structured_kinds_have_fields() {
        assert!(RelationKind::STRUCTURED.iter().all(|k| k.field().is_some()));
        assert_eq!(RelationKind::Mentions.field(), None);
    }
}
