//! Graph construction from stored records

use crate::graph::{NodeAttributes, ReferenceEdge, RelationshipGraph};
use docgraph_record::{CanonicalRef, DocumentFile, DocumentId, DocumentRecord, IdError, Preamble};
use docgraph_refs::{ReferenceNormalizer, RelationKind};

/// Builds a [`RelationshipGraph`] one record at a time
///
/// Edge direction per kind:
/// - `requires`, `replaces`: target → record
/// - `superseded_by`, `mentions`: record → target
#[derive(Debug)]
pub struct RelationshipGraphBuilder<'a> {
    normalizer: &'a ReferenceNormalizer,
    include_mentions: bool,
    graph: RelationshipGraph,
    records: usize,
}

impl<'a> RelationshipGraphBuilder<'a> {
    /// Create builder; mention edges are off
    #[must_use]
    pub fn new(normalizer: &'a ReferenceNormalizer) -> Self {
        Self {
            normalizer,
            include_mentions: false,
            graph: RelationshipGraph::new(),
            records: 0,
        }
    }

    /// Enable or disable `mentions` edges
    #[must_use]
    pub fn with_mentions(mut self, include: bool) -> Self {
        self.include_mentions = include;
        self
    }

    fn attributes(preamble: &Preamble, contributors: Option<u64>) -> NodeAttributes {
        NodeAttributes {
            title: preamble.text("title").map(str::to_string),
            status: preamble.text("status").map(str::to_string),
            layer: preamble.text("layer").map(str::to_string),
            contributors,
        }
    }

    fn add_edge(&mut self, own: &CanonicalRef, target: CanonicalRef, kind: RelationKind) {
        let edge = if kind.points_inward() {
            ReferenceEdge::new(target, own.clone(), kind)
        } else {
            ReferenceEdge::new(own.clone(), target, kind)
        };
        self.graph.add_edge(&edge);
    }

    fn add(
        &mut self,
        id: DocumentId,
        preamble: &Preamble,
        contributors: Option<u64>,
        mentions: &[CanonicalRef],
    ) {
        let own = CanonicalRef::from(id);
        self.graph
            .upsert_node(&own, Self::attributes(preamble, contributors));
        for (kind, targets) in self.normalizer.structured(preamble) {
            for target in targets {
                self.add_edge(&own, target, kind);
            }
        }
        if self.include_mentions {
            for target in mentions {
                if !target.is_document(id) {
                    self.add_edge(&own, target.clone(), RelationKind::Mentions);
                }
            }
        }
        self.records += 1;
    }

    /// Add a resolved record without metadata
    pub fn add_record(&mut self, record: &DocumentRecord) {
        self.add(record.id, &record.preamble, None, &[]);
    }

    /// Add a stored document, using its metadata and stored mentions
    ///
    /// # Errors
    /// [`IdError`] if the stored preamble has no resolvable identifier
    pub fn add_document(&mut self, file: &DocumentFile) -> Result<DocumentId, IdError> {
        let id = file.preamble().identifier()?;
        let mentions = file
            .insights
            .as_ref()
            .map_or(&[][..], |i| i.references.as_slice());
        self.add(id, file.preamble(), file.contributors(), mentions);
        Ok(id)
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> RelationshipGraph {
        tracing::info!(
            records = self.records,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "relationship graph built"
        );
        self.graph
    }
}
