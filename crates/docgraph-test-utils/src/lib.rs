//! Testing utilities for docgraph workspace
//!
//! Shared document fixtures and deterministic stand-ins for the external
//! collaborators (classifier, history source).

#![allow(missing_docs)]

use async_trait::async_trait;
use docgraph_enrich::{ClassifierError, DependencyClassifier, HistoryError, HistorySource};
use docgraph_record::{CanonicalRef, DocumentId, Revision};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const ALL_HEADINGS: &str = "\
==Abstract==
Abstract text.

==Motivation==
==Specification==
==Rationale==
==Backwards Compatibility==
==Reference Implementation==
==Security Considerations==
==Copyright==
==References==
";

/// Header fields of a fixture document
#[derive(Debug, Clone)]
pub struct DocSpec {
    pub id: String,
    pub title: String,
    pub status: String,
    pub authors: Vec<String>,
    pub requires: Option<String>,
    pub superseded_by: Option<String>,
    pub body: String,
    pub all_headings: bool,
}

impl DocSpec {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            status: "Draft".to_string(),
            authors: vec!["Alice Example <alice@example.org>".to_string()],
            requires: None,
            superseded_by: None,
            body: String::new(),
            all_headings: true,
        }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn authors(mut self, authors: &[&str]) -> Self {
        self.authors = authors.iter().map(|a| (*a).to_string()).collect();
        self
    }

    pub fn requires(mut self, requires: &str) -> Self {
        self.requires = Some(requires.to_string());
        self
    }

    pub fn superseded_by(mut self, target: &str) -> Self {
        self.superseded_by = Some(target.to_string());
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn without_headings(mut self) -> Self {
        self.all_headings = false;
        self
    }

    /// Render as a mediawiki document with every required field
    pub fn render(&self) -> String {
        let mut out = String::from("<pre>\n");
        out.push_str(&format!("  BIP: {}\n", self.id));
        out.push_str("  Layer: Applications\n");
        out.push_str(&format!("  Title: {}\n", self.title));
        let mut authors = self.authors.iter();
        if let Some(first) = authors.next() {
            out.push_str(&format!("  Author: {first}\n"));
            for rest in authors {
                out.push_str(&format!("          {rest}\n"));
            }
        }
        out.push_str(&format!(
            "  Comments-URI: https://example.org/wiki/Comments:BIP-{}\n",
            self.id
        ));
        out.push_str(&format!("  Status: {}\n", self.status));
        out.push_str("  Type: Standards Track\n");
        out.push_str("  Created: 2020-01-01\n");
        out.push_str("  License: BSD-2-Clause\n");
        if let Some(requires) = &self.requires {
            out.push_str(&format!("  Requires: {requires}\n"));
        }
        if let Some(target) = &self.superseded_by {
            out.push_str(&format!("  Superseded-By: {target}\n"));
        }
        out.push_str("</pre>\n\n");
        if self.all_headings {
            out.push_str(ALL_HEADINGS);
        }
        out.push_str(&self.body);
        out.push('\n');
        out
    }
}

/// Write `name` with `contents` under `dir`
pub fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Small corpus: 1 ← 2 (requires), 2 → 3 (superseded), one headerless file
/// and one draft without a numeric id
pub fn sample_corpus() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_source(
        dir.path(),
        "bip-0001.mediawiki",
        &DocSpec::new("1", "Process").status("Active").render(),
    );
    write_source(
        dir.path(),
        "bip-0002.mediawiki",
        &DocSpec::new("0002", "Second")
            .requires("bip-0001")
            .superseded_by("3")
            .authors(&["Alice Example <alice@example.org>", "Bob <bob@example.org>"])
            .body("This builds on BIP 1 and mentions BIP-0009. See also BIP 2.")
            .render(),
    );
    write_source(
        dir.path(),
        "bip-0003.md",
        &DocSpec::new("3", "Third").status("Final").without_headings().render(),
    );
    write_source(dir.path(), "README.mediawiki", "No header here.\n");
    write_source(
        dir.path(),
        "bip-draft.mediawiki",
        &DocSpec::new("XX", "Unnumbered").render(),
    );
    dir
}

/// Classifier returning canned answers and recording calls
#[derive(Debug, Default)]
pub struct FakeClassifier {
    answers: HashMap<u32, Vec<CanonicalRef>>,
    fail_for: Vec<u32>,
    calls: Mutex<Vec<Option<DocumentId>>>,
}

impl FakeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, id: u32, deps: &[u32]) -> Self {
        self.answers
            .insert(id, deps.iter().copied().map(CanonicalRef::Numbered).collect());
        self
    }

    pub fn fail_for(mut self, id: u32) -> Self {
        self.fail_for.push(id);
        self
    }

    pub fn calls(&self) -> Vec<Option<DocumentId>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DependencyClassifier for FakeClassifier {
    async fn classify(
        &self,
        _text: &str,
        own: Option<DocumentId>,
    ) -> Result<Vec<CanonicalRef>, ClassifierError> {
        self.calls.lock().push(own);
        let id = own.map(DocumentId::get);
        if id.is_some_and(|id| self.fail_for.contains(&id)) {
            return Err(ClassifierError::MalformedResponse("canned failure".into()));
        }
        Ok(id
            .and_then(|id| self.answers.get(&id).cloned())
            .unwrap_or_default())
    }
}

/// History source with fixed revisions per file name
#[derive(Debug, Default)]
pub struct StaticHistory {
    by_file: HashMap<String, Vec<Revision>>,
}

impl StaticHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file_name: &str, revisions: Vec<Revision>) -> Self {
        self.by_file.insert(file_name.to_string(), revisions);
        self
    }
}

#[async_trait]
impl HistorySource for StaticHistory {
    async fn history(&self, path: &Path) -> Result<Vec<Revision>, HistoryError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.by_file.get(&name).cloned().unwrap_or_default())
    }
}
