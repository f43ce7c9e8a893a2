//! Batch pipeline
//!
//! Two batch passes and two query passes over a corpus:
//!
//! - **extract**: source documents → `raw.preamble` records
//! - **enrich**: stored records + sources → `metadata` and `insights`
//! - **graph**: stored records → [`RelationshipGraph`]
//! - **summary**: stored records → [`CorpusSummary`]
//!
//! Batch passes fan out one tokio task per document, bounded by a semaphore
//! of `max_concurrency` permits. A failed document is reported and skipped;
//! it never aborts the others.
//!
//! Extraction parses every source before writing anything. Sources are
//! claimed in path order, so when two sources map to one storage key the
//! first one wins and the rest are skipped as duplicates.

use crate::config::PipelineConfig;
use crate::corpus::CorpusSummary;
use crate::error::{DocumentFailure, PipelineError, StoreError};
use crate::insights::derive_insights;
use crate::source::{discover, find_source, source_stem};
use crate::store::{LoadedRecords, RecordStore, UNRESOLVED_DIR};
use docgraph_enrich::{
    classify_bounded, history_or_empty, ChatCompletionClassifier, DependencyClassifier,
    DisabledClassifier, EnrichmentMerger, HistorySource, NoHistory,
};
use docgraph_graph::{RelationshipGraph, RelationshipGraphBuilder};
use docgraph_preamble::{HeaderParser, PreambleExtractor};
use docgraph_record::{DocumentFile, DocumentId};
use docgraph_refs::ReferenceNormalizer;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Successful per-document outcome
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Written { id: DocumentId, output: PathBuf },
    Unresolved { output: PathBuf },
}

/// Where an extracted record goes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Target {
    Record(DocumentId),
    Unresolved(String),
}

/// Parsed source waiting for its write
#[derive(Debug)]
struct Extracted {
    target: Target,
    file: DocumentFile,
}

/// Task results in path order
type Results<T> = Vec<(PathBuf, Result<T, DocumentFailure>)>;

/// What a batch pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records written, by id
    pub written: Vec<(DocumentId, PathBuf)>,
    /// Sources whose identifier could not be resolved, with the bucket file
    pub unresolved: Vec<(PathBuf, PathBuf)>,
    /// Sources or records skipped, with the reason
    pub skipped: Vec<(PathBuf, DocumentFailure)>,
}

impl BatchReport {
    fn record(&mut self, path: PathBuf, result: Result<Outcome, DocumentFailure>) {
        match result {
            Ok(Outcome::Written { id, output }) => self.written.push((id, output)),
            Ok(Outcome::Unresolved { output }) => {
                tracing::warn!(path = %path.display(), output = %output.display(), "identifier unresolved");
                self.unresolved.push((path, output));
            }
            Err(failure) => {
                tracing::warn!(path = %path.display(), %failure, "document skipped");
                self.skipped.push((path, failure));
            }
        }
    }

    fn from_results(results: Results<Outcome>) -> Self {
        let mut report = Self::default();
        for (path, result) in results {
            report.record(path, result);
        }
        report.sort();
        report
    }

    fn sort(&mut self) {
        self.written.sort();
        self.unresolved.sort();
        self.skipped.sort_by(|a, b| a.0.cmp(&b.0));
    }

    /// Documents looked at
    #[must_use]
    pub fn processed(&self) -> usize {
        self.written.len() + self.unresolved.len() + self.skipped.len()
    }
}

fn input_unreadable(path: &Path, err: StoreError) -> PipelineError {
    let source = match err {
        StoreError::Io { source, .. } => source,
        other => std::io::Error::other(other.to_string()),
    };
    PipelineError::InputUnreadable {
        path: path.to_path_buf(),
        source,
    }
}

fn io_failure(err: &std::io::Error) -> DocumentFailure {
    DocumentFailure::Io(err.to_string())
}

fn unit_items(paths: Vec<PathBuf>) -> Vec<(PathBuf, ())> {
    paths.into_iter().map(|path| (path, ())).collect()
}

/// Corpus pipeline
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    normalizer: Arc<ReferenceNormalizer>,
    classifier: Arc<dyn DependencyClassifier>,
    history: Arc<dyn HistorySource>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create pipeline from configuration
    ///
    /// The classifier is enabled only if the configuration asks for it and
    /// the API key variable is set. History defaults to none.
    ///
    /// # Errors
    /// [`PipelineError::Config`] for invalid values,
    /// [`PipelineError::Syntax`] for an unusable reference syntax
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let normalizer = ReferenceNormalizer::new(config.reference.clone())?;

        let classifier: Arc<dyn DependencyClassifier> = if config.classifier.enabled {
            match config.classifier.api_key() {
                Some(key) => Arc::new(ChatCompletionClassifier::new(
                    config.classifier.base_url.clone(),
                    config.classifier.model.clone(),
                    Some(key),
                    normalizer.clone(),
                )),
                None => {
                    tracing::warn!(
                        variable = %config.classifier.api_key_env,
                        "classifier enabled but API key is not set; dependencies will be unknown"
                    );
                    Arc::new(DisabledClassifier)
                }
            }
        } else {
            Arc::new(DisabledClassifier)
        };

        Ok(Self {
            config: Arc::new(config),
            normalizer: Arc::new(normalizer),
            classifier,
            history: Arc::new(NoHistory),
        })
    }

    /// With a specific dependency classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn DependencyClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// With a specific history source
    #[must_use]
    pub fn with_history(mut self, history: Arc<dyn HistorySource>) -> Self {
        self.history = history;
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reference normalizer for the configured syntax
    #[inline]
    #[must_use]
    pub fn normalizer(&self) -> &ReferenceNormalizer {
        &self.normalizer
    }

    async fn fan_out<I, T, F, Fut>(&self, items: Vec<(PathBuf, I)>, work: F) -> Results<T>
    where
        F: Fn(Self, PathBuf, I) -> Fut,
        Fut: Future<Output = Result<T, DocumentFailure>> + Send + 'static,
        T: Send + 'static,
    {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(items.len());
        for (path, item) in items {
            let permits = Arc::clone(&permits);
            let job = work(self.clone(), path.clone(), item);
            let handle = tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                job.await
            });
            pending.insert(handle.id(), path);
        }

        let mut results = Vec::with_capacity(pending.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            let (task, result) = match joined {
                Ok((task, result)) => (task, result),
                Err(err) => {
                    tracing::error!(error = %err, "document task aborted");
                    (err.id(), Err(DocumentFailure::Aborted(err.to_string())))
                }
            };
            if let Some(path) = pending.remove(&task) {
                results.push((path, result));
            }
        }
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }

    async fn create_output(output: &Path) -> Result<(), PipelineError> {
        tokio::fs::create_dir_all(output)
            .await
            .map_err(|source| PipelineError::OutputUncreatable {
                path: output.to_path_buf(),
                source,
            })
    }

    /// Extract header records from every source under `input`
    ///
    /// # Errors
    /// [`PipelineError::InputUnreadable`] or [`PipelineError::OutputUncreatable`]
    pub async fn extract(&self, input: &Path, output: &Path) -> Result<BatchReport, PipelineError> {
        let sources = discover(input, &self.config.extensions)
            .await
            .map_err(|source| PipelineError::InputUnreadable {
                path: input.to_path_buf(),
                source,
            })?;
        Self::create_output(output).await?;
        let store = Arc::new(RecordStore::new(output, self.config.reference.id_prefix.clone()));

        tracing::info!(documents = sources.len(), input = %input.display(), "extract pass started");
        let parsed = self
            .fan_out(unit_items(sources), |this, path, ()| async move {
                this.parse_one(&path).await
            })
            .await;

        let (writes, mut report) = self.claim(parsed);
        let written = self
            .fan_out(writes, move |_, path, extracted| {
                let store = Arc::clone(&store);
                async move { Self::write_one(&store, &path, extracted).await }
            })
            .await;
        for (path, result) in written {
            report.record(path, result);
        }
        report.sort();
        tracing::info!(
            written = report.written.len(),
            unresolved = report.unresolved.len(),
            skipped = report.skipped.len(),
            "extract pass finished"
        );
        Ok(report)
    }

    async fn parse_one(&self, path: &Path) -> Result<Extracted, DocumentFailure> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| io_failure(&e))?;
        let extraction = PreambleExtractor::new().extract(&text)?;
        let score = extraction.report.score();

        Ok(match extraction.into_record() {
            Ok(record) => {
                tracing::debug!(path = %path.display(), id = record.id.get(), score, "header extracted");
                Extracted {
                    target: Target::Record(record.id),
                    file: DocumentFile::new(record.preamble),
                }
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), failure = %DocumentFailure::from(&err), "routing to unresolved bucket");
                Extracted {
                    target: Target::Unresolved(source_stem(path)),
                    file: DocumentFile::new(err.into_preamble()),
                }
            }
        })
    }

    /// Keep the first source per storage key, in path order
    fn claim(&self, parsed: Results<Extracted>) -> (Vec<(PathBuf, Extracted)>, BatchReport) {
        let mut report = BatchReport::default();
        let mut claimed: HashMap<Target, PathBuf> = HashMap::new();
        let mut writes = Vec::with_capacity(parsed.len());
        for (path, result) in parsed {
            let extracted = match result {
                Ok(extracted) => extracted,
                Err(failure) => {
                    report.record(path, Err(failure));
                    continue;
                }
            };
            if let Some(kept) = claimed.get(&extracted.target) {
                let key = match &extracted.target {
                    Target::Record(id) => id.storage_key(&self.config.reference.id_prefix),
                    Target::Unresolved(stem) => format!("{UNRESOLVED_DIR}/{stem}"),
                };
                let kept = kept.clone();
                report.record(path, Err(DocumentFailure::DuplicateIdentifier { key, kept }));
                continue;
            }
            claimed.insert(extracted.target.clone(), path.clone());
            writes.push((path, extracted));
        }
        (writes, report)
    }

    async fn write_one(store: &RecordStore, path: &Path, extracted: Extracted) -> Result<Outcome, DocumentFailure> {
        match extracted.target {
            Target::Record(id) => {
                let output = store.save(id, &extracted.file).await?;
                tracing::debug!(path = %path.display(), id = id.get(), "record written");
                Ok(Outcome::Written { id, output })
            }
            Target::Unresolved(stem) => {
                let output = store.save_unresolved(&stem, &extracted.file).await?;
                Ok(Outcome::Unresolved { output })
            }
        }
    }

    /// Enrich stored records with history and insights
    ///
    /// Records are read from `records`, their sources looked up in
    /// `sources`, and results written to `output` (which may equal
    /// `records`).
    ///
    /// # Errors
    /// [`PipelineError::InputUnreadable`] or [`PipelineError::OutputUncreatable`]
    pub async fn enrich(
        &self,
        records: &Path,
        sources: &Path,
        output: &Path,
    ) -> Result<BatchReport, PipelineError> {
        let input = RecordStore::new(records, self.config.reference.id_prefix.clone());
        let paths = input
            .list()
            .await
            .map_err(|e| input_unreadable(records, e))?;
        Self::create_output(output).await?;
        let store = Arc::new(RecordStore::new(output, self.config.reference.id_prefix.clone()));
        let sources = Arc::new(sources.to_path_buf());

        tracing::info!(records = paths.len(), "enrich pass started");
        let results = self
            .fan_out(unit_items(paths), move |this, path, ()| {
                let store = Arc::clone(&store);
                let sources = Arc::clone(&sources);
                async move { this.enrich_one(&store, &sources, &path).await }
            })
            .await;
        let report = BatchReport::from_results(results);
        tracing::info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            "enrich pass finished"
        );
        Ok(report)
    }

    async fn enrich_one(
        &self,
        store: &RecordStore,
        sources: &Path,
        path: &Path,
    ) -> Result<Outcome, DocumentFailure> {
        let mut file = RecordStore::load_path(path).await?;
        let id = file
            .preamble()
            .identifier()
            .map_err(|e| DocumentFailure::MalformedSourceRecord(e.to_string()))?;
        let source = find_source(
            sources,
            &self.config.reference.id_prefix,
            id,
            &self.config.extensions,
        )
        .await
        .ok_or(DocumentFailure::SourceMissing)?;
        let text = tokio::fs::read_to_string(&source)
            .await
            .map_err(|e| io_failure(&e))?;
        let body = HeaderParser::new()
            .parse(&text)
            .map_or_else(|_| text.clone(), |header| header.body);

        let history = history_or_empty(self.history.as_ref(), &source).await;
        let dependencies = classify_bounded(
            self.classifier.as_ref(),
            &text,
            Some(id),
            self.config.classifier_timeout(),
        )
        .await;
        let insights = derive_insights(&body, id, &self.normalizer, dependencies);

        EnrichmentMerger::new().merge(&mut file, history, insights);
        let output = store.save(id, &file).await?;
        tracing::debug!(id = id.get(), source = %source.display(), "record enriched");
        Ok(Outcome::Written { id, output })
    }

    async fn load_records(&self, records: &Path) -> Result<LoadedRecords, PipelineError> {
        RecordStore::new(records, self.config.reference.id_prefix.clone())
            .load_all()
            .await
            .map_err(|e| input_unreadable(records, e))
    }

    /// Build the relationship graph from stored records
    ///
    /// # Errors
    /// [`PipelineError::InputUnreadable`] if `records` cannot be listed
    pub async fn graph(&self, records: &Path) -> Result<RelationshipGraph, PipelineError> {
        let loaded = self.load_records(records).await?;
        let mut builder = RelationshipGraphBuilder::new(&self.normalizer)
            .with_mentions(self.config.include_mentions);
        for (path, file) in &loaded.records {
            if let Err(err) = builder.add_document(file) {
                tracing::warn!(path = %path.display(), error = %err, "record without identifier left out of graph");
            }
        }
        Ok(builder.build())
    }

    /// Summarize stored records
    ///
    /// # Errors
    /// [`PipelineError::InputUnreadable`] if `records` cannot be listed
    pub async fn summary(&self, records: &Path, top_authors: usize) -> Result<CorpusSummary, PipelineError> {
        let loaded = self.load_records(records).await?;
        Ok(CorpusSummary::from_documents(loaded.documents(), top_authors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_and_sorts() {
        let mut report = BatchReport::default();
        report.record(
            PathBuf::from("b"),
            Ok(Outcome::Written {
                id: DocumentId::new(2),
                output: PathBuf::from("bip-0002.json"),
            }),
        );
        report.record(
            PathBuf::from("a"),
            Ok(Outcome::Written {
                id: DocumentId::new(1),
                output: PathBuf::from("bip-0001.json"),
            }),
        );
        report.record(PathBuf::from("c"), Err(DocumentFailure::NoHeaderBlockFound));
        report.sort();
        assert_eq!(report.processed(), 3);
        assert_eq!(report.written[0].0, DocumentId::new(1));
    }

    #[tokio::test]
    async fn panicked_task_is_reported_as_skipped() {
        let pipeline = Pipeline::new(PipelineConfig::new()).unwrap();
        let items = unit_items(vec![PathBuf::from("b"), PathBuf::from("a"), PathBuf::from("c")]);
        let results = pipeline
            .fan_out(items, |_, path, ()| async move {
                assert_ne!(path, Path::new("b"), "cannot process b");
                Ok(path)
            })
            .await;

        let paths: Vec<_> = results.iter().map(|(path, _)| path.as_path()).collect();
        assert_eq!(paths, [Path::new("a"), Path::new("b"), Path::new("c")]);
        assert_eq!(results[0].1, Ok(PathBuf::from("a")));
        assert!(matches!(results[1].1, Err(DocumentFailure::Aborted(_))));

        let report = BatchReport::from_results(vec![(
            PathBuf::from("b"),
            Err(DocumentFailure::Aborted("panicked".into())),
        )]);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn first_source_claims_the_storage_key() {
        let pipeline = Pipeline::new(PipelineConfig::new()).unwrap();
        let extracted = |target: Target| -> Result<Extracted, DocumentFailure> {
            Ok(Extracted {
                target,
                file: DocumentFile::new(docgraph_record::Preamble::new()),
            })
        };
        let parsed = vec![
            (PathBuf::from("bip-0007.md"), extracted(Target::Record(DocumentId::new(7)))),
            (PathBuf::from("bip-0008.md"), extracted(Target::Record(DocumentId::new(8)))),
            (PathBuf::from("bip-7.md"), extracted(Target::Record(DocumentId::new(7)))),
            (PathBuf::from("draft.md"), extracted(Target::Unresolved("draft".into()))),
            (PathBuf::from("draft.mediawiki"), extracted(Target::Unresolved("draft".into()))),
            (PathBuf::from("empty.md"), Err(DocumentFailure::NoHeaderBlockFound)),
        ];

        let (writes, report) = pipeline.claim(parsed);
        let kept: Vec<_> = writes.iter().map(|(path, _)| path.to_str().unwrap()).collect();
        assert_eq!(kept, ["bip-0007.md", "bip-0008.md", "draft.md"]);
        assert_eq!(
            report.skipped,
            vec![
                (
                    PathBuf::from("bip-7.md"),
                    DocumentFailure::DuplicateIdentifier {
                        key: "bip-0007".into(),
                        kept: PathBuf::from("bip-0007.md"),
                    }
                ),
                (
                    PathBuf::from("draft.mediawiki"),
                    DocumentFailure::DuplicateIdentifier {
                        key: "unresolved/draft".into(),
                        kept: PathBuf::from("draft.md"),
                    }
                ),
                (PathBuf::from("empty.md"), DocumentFailure::NoHeaderBlockFound),
            ]
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Pipeline::new(PipelineConfig::new().with_max_concurrency(0)).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn enabled_classifier_without_key_still_builds() {
        let mut config = PipelineConfig::new();
        config.classifier.enabled = true;
        config.classifier.api_key_env = "DOCGRAPH_TEST_MISSING_KEY".into();
        assert!(Pipeline::new(config).is_ok());
    }
}
