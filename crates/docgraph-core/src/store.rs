//! File-backed record store
//!
//! One pretty-printed JSON file per document, keyed by storage key:
//!
//! ```text
//! <root>/bip-0032.json
//! <root>/unresolved/<source-stem>.json
//! ```
//!
//! Saving is an overwrite, so re-running a pass is idempotent by id. Each
//! record is written to a hidden temporary file beside its destination and
//! renamed into place, so readers never see a partial record.

use crate::error::StoreError;
use docgraph_record::{DocumentFile, DocumentId};
use std::path::{Path, PathBuf};

/// Subdirectory for documents without a resolvable identifier
pub const UNRESOLVED_DIR: &str = "unresolved";

const RECORD_EXTENSION: &str = "json";

/// JSON record store rooted at one directory
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
    prefix: String,
}

impl RecordStore {
    /// Store at `root` without touching the file system
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Store at `root`, creating the directory if needed
    ///
    /// # Errors
    /// [`StoreError::Io`] if the directory cannot be created
    pub async fn create(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let store = Self::new(root, prefix);
        tokio::fs::create_dir_all(&store.root)
            .await
            .map_err(|e| StoreError::io(&store.root, e))?;
        Ok(store)
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for `id`
    #[must_use]
    pub fn path_for(&self, id: DocumentId) -> PathBuf {
        self.root
            .join(format!("{}.{RECORD_EXTENSION}", id.storage_key(&self.prefix)))
    }

    /// Path of an unresolved record
    #[must_use]
    pub fn unresolved_path(&self, stem: &str) -> PathBuf {
        self.root
            .join(UNRESOLVED_DIR)
            .join(format!("{stem}.{RECORD_EXTENSION}"))
    }

    fn temporary_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map_or_else(|| "record".into(), |name| name.to_string_lossy());
        path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
    }

    async fn write(path: &Path, file: &DocumentFile) -> Result<(), StoreError> {
        let mut json = serde_json::to_string_pretty(file).map_err(|source| StoreError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        json.push('\n');
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
        let temporary = Self::temporary_path(path);
        tokio::fs::write(&temporary, json)
            .await
            .map_err(|e| StoreError::io(&temporary, e))?;
        if let Err(err) = tokio::fs::rename(&temporary, path).await {
            let _ = tokio::fs::remove_file(&temporary).await;
            return Err(StoreError::io(path, err));
        }
        Ok(())
    }

    /// Write the record for `id`, replacing any previous one
    ///
    /// # Errors
    /// [`StoreError::Io`] or [`StoreError::Encode`]
    pub async fn save(&self, id: DocumentId, file: &DocumentFile) -> Result<PathBuf, StoreError> {
        let path = self.path_for(id);
        Self::write(&path, file).await?;
        Ok(path)
    }

    /// Write a record to the unresolved bucket
    ///
    /// # Errors
    /// [`StoreError::Io`] or [`StoreError::Encode`]
    pub async fn save_unresolved(&self, stem: &str, file: &DocumentFile) -> Result<PathBuf, StoreError> {
        let path = self.unresolved_path(stem);
        Self::write(&path, file).await?;
        Ok(path)
    }

    /// Read and decode one record file
    ///
    /// # Errors
    /// [`StoreError::Io`] if unreadable, [`StoreError::MalformedSourceRecord`]
    /// if it is not a document object
    pub async fn load_path(path: &Path) -> Result<DocumentFile, StoreError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| StoreError::MalformedSourceRecord {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read the record for `id`
    ///
    /// # Errors
    /// As [`Self::load_path`]
    pub async fn load(&self, id: DocumentId) -> Result<DocumentFile, StoreError> {
        Self::load_path(&self.path_for(id)).await
    }

    /// Record files directly under the root, sorted
    ///
    /// The unresolved bucket is not included.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the root cannot be listed
    pub async fn list(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;
        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.root, e))?
        {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Every decodable record, with failures reported separately
    ///
    /// # Errors
    /// [`StoreError::Io`] if the root cannot be listed
    pub async fn load_all(&self) -> Result<LoadedRecords, StoreError> {
        let mut loaded = LoadedRecords::default();
        for path in self.list().await? {
            match Self::load_path(&path).await {
                Ok(file) => loaded.records.push((path, file)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping stored record");
                    loaded.failures.push((path, err));
                }
            }
        }
        Ok(loaded)
    }
}

/// Result of [`RecordStore::load_all`]
#[derive(Debug, Default)]
pub struct LoadedRecords {
    /// Decoded records with their paths
    pub records: Vec<(PathBuf, DocumentFile)>,
    /// Records that could not be read or decoded
    pub failures: Vec<(PathBuf, StoreError)>,
}

impl LoadedRecords {
    /// Decoded documents
    pub fn documents(&self) -> impl Iterator<Item = &DocumentFile> {
        self.records.iter().map(|(_, file)| file)
    }
}
