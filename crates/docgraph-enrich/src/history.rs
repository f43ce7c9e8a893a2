//! Version-history sources

use crate::error::HistoryError;
use async_trait::async_trait;
use docgraph_record::Revision;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Field separator in the log format below
const LOG_SEPARATOR: char = '|';
const LOG_FORMAT: &str = "--pretty=format:%H|%ad|%an";

/// Supplies the change history of a source document, newest first
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// History of the file at `path`
    async fn history(&self, path: &Path) -> Result<Vec<Revision>, HistoryError>;
}

/// Source without any history
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

#[async_trait]
impl HistorySource for NoHistory {
    async fn history(&self, _path: &Path) -> Result<Vec<Revision>, HistoryError> {
        Ok(Vec::new())
    }
}

/// History from `git log` in a local clone
#[derive(Debug, Clone)]
pub struct GitLogHistory {
    repo: PathBuf,
}

impl GitLogHistory {
    /// Read history from the repository at `repo`
    ///
    /// Paths under `repo` are passed to git relative to it.
    #[must_use]
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    /// Repository root
    #[inline]
    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.repo
    }
}

#[async_trait]
impl HistorySource for GitLogHistory {
    async fn history(&self, path: &Path) -> Result<Vec<Revision>, HistoryError> {
        // git resolves pathspecs against the -C directory
        let path = path.strip_prefix(&self.repo).unwrap_or(path);
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .arg("log")
            .arg(LOG_FORMAT)
            .arg("--")
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(HistoryError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_log(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse `hash|date|author` lines; malformed lines are skipped
#[must_use]
pub fn parse_log(stdout: &str) -> Vec<Revision> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, LOG_SEPARATOR);
            let revision = parts.next()?.trim();
            let timestamp = parts.next()?.trim();
            let author = parts.next()?.trim();
            (!revision.is_empty()).then(|| Revision::new(revision, timestamp, author))
        })
        .collect()
}

/// Fetch history, degrading to an empty list on failure
pub async fn history_or_empty(source: &dyn HistorySource, path: &Path) -> Vec<Revision> {
    match source.history(path).await {
        Ok(history) => history,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "history unavailable");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_log_lines() {
        let log = "abc123|Mon Jan 1 2024|Alice\n\ndef456|Sun Dec 31 2023|Bob | Jr\nbroken";
        assert_eq!(
            parse_log(log),
            vec![
                Revision::new("abc123", "Mon Jan 1 2024", "Alice"),
                Revision::new("def456", "Sun Dec 31 2023", "Bob | Jr"),
            ]
        );
    }

    #[tokio::test]
    async fn no_history_is_empty() {
        assert!(NoHistory.history(Path::new("x")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn outside_a_repository_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = GitLogHistory::new(dir.path());
        assert!(source.history(Path::new("bip-0001.mediawiki")).await.is_err());
        assert!(history_or_empty(&source, Path::new("bip-0001.mediawiki"))
            .await
            .is_empty());
    }
}
