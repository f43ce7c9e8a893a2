//! Source document discovery

use docgraph_record::DocumentId;
use std::io;
use std::path::{Path, PathBuf};

/// Whether `path` carries one of `extensions`
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e == ext))
}

/// Source documents directly under `dir`, sorted
///
/// # Errors
/// Any error listing the directory
pub async fn discover(dir: &Path, extensions: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if has_extension(&path, extensions) && entry.file_type().await?.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Locate the source of document `id`
///
/// Looks for `<prefix><id:04>.<ext>` for each extension in order.
pub async fn find_source(
    dir: &Path,
    prefix: &str,
    id: DocumentId,
    extensions: &[String],
) -> Option<PathBuf> {
    let key = id.storage_key(prefix);
    for ext in extensions {
        let candidate = dir.join(format!("{key}.{ext}"));
        if tokio::fs::metadata(&candidate)
            .await
            .is_ok_and(|m| m.is_file())
        {
            return Some(candidate);
        }
    }
    None
}

/// File stem used for unresolved records
#[must_use]
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "unnamed".to_string(), |s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec!["mediawiki".into(), "md".into()]
    }

    #[tokio::test]
    async fn discovers_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["bip-0002.md", "bip-0001.mediawiki", "README.txt"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("dir.md")).unwrap();

        let found = discover(dir.path(), &exts()).await.unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["bip-0001.mediawiki", "bip-0002.md"]);
    }

    #[tokio::test]
    async fn finds_padded_source_in_extension_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bip-0009.md"), "x").unwrap();
        std::fs::write(dir.path().join("bip-0009.mediawiki"), "x").unwrap();

        let found = find_source(dir.path(), "bip-", DocumentId::new(9), &exts()).await;
        assert_eq!(found, Some(dir.path().join("bip-0009.mediawiki")));
        assert_eq!(
            find_source(dir.path(), "bip-", DocumentId::new(10), &exts()).await,
            None
        );
    }

    #[tokio::test]
    async fn missing_dir_is_an_error() {
        assert!(discover(Path::new("/nonexistent/docgraph"), &exts()).await.is_err());
    }

    #[test]
    fn stem() {
        assert_eq!(source_stem(Path::new("/a/bip-draft.mediawiki")), "bip-draft");
    }
}
