//! SBOM source collaborator interface.
//!
//! A source hands back the raw (already JSON-parsed) SBOM document for a
//! repository, or `None` when the repository has no SBOM, which is an
//! ordinary outcome, not an error. The production HTTP source lives outside
//! the crate; [`FileSource`] serves local directories for the CLI and tests.

use crate::error::Result;
use crate::model::RepoKey;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A raw SBOM document as fetched from a source.
pub type RawSbomDocument = serde_json::Value;

/// Async SBOM provider.
#[async_trait]
pub trait SbomSource: Send + Sync {
    /// Fetch the SBOM for one repository; `None` means no SBOM available.
    async fn fetch(&self, owner: &str, repo: &str) -> Result<Option<RawSbomDocument>>;
}

/// File-backed source serving a directory of SBOM JSON files.
///
/// Files named `owner__name.json` (or nested `owner/name.json`) map to
/// repository keys.
#[derive(Debug, Default)]
pub struct FileSource {
    files: BTreeMap<RepoKey, PathBuf>,
}

impl FileSource {
    /// Scan a directory for SBOM files.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut files = BTreeMap::new();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                let owner = entry.file_name().to_string_lossy().to_string();
                for nested in std::fs::read_dir(&path)? {
                    let nested = nested?.path();
                    if let Some(name) = json_stem(&nested) {
                        files.insert(RepoKey::new(&owner, &name), nested);
                    }
                }
            } else if let Some(stem) = json_stem(&path) {
                if let Some((owner, name)) = stem.split_once("__") {
                    files.insert(RepoKey::new(owner, name), path);
                }
            }
        }
        Ok(Self { files })
    }

    /// Repository keys discovered during the scan.
    pub fn discovered(&self) -> Vec<RepoKey> {
        self.files.keys().cloned().collect()
    }
}

fn json_stem(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

#[async_trait]
impl SbomSource for FileSource {
    async fn fetch(&self, owner: &str, repo: &str) -> Result<Option<RawSbomDocument>> {
        let Some(path) = self.files.get(&RepoKey::new(owner, repo)) else {
            return Ok(None);
        };
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scan_flat_and_nested_layouts() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join("octocat__hello.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("acme")).unwrap();
        std::fs::write(dir.path().join("acme").join("widget.json"), "{}").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), "x").unwrap();

        let source = FileSource::scan(dir.path()).unwrap();
        let keys = source.discovered();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&RepoKey::new("octocat", "hello")));
        assert!(keys.contains(&RepoKey::new("acme", "widget")));
    }

    #[tokio::test]
    async fn test_fetch_missing_repo_is_none() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let source = FileSource::scan(dir.path()).unwrap();
        let doc = source.fetch("nobody", "nothing").await.unwrap();
        assert!(doc.is_none());
    }
}
