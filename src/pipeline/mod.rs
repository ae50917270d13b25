//! Pipeline orchestration: fetch → ingest → resolve → export → checkpoint.
//!
//! Repositories are ingested strictly sequentially with a fixed delay
//! between them (the SBOM source is rate-limited); tree resolution then
//! fans out per ecosystem; the exported snapshot is the batch result.
//! Failures of individual repositories are tallied, never fatal.

mod checkpoint;

pub use checkpoint::{load_checkpoint, save_incremental, CHECKPOINT_PREFIX};

use crate::config::AtlasConfig;
use crate::error::Result;
use crate::ingest::ingest;
use crate::model::RepoKey;
use crate::parsers::convert_document;
use crate::registry::RegistryLookup;
use crate::resolver::resolve_trees;
use crate::snapshot::{export_snapshot_with, Snapshot};
use crate::sources::SbomSource;
use crate::storage::Storage;
use crate::store::AnalysisStore;
use std::sync::Arc;
use std::time::Duration;

/// Analyze a batch of repositories end to end.
///
/// The store accumulates across calls; pass a freshly `reset()` store for
/// an independent run. When `storage` is provided, incremental checkpoints
/// are saved every `checkpoint_interval` repositories and a final complete
/// snapshot at the end.
pub async fn analyze_repositories(
    store: &mut AnalysisStore,
    repos: &[RepoKey],
    source: &dyn SbomSource,
    registry: Arc<dyn RegistryLookup>,
    storage: Option<&dyn Storage>,
    config: &AtlasConfig,
) -> Result<Snapshot> {
    store.tally.total += repos.len();
    let delay = Duration::from_millis(config.ingest.inter_repo_delay_ms);
    let lookup_timeout = Duration::from_secs(config.ingest.lookup_timeout_secs);
    let mut checkpoint_seq = 0usize;

    for (index, repo) in repos.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        store.tally.processed += 1;
        match source.fetch(repo.owner(), repo.name()).await {
            Ok(Some(raw)) => match convert_document(&raw, repo.name()) {
                Ok(doc) => {
                    ingest(store, repo, &doc, registry.as_ref(), lookup_timeout).await?;
                    store.tally.successful += 1;
                    tracing::info!(repo = %repo, "ingested");
                }
                Err(err) => {
                    store.tally.failed += 1;
                    tracing::warn!(repo = %repo, error = %err, "skipping unparseable SBOM");
                }
            },
            Ok(None) => {
                store.tally.failed += 1;
                tracing::info!(repo = %repo, "no SBOM available");
            }
            Err(err) => {
                store.tally.failed += 1;
                tracing::warn!(repo = %repo, error = %err, "SBOM fetch failed");
            }
        }

        if let Some(storage) = storage {
            if (index + 1) % config.ingest.checkpoint_interval == 0 {
                let partial = partial_snapshot(store, config, false);
                save_incremental(storage, &partial, checkpoint_seq)?;
                checkpoint_seq += 1;
            }
        }
    }

    let resolver_config = config.resolver.to_resolver_config();
    resolve_trees(store, registry, &resolver_config, |ecosystem, nodes| {
        tracing::info!(ecosystem, nodes, "ecosystem tree resolved");
    })
    .await;

    let snapshot = export_snapshot_with(store, config.export.top_n);
    if let Some(storage) = storage {
        save_incremental(storage, &snapshot, checkpoint_seq)?;
    }
    Ok(snapshot)
}

/// Export a partial snapshot, condensing the payload when the processed
/// count exceeds the configured threshold. `is_final` always forces the
/// complete payload.
#[must_use]
pub fn partial_snapshot(store: &AnalysisStore, config: &AtlasConfig, is_final: bool) -> Snapshot {
    let snapshot = export_snapshot_with(store, config.export.top_n);
    if !is_final && store.tally.processed > config.export.partial_detail_threshold {
        snapshot.condensed()
    } else {
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NullRegistry;
    use crate::sources::{FileSource, RawSbomDocument, SbomSource};
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticSource {
        doc: RawSbomDocument,
    }

    #[async_trait]
    impl SbomSource for StaticSource {
        async fn fetch(&self, owner: &str, _repo: &str) -> Result<Option<RawSbomDocument>> {
            if owner == "missing" {
                return Ok(None);
            }
            Ok(Some(self.doc.clone()))
        }
    }

    fn spdx_doc() -> RawSbomDocument {
        json!({
            "spdxVersion": "SPDX-2.3",
            "SPDXID": "SPDXRef-DOCUMENT",
            "name": "app",
            "packages": [
                {"SPDXID": "SPDXRef-main", "name": "app", "versionInfo": "1.0.0"},
                {"SPDXID": "SPDXRef-lodash", "name": "lodash", "versionInfo": "4.17.21",
                 "externalRefs": [{"referenceCategory": "PACKAGE-MANAGER", "referenceType": "purl",
                                   "referenceLocator": "pkg:npm/lodash@4.17.21"}]}
            ],
            "relationships": [
                {"spdxElementId": "SPDXRef-DOCUMENT", "relationshipType": "DESCRIBES",
                 "relatedSpdxElement": "SPDXRef-main"},
                {"spdxElementId": "SPDXRef-main", "relationshipType": "DEPENDS_ON",
                 "relatedSpdxElement": "SPDXRef-lodash"}
            ]
        })
    }

    fn fast_config() -> AtlasConfig {
        let mut config = AtlasConfig::default();
        config.ingest.inter_repo_delay_ms = 0;
        config.ingest.checkpoint_interval = 1;
        config
    }

    #[tokio::test]
    async fn test_batch_with_failures_completes() {
        let mut store = AnalysisStore::new();
        let source = StaticSource { doc: spdx_doc() };
        let repos = vec![
            RepoKey::new("octocat", "hello"),
            RepoKey::new("missing", "gone"),
        ];

        let snapshot = analyze_repositories(
            &mut store,
            &repos,
            &source,
            Arc::new(NullRegistry),
            None,
            &fast_config(),
        )
        .await
        .unwrap();

        assert_eq!(snapshot.statistics.processed_repositories, 2);
        assert_eq!(snapshot.statistics.failed_repositories, 1);
        assert_eq!(snapshot.statistics.total_dependencies, 1);
    }

    #[tokio::test]
    async fn test_checkpoints_written() {
        let mut store = AnalysisStore::new();
        let source = StaticSource { doc: spdx_doc() };
        let storage = MemoryStorage::new();
        let repos = vec![RepoKey::new("octocat", "hello")];

        analyze_repositories(
            &mut store,
            &repos,
            &source,
            Arc::new(NullRegistry),
            Some(&storage),
            &fast_config(),
        )
        .await
        .unwrap();

        let restored = load_checkpoint(&storage).unwrap().expect("checkpoint saved");
        assert_eq!(restored.statistics.total_dependencies, 1);
    }

    #[tokio::test]
    async fn test_unparseable_document_tallied_not_fatal() {
        let mut store = AnalysisStore::new();
        let source = StaticSource {
            doc: json!({"not": "an sbom"}),
        };
        let repos = vec![RepoKey::new("octocat", "hello")];

        let snapshot = analyze_repositories(
            &mut store,
            &repos,
            &source,
            Arc::new(NullRegistry),
            None,
            &fast_config(),
        )
        .await
        .unwrap();

        assert_eq!(snapshot.statistics.failed_repositories, 1);
        assert_eq!(snapshot.statistics.total_dependencies, 0);
    }

    #[tokio::test]
    async fn test_empty_directory_produces_empty_snapshot() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let source = FileSource::scan(dir.path()).unwrap();
        let mut store = AnalysisStore::new();

        let snapshot = analyze_repositories(
            &mut store,
            &[],
            &source,
            Arc::new(NullRegistry),
            None,
            &fast_config(),
        )
        .await
        .unwrap();

        assert_eq!(snapshot.statistics.total_dependencies, 0);
    }
}
