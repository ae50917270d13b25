//! The global analysis store.
//!
//! Two keyed collections (global dependency records and per-repository
//! records) threaded explicitly through every component API. There are no
//! process-wide singletons; `reset()` is the only path that clears state.
//! Insertion order is preserved so exports are stable across runs.

use crate::model::{DepKey, DependencyRecord, RepoKey, RepositoryRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Batch-level processing tallies surfaced in the exported statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingTally {
    /// Repositories the caller asked to analyze
    pub total: usize,
    /// Repositories attempted so far
    pub processed: usize,
    /// Repositories whose SBOM ingested cleanly
    pub successful: usize,
    /// Repositories skipped on error or missing SBOM
    pub failed: usize,
}

/// Global mutable store for one analysis run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalysisStore {
    /// Deduplicated dependency records keyed by `name@displayVersion`
    pub dependencies: IndexMap<DepKey, DependencyRecord>,
    /// Repository records keyed by `owner/name`
    pub repositories: IndexMap<RepoKey, RepositoryRecord>,
    /// Batch tallies
    pub tally: ProcessingTally,
}

impl AnalysisStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reinitialize the store, dropping all accumulated state.
    pub fn reset(&mut self) {
        self.dependencies.clear();
        self.repositories.clear();
        self.tally = ProcessingTally::default();
    }

    /// Create-or-update a dependency record.
    ///
    /// On first sight the record produced by `init` is inserted; on
    /// subsequent sight only the repository/classification sets mutate;
    /// `name` and `version` stay as first recorded.
    pub fn upsert_dependency<F>(&mut self, key: DepKey, repo: RepoKey, direct: bool, init: F)
    where
        F: FnOnce() -> DependencyRecord,
    {
        let record = self.dependencies.entry(key).or_insert_with(init);
        record.add_repository(repo, direct);
    }

    /// Look up a dependency record.
    #[must_use]
    pub fn dependency(&self, key: &DepKey) -> Option<&DependencyRecord> {
        self.dependencies.get(key)
    }

    /// Mutable dependency lookup.
    pub fn dependency_mut(&mut self, key: &DepKey) -> Option<&mut DependencyRecord> {
        self.dependencies.get_mut(key)
    }

    /// Insert a repository record, replacing any earlier ingestion of the
    /// same key (re-ingestion is idempotent at the repository level).
    pub fn insert_repository(&mut self, record: RepositoryRecord) {
        self.repositories.insert(record.key(), record);
    }

    /// Ecosystem lookup tokens that have at least one direct dependency.
    ///
    /// These are the seeds for transitive tree resolution.
    #[must_use]
    pub fn ecosystems_with_direct_dependencies(&self) -> BTreeSet<String> {
        self.dependencies
            .values()
            .filter(|d| !d.direct_in.is_empty())
            .filter_map(|d| crate::classify::registry_ecosystem(&d.category))
            .map(str::to_string)
            .collect()
    }

    /// Direct-dependency keys belonging to one registry ecosystem.
    #[must_use]
    pub fn direct_keys_for_ecosystem(&self, ecosystem: &str) -> Vec<DepKey> {
        self.dependencies
            .values()
            .filter(|d| !d.direct_in.is_empty())
            .filter(|d| crate::classify::registry_ecosystem(&d.category) == Some(ecosystem))
            .map(DependencyRecord::key)
            .collect()
    }

    /// Remove one repository's contribution from every dependency record.
    ///
    /// Used before re-ingesting a repository so that re-processing the same
    /// SBOM never double-counts.
    pub fn detach_repository(&mut self, repo: &RepoKey) {
        for record in self.dependencies.values_mut() {
            if record.repositories.remove(repo) {
                record.direct_in.remove(repo);
                record.transitive_in.remove(repo);
                record.count = record.repositories.len();
            }
        }
        self.dependencies.retain(|_, r| !r.repositories.is_empty());
        self.repositories.shift_remove(repo);
    }
}
