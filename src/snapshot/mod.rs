//! Snapshot export and incremental merge.
//!
//! `export_snapshot` is a pure projection of the store; it never mutates.
//! `merge_partial` folds successive partial snapshots into an accumulated
//! one, keyed by repository and dependency key so that reprocessing the same
//! batch twice never double-counts. Field names follow the export contract
//! downstream consumers depend on.

use crate::model::{Category, DepKey, DependencyRecord, RepoKey, RepositoryRecord};
use crate::store::AnalysisStore;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default size of the top-N dependency and repository lists.
pub const DEFAULT_TOP_N: usize = 10;

/// Distribution bucket labels, in display order.
pub const DISTRIBUTION_BUCKETS: [&str; 6] = ["0", "1-10", "11-50", "51-100", "101-200", "200+"];

/// Batch statistics of one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_repositories: usize,
    pub processed_repositories: usize,
    pub successful_repositories: usize,
    pub failed_repositories: usize,
    pub repositories_with_dependencies: usize,
    pub total_dependencies: usize,
    pub average_dependencies_per_repo: f64,
    /// Dependency counts by category kind
    pub category_breakdown: BTreeMap<String, usize>,
}

/// One entry of the top-dependencies list.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopDependency {
    pub name: String,
    /// Display version (resolved, assumed, or the unknown sentinel)
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumed_version: Option<String>,
    pub count: usize,
    pub repositories: Vec<RepoKey>,
    pub category: Category,
    pub languages: Vec<String>,
}

/// One entry of the top-repositories list.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopRepository {
    pub name: String,
    pub owner: String,
    pub total_dependencies: usize,
    pub dependencies: Vec<DepKey>,
    /// Dependency counts by category kind
    pub category_breakdown: BTreeMap<String, usize>,
    pub languages: Vec<String>,
}

/// Exported aggregate snapshot.
///
/// A zero-dependency snapshot is a valid, meaningful output; emptiness is
/// visible through the statistics fields, never through an error.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// ISO-8601 export time
    pub timestamp: String,
    pub statistics: Statistics,
    pub top_dependencies: Vec<TopDependency>,
    pub top_repositories: Vec<TopRepository>,
    /// Repository counts bucketed by dependency count
    pub dependency_distribution: BTreeMap<String, usize>,
    /// Full dependency projections; may be empty in a condensed partial
    pub all_dependencies: Vec<DependencyRecord>,
    /// Full repository projections; may be empty in a condensed partial
    pub all_repositories: Vec<RepositoryRecord>,
    /// Dependency counts by ecosystem
    pub category_stats: BTreeMap<String, usize>,
    /// Dependency counts by language
    pub language_stats: BTreeMap<String, usize>,
}

impl Snapshot {
    /// Whether the full per-record arrays were omitted from this payload.
    #[must_use]
    pub fn is_condensed(&self) -> bool {
        self.all_dependencies.is_empty() && self.statistics.total_dependencies > 0
    }

    /// Produce a condensed copy: top-N and aggregate stats only.
    ///
    /// Used for non-final incremental checkpoints once the processed
    /// repository count exceeds the configured threshold.
    #[must_use]
    pub fn condensed(&self) -> Self {
        let mut slim = self.clone();
        slim.all_dependencies = Vec::new();
        slim.all_repositories = Vec::new();
        slim
    }
}

/// Distribution bucket label for a repository's dependency count.
#[must_use]
pub fn bucket_for(count: usize) -> &'static str {
    match count {
        0 => "0",
        1..=10 => "1-10",
        11..=50 => "11-50",
        51..=100 => "51-100",
        101..=200 => "101-200",
        _ => "200+",
    }
}

/// Export a snapshot of the store with the default top-N size.
#[must_use]
pub fn export_snapshot(store: &AnalysisStore) -> Snapshot {
    export_snapshot_with(store, DEFAULT_TOP_N)
}

/// Export a snapshot of the store.
#[must_use]
pub fn export_snapshot_with(store: &AnalysisStore, top_n: usize) -> Snapshot {
    let all_dependencies: Vec<DependencyRecord> = store.dependencies.values().cloned().collect();
    let all_repositories: Vec<RepositoryRecord> = store.repositories.values().cloned().collect();

    let statistics = compute_statistics(&all_dependencies, &all_repositories, &store.tally);
    let top_dependencies = top_dependencies(&all_dependencies, top_n);
    let top_repositories = top_repositories(&all_repositories, top_n);
    let dependency_distribution = distribution(&all_repositories);
    let (category_stats, language_stats) = histograms(&all_dependencies);

    Snapshot {
        timestamp: chrono::Utc::now().to_rfc3339(),
        statistics,
        top_dependencies,
        top_repositories,
        dependency_distribution,
        all_dependencies,
        all_repositories,
        category_stats,
        language_stats,
    }
}

fn compute_statistics(
    dependencies: &[DependencyRecord],
    repositories: &[RepositoryRecord],
    tally: &crate::store::ProcessingTally,
) -> Statistics {
    let repositories_with_dependencies = repositories
        .iter()
        .filter(|r| r.total_dependencies > 0)
        .count();
    let dependency_sum: usize = repositories.iter().map(|r| r.total_dependencies).sum();
    let average = if repositories.is_empty() {
        0.0
    } else {
        dependency_sum as f64 / repositories.len() as f64
    };

    let mut category_breakdown = BTreeMap::new();
    for dep in dependencies {
        *category_breakdown
            .entry(dep.category.kind.label().to_string())
            .or_insert(0) += 1;
    }

    Statistics {
        total_repositories: tally.total.max(repositories.len()),
        processed_repositories: tally.processed.max(repositories.len()),
        successful_repositories: tally.successful.max(repositories.len()),
        failed_repositories: tally.failed,
        repositories_with_dependencies,
        total_dependencies: dependencies.len(),
        average_dependencies_per_repo: average,
        category_breakdown,
    }
}

fn top_dependencies(dependencies: &[DependencyRecord], top_n: usize) -> Vec<TopDependency> {
    let mut sorted: Vec<&DependencyRecord> = dependencies.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    sorted
        .into_iter()
        .take(top_n)
        .map(|d| TopDependency {
            name: d.name.clone(),
            version: d.display_version.clone(),
            assumed_version: d.assumed_version.clone(),
            count: d.count,
            repositories: d.repositories.iter().cloned().collect(),
            category: d.category.clone(),
            languages: d.languages.iter().cloned().collect(),
        })
        .collect()
}

fn top_repositories(repositories: &[RepositoryRecord], top_n: usize) -> Vec<TopRepository> {
    let mut sorted: Vec<&RepositoryRecord> = repositories.iter().collect();
    sorted.sort_by(|a, b| {
        b.total_dependencies
            .cmp(&a.total_dependencies)
            .then_with(|| a.name.cmp(&b.name))
    });
    sorted
        .into_iter()
        .take(top_n)
        .map(|r| TopRepository {
            name: r.name.clone(),
            owner: r.owner.clone(),
            total_dependencies: r.total_dependencies,
            dependencies: r.dependencies.iter().cloned().collect(),
            category_breakdown: r
                .dependency_categories
                .iter()
                .map(|(kind, deps)| (kind.label().to_string(), deps.len()))
                .collect(),
            languages: r.languages.iter().cloned().collect(),
        })
        .collect()
}

fn distribution(repositories: &[RepositoryRecord]) -> BTreeMap<String, usize> {
    let mut buckets: BTreeMap<String, usize> = DISTRIBUTION_BUCKETS
        .iter()
        .map(|b| ((*b).to_string(), 0))
        .collect();
    for repo in repositories {
        *buckets
            .entry(bucket_for(repo.total_dependencies).to_string())
            .or_insert(0) += 1;
    }
    buckets
}

fn histograms(
    dependencies: &[DependencyRecord],
) -> (BTreeMap<String, usize>, BTreeMap<String, usize>) {
    let mut by_ecosystem = BTreeMap::new();
    let mut by_language = BTreeMap::new();
    for dep in dependencies {
        *by_ecosystem
            .entry(dep.category.ecosystem.clone())
            .or_insert(0) += 1;
        for language in &dep.languages {
            *by_language.entry(language.clone()).or_insert(0) += 1;
        }
    }
    (by_ecosystem, by_language)
}

// ============================================================================
// Incremental merge
// ============================================================================

/// Merge a partial snapshot into an accumulated one.
///
/// Merging is keyed by dependency and repository key, never append-based:
/// applying the same partial twice yields the same result as applying it
/// once. A condensed partial (arrays omitted) contributes its aggregates and
/// top lists while the accumulated arrays are retained. `is_final` marks the
/// merged snapshot as complete; it requires the inputs that carry arrays to
/// actually carry them.
#[must_use]
pub fn merge_partial(existing: Option<&Snapshot>, partial: &Snapshot, is_final: bool) -> Snapshot {
    let Some(existing) = existing else {
        return partial.clone();
    };

    if partial.is_condensed() {
        // Aggregates move forward, accumulated arrays stay.
        let mut merged = partial.clone();
        merged.all_dependencies.clone_from(&existing.all_dependencies);
        merged.all_repositories.clone_from(&existing.all_repositories);
        merged.statistics = merge_statistics(&existing.statistics, &partial.statistics);
        if is_final {
            tracing::warn!("final merge requested with a condensed partial; arrays retained from accumulator");
        }
        return merged;
    }

    // Keyed union of record arrays; the partial wins per key and sets merge.
    let mut dependencies: BTreeMap<DepKey, DependencyRecord> = existing
        .all_dependencies
        .iter()
        .map(|d| (d.key(), d.clone()))
        .collect();
    for dep in &partial.all_dependencies {
        match dependencies.get_mut(&dep.key()) {
            Some(accumulated) => merge_dependency(accumulated, dep),
            None => {
                dependencies.insert(dep.key(), dep.clone());
            }
        }
    }

    let mut repositories: BTreeMap<RepoKey, RepositoryRecord> = existing
        .all_repositories
        .iter()
        .map(|r| (r.key(), r.clone()))
        .collect();
    for repo in &partial.all_repositories {
        repositories.insert(repo.key(), repo.clone());
    }

    let all_dependencies: Vec<DependencyRecord> = dependencies.into_values().collect();
    let all_repositories: Vec<RepositoryRecord> = repositories.into_values().collect();

    let statistics = recompute_merged_statistics(
        &merge_statistics(&existing.statistics, &partial.statistics),
        &all_dependencies,
        &all_repositories,
    );
    let top_n = existing
        .top_dependencies
        .len()
        .max(partial.top_dependencies.len())
        .max(DEFAULT_TOP_N);
    let (category_stats, language_stats) = histograms(&all_dependencies);

    Snapshot {
        timestamp: partial.timestamp.clone(),
        statistics,
        top_dependencies: top_dependencies(&all_dependencies, top_n),
        top_repositories: top_repositories(&all_repositories, top_n),
        dependency_distribution: distribution(&all_repositories),
        all_dependencies,
        all_repositories,
        category_stats,
        language_stats,
    }
}

/// Merge two dependency sightings of the same key.
///
/// Set-valued fields union, depth keeps the minimum, and `count` is
/// recomputed from the merged repository set.
fn merge_dependency(accumulated: &mut DependencyRecord, incoming: &DependencyRecord) {
    accumulated
        .repositories
        .extend(incoming.repositories.iter().cloned());
    accumulated
        .direct_in
        .extend(incoming.direct_in.iter().cloned());
    accumulated
        .transitive_in
        .extend(incoming.transitive_in.iter().cloned());
    accumulated.parents.extend(incoming.parents.iter().cloned());
    accumulated
        .children
        .extend(incoming.children.iter().cloned());
    accumulated
        .languages
        .extend(incoming.languages.iter().cloned());
    accumulated.depth = match (accumulated.depth, incoming.depth) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    if accumulated.assumed_version.is_none() {
        accumulated
            .assumed_version
            .clone_from(&incoming.assumed_version);
    }
    if accumulated.license.is_none() {
        accumulated.license.clone_from(&incoming.license);
    }
    // Depth may have changed which side of the partition applies; without
    // depth, a direct claim from either side wins.
    if accumulated.depth.is_some() {
        accumulated.reclassify_from_depth();
    } else {
        let direct = accumulated.direct_in.clone();
        accumulated.transitive_in.retain(|r| !direct.contains(r));
    }
    accumulated.count = accumulated.repositories.len();
}

/// Monotone merge of batch tallies: cumulative counters take the maximum,
/// which keeps repeated application of the same partial idempotent.
fn merge_statistics(existing: &Statistics, partial: &Statistics) -> Statistics {
    let mut merged = partial.clone();
    merged.total_repositories = existing.total_repositories.max(partial.total_repositories);
    merged.processed_repositories = existing
        .processed_repositories
        .max(partial.processed_repositories);
    merged.successful_repositories = existing
        .successful_repositories
        .max(partial.successful_repositories);
    merged.failed_repositories = existing.failed_repositories.max(partial.failed_repositories);
    merged
}

/// Recompute array-derived statistics after a keyed merge.
fn recompute_merged_statistics(
    tallies: &Statistics,
    dependencies: &[DependencyRecord],
    repositories: &[RepositoryRecord],
) -> Statistics {
    let tally = crate::store::ProcessingTally {
        total: tallies.total_repositories,
        processed: tallies.processed_repositories,
        successful: tallies.successful_repositories,
        failed: tallies.failed_repositories,
    };
    compute_statistics(dependencies, repositories, &tally)
}
