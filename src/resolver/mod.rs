//! Transitive dependency tree resolution.
//!
//! For every ecosystem with at least one direct dependency, walks registry
//! metadata breadth-first from the direct set, assigning depth 1 to direct
//! dependencies and `parent + 1` to discovered children. Ecosystems resolve
//! concurrently and independently; inside one ecosystem, sibling queries
//! fan out up to a bounded concurrency cap. A failed or timed-out query
//! skips that node and the walk continues with whatever subtree was
//! discoverable.

mod inflight;

pub use inflight::CoalescingFetcher;

use crate::classify::category_for_registry_token;
use crate::model::{DepKey, DependencyRecord, RepoKey, TreeNode};
use crate::registry::RegistryLookup;
use crate::store::AnalysisStore;
use crate::utils::version::{normalize, VERSION_UNKNOWN};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

/// Tuning knobs for tree resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum tree depth; guarantees termination on cyclic registry data
    pub max_depth: u32,
    /// Bound on in-flight registry requests within one ecosystem
    pub concurrency: usize,
    /// Per-request timeout, resolving to "no data" on expiry
    pub request_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            concurrency: 8,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Resolved trees per ecosystem.
pub type EcosystemTrees = BTreeMap<String, BTreeMap<DepKey, TreeNode>>;

/// Per-ecosystem working state produced by one BFS walk.
struct EcosystemResolution {
    tree: BTreeMap<DepKey, TreeNode>,
    /// Repositories reachable for each node (union over its parents)
    origins: BTreeMap<DepKey, BTreeSet<RepoKey>>,
    /// Whether the registry supplied a version for a discovered node
    version_supplied: BTreeMap<DepKey, bool>,
}

/// Resolve transitive trees for every eligible ecosystem and fold the
/// results back into the store.
///
/// After resolution every touched record's direct/transitive membership is
/// rewritten from depth and its count recomputed. `on_progress` is invoked
/// once per completed ecosystem with the resolved node count.
pub async fn resolve_trees<F>(
    store: &mut AnalysisStore,
    registry: Arc<dyn RegistryLookup>,
    config: &ResolverConfig,
    on_progress: F,
) -> EcosystemTrees
where
    F: Fn(&str, usize) + Send + Sync,
{
    // Snapshot the seed sets before any await so the walk operates on a
    // consistent view of the store.
    let mut seed_sets = Vec::new();
    for ecosystem in store.ecosystems_with_direct_dependencies() {
        let seeds: Vec<(DepKey, BTreeSet<RepoKey>)> = store
            .direct_keys_for_ecosystem(&ecosystem)
            .into_iter()
            .filter_map(|key| {
                store
                    .dependency(&key)
                    .map(|rec| (key, rec.repositories.clone()))
            })
            .collect();
        if !seeds.is_empty() {
            seed_sets.push((ecosystem, seeds));
        }
    }

    let fetcher = CoalescingFetcher::new(registry, config.request_timeout);
    let fetcher_ref = &fetcher;
    let progress_ref = &on_progress;

    let resolutions = futures::future::join_all(seed_sets.into_iter().map(
        |(ecosystem, seeds)| async move {
            let resolution = resolve_ecosystem(&ecosystem, seeds, fetcher_ref, config).await;
            progress_ref(&ecosystem, resolution.tree.len());
            (ecosystem, resolution)
        },
    ))
    .await;

    let mut trees = EcosystemTrees::new();
    for (ecosystem, resolution) in resolutions {
        apply_resolution(store, &ecosystem, &resolution);
        trees.insert(ecosystem, resolution.tree);
    }
    trees
}

/// Breadth-first walk of one ecosystem's registry metadata.
async fn resolve_ecosystem(
    ecosystem: &str,
    seeds: Vec<(DepKey, BTreeSet<RepoKey>)>,
    fetcher: &CoalescingFetcher,
    config: &ResolverConfig,
) -> EcosystemResolution {
    let mut resolution = EcosystemResolution {
        tree: BTreeMap::new(),
        origins: BTreeMap::new(),
        version_supplied: BTreeMap::new(),
    };

    let mut frontier: Vec<DepKey> = Vec::new();
    for (key, repos) in seeds {
        resolution.tree.insert(key.clone(), TreeNode::at_depth(1));
        resolution.origins.insert(key.clone(), repos);
        frontier.push(key);
    }

    while !frontier.is_empty() {
        // Nodes at the depth cap, and nodes with no queryable version, are
        // leaves of the walk.
        let queries: Vec<(DepKey, u32)> = frontier
            .drain(..)
            .filter_map(|key| {
                let depth = resolution.tree.get(&key)?.depth;
                if depth >= config.max_depth || key.display_version() == VERSION_UNKNOWN {
                    return None;
                }
                Some((key, depth))
            })
            .collect();
        if queries.is_empty() {
            break;
        }

        let results: Vec<(DepKey, u32, Option<Vec<crate::registry::DeclaredDependency>>)> =
            stream::iter(queries)
                .map(|(key, depth)| async move {
                    let deps = fetcher
                        .dependencies_of(key.name(), key.display_version(), ecosystem)
                        .await;
                    (key, depth, deps)
                })
                .buffer_unordered(config.concurrency)
                .collect()
                .await;

        let mut next = Vec::new();
        for (parent_key, parent_depth, deps) in results {
            let Some(deps) = deps else {
                tracing::debug!(ecosystem, parent = %parent_key, "no registry data, skipping node");
                continue;
            };
            let parent_repos = resolution
                .origins
                .get(&parent_key)
                .cloned()
                .unwrap_or_default();

            for declared in deps {
                let display = declared
                    .version_range
                    .as_deref()
                    .map_or_else(|| VERSION_UNKNOWN.to_string(), normalize);
                let child_key = DepKey::new(&declared.name, &display);
                let child_depth = parent_depth + 1;

                if let Some(parent_node) = resolution.tree.get_mut(&parent_key) {
                    parent_node.children.insert(child_key.clone());
                }

                match resolution.tree.get_mut(&child_key) {
                    Some(node) => {
                        let improved = child_depth < node.depth;
                        node.absorb(child_depth, Some(parent_key.clone()));
                        // A shorter path re-opens the node so descendants
                        // inherit the improved depth.
                        if improved {
                            next.push(child_key.clone());
                        }
                    }
                    None => {
                        let mut node = TreeNode::at_depth(child_depth);
                        node.parents.insert(parent_key.clone());
                        resolution.tree.insert(child_key.clone(), node);
                        resolution
                            .version_supplied
                            .insert(child_key.clone(), declared.version_range.is_some());
                        next.push(child_key.clone());
                    }
                }
                resolution
                    .origins
                    .entry(child_key)
                    .or_default()
                    .extend(parent_repos.iter().cloned());
            }
        }
        frontier = next;
    }

    resolution
}

/// Fold one ecosystem's resolved tree back into the store.
fn apply_resolution(store: &mut AnalysisStore, ecosystem: &str, resolution: &EcosystemResolution) {
    for (key, node) in &resolution.tree {
        if let Some(record) = store.dependency_mut(key) {
            record.depth = Some(record.depth.map_or(node.depth, |d| d.min(node.depth)));
            record.parents.extend(node.parents.iter().cloned());
            record.children.extend(node.children.iter().cloned());
        } else {
            let supplied = resolution.version_supplied.get(key).copied().unwrap_or(false);
            let mut record = DependencyRecord::new(
                key.name(),
                None,
                key.display_version(),
                category_for_registry_token(ecosystem),
            );
            record.version_unknown = !supplied;
            record.depth = Some(node.depth);
            record.parents = node.parents.clone();
            record.children = node.children.clone();
            if let Some(repos) = resolution.origins.get(key) {
                for repo in repos {
                    record.add_repository(repo.clone(), false);
                }
            }
            store.dependencies.insert(key.clone(), record);
        }

        if let Some(record) = store.dependency_mut(key) {
            record.reclassify_from_depth();
        }
    }
}
