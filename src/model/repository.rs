//! Per-repository dependency records.

use super::{CategoryKind, DeclaredRelationship, DepKey, RepoKey};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The dependency view of a single analyzed repository.
///
/// `total_dependencies` is computed once when the repository's SBOM is
/// processed; callers must not mutate `dependencies` afterwards without
/// updating it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub name: String,
    /// All dependency keys present in this repository's SBOM
    pub dependencies: BTreeSet<DepKey>,
    /// Subset declared direct by the SBOM's own relationship graph
    pub direct_dependencies: BTreeSet<DepKey>,
    /// Partition of `dependencies` by category kind
    pub dependency_categories: BTreeMap<CategoryKind, BTreeSet<DepKey>>,
    /// Raw declared DEPENDS_ON edges, retained for graph visualization
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub relationships: Vec<DeclaredRelationship>,
    /// `dependencies.len()` at processing time
    pub total_dependencies: usize,
    /// Languages observed across this repository's dependencies
    pub languages: BTreeSet<String>,
}

impl RepositoryRecord {
    /// Create an empty record for a repository.
    pub fn new(key: &RepoKey) -> Self {
        Self {
            owner: key.owner().to_string(),
            name: key.name().to_string(),
            dependencies: BTreeSet::new(),
            direct_dependencies: BTreeSet::new(),
            dependency_categories: BTreeMap::new(),
            relationships: Vec::new(),
            total_dependencies: 0,
            languages: BTreeSet::new(),
        }
    }

    /// The global key of this record.
    #[must_use]
    pub fn key(&self) -> RepoKey {
        RepoKey::new(&self.owner, &self.name)
    }

    /// Register one dependency of this repository.
    pub fn add_dependency(&mut self, key: DepKey, kind: CategoryKind, direct: bool) {
        self.dependencies.insert(key.clone());
        if direct {
            self.direct_dependencies.insert(key.clone());
        }
        self.dependency_categories.entry(kind).or_default().insert(key);
    }

    /// Freeze `total_dependencies` at the current set size.
    pub fn finalize(&mut self) {
        self.total_dependencies = self.dependencies.len();
    }
}
