//! Global deduplicated dependency records.

use super::{Category, DepKey, LicenseAssessment, LicenseExpression, RepoKey, VulnerabilityRecord};
use crate::utils::version::VERSION_UNKNOWN;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A globally deduplicated dependency, keyed by `name@displayVersion`.
///
/// Created at first sight during per-repository ingestion, then mutated in
/// place as further repositories declare it and as tree resolution assigns
/// depth. `name` and `version` are immutable once the key exists; only the
/// set-valued and derived fields change.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    /// Package name
    pub name: String,
    /// True declared version; `None` when the SBOM carried none
    pub version: Option<String>,
    /// Version used for identity and display: the normalized version, an
    /// assumed latest version, or the literal `"version unknown"`
    pub display_version: String,
    /// Set only when the true version was missing and a registry lookup
    /// supplied a best-guess latest version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumed_version: Option<String>,
    /// Whether no version could be determined at all
    pub version_unknown: bool,
    /// Classification
    pub category: Category,
    /// Declared license, when the SBOM carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseExpression>,
    /// Repositories that declare this dependency, directly or transitively
    pub repositories: BTreeSet<RepoKey>,
    /// Repositories where this dependency is direct
    pub direct_in: BTreeSet<RepoKey>,
    /// Repositories where this dependency is transitive
    pub transitive_in: BTreeSet<RepoKey>,
    /// Occurrence count; recomputed as `repositories.len()` after resolution
    pub count: usize,
    /// Resolved tree depth (1 = direct); `None` until resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    /// Dependency keys that introduced this package in the resolved tree
    pub parents: BTreeSet<DepKey>,
    /// Dependency keys this package introduces in the resolved tree
    pub children: BTreeSet<DepKey>,
    /// Languages observed across declaring ecosystems
    pub languages: BTreeSet<String>,
    /// License overlay; `None` until a license enrichment pass runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_assessment: Option<LicenseAssessment>,
    /// Vulnerability overlay; `None` until a vulnerability enrichment pass runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vulnerabilities: Option<Vec<VulnerabilityRecord>>,
}

impl DependencyRecord {
    /// Initialize a record at first sight.
    pub fn new(
        name: &str,
        version: Option<String>,
        display_version: &str,
        category: Category,
    ) -> Self {
        let mut languages = BTreeSet::new();
        if category.language != "Unknown" {
            languages.insert(category.language.clone());
        }
        Self {
            name: name.to_string(),
            version,
            display_version: display_version.to_string(),
            assumed_version: None,
            version_unknown: display_version == VERSION_UNKNOWN,
            category,
            license: None,
            repositories: BTreeSet::new(),
            direct_in: BTreeSet::new(),
            transitive_in: BTreeSet::new(),
            count: 0,
            depth: None,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            languages,
            license_assessment: None,
            vulnerabilities: None,
        }
    }

    /// The global key of this record.
    #[must_use]
    pub fn key(&self) -> DepKey {
        DepKey::new(&self.name, &self.display_version)
    }

    /// Record that `repo` declares this dependency.
    ///
    /// `direct` reflects the document's own relationship graph; it is
    /// rewritten from resolved depth after tree resolution. A direct claim
    /// wins over a transitive one for the same repository, so duplicate
    /// entries in one document cannot split a repo across both sets.
    pub fn add_repository(&mut self, repo: RepoKey, direct: bool) {
        let newly_added = self.repositories.insert(repo.clone());
        if direct {
            self.transitive_in.remove(&repo);
            self.direct_in.insert(repo);
        } else if !self.direct_in.contains(&repo) {
            self.transitive_in.insert(repo);
        }
        if newly_added {
            self.count += 1;
        }
    }

    /// Rewrite direct/transitive membership from resolved depth.
    ///
    /// Depth 1 means direct everywhere the dependency appears; depth > 1
    /// means transitive everywhere. Also recomputes `count`.
    pub fn reclassify_from_depth(&mut self) {
        let Some(depth) = self.depth else { return };
        if depth <= 1 {
            self.direct_in = self.repositories.clone();
            self.transitive_in.clear();
        } else {
            self.transitive_in = self.repositories.clone();
            self.direct_in.clear();
        }
        self.count = self.repositories.len();
    }

    /// Whether the direct/transitive partition holds for this record.
    ///
    /// Every repository key must appear in exactly one of the two sets.
    #[must_use]
    pub fn partition_holds(&self) -> bool {
        self.direct_in.is_disjoint(&self.transitive_in)
            && self
                .repositories
                .iter()
                .all(|r| self.direct_in.contains(r) ^ self.transitive_in.contains(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CategoryKind;

    fn record() -> DependencyRecord {
        DependencyRecord::new(
            "lodash",
            Some("4.17.21".to_string()),
            "4.17.21",
            Category::new(CategoryKind::Code, "JavaScript", "npm"),
        )
    }

    #[test]
    fn test_add_repository_counts_once() {
        let mut rec = record();
        let repo = RepoKey::new("octocat", "hello");
        rec.add_repository(repo.clone(), true);
        rec.add_repository(repo, true);
        assert_eq!(rec.count, 1);
        assert_eq!(rec.repositories.len(), 1);
    }

    #[test]
    fn test_reclassify_from_depth_direct() {
        let mut rec = record();
        rec.add_repository(RepoKey::new("a", "r1"), false);
        rec.add_repository(RepoKey::new("b", "r2"), true);
        rec.depth = Some(1);
        rec.reclassify_from_depth();
        assert_eq!(rec.direct_in.len(), 2);
        assert!(rec.transitive_in.is_empty());
        assert!(rec.partition_holds());
    }

    #[test]
    fn test_reclassify_from_depth_transitive() {
        let mut rec = record();
        rec.add_repository(RepoKey::new("a", "r1"), true);
        rec.depth = Some(3);
        rec.reclassify_from_depth();
        assert!(rec.direct_in.is_empty());
        assert_eq!(rec.transitive_in.len(), 1);
        assert!(rec.partition_holds());
    }

    #[test]
    fn test_direct_claim_wins_over_transitive() {
        let mut rec = record();
        let repo = RepoKey::new("octocat", "hello");
        rec.add_repository(repo.clone(), false);
        rec.add_repository(repo.clone(), true);
        assert!(rec.direct_in.contains(&repo));
        assert!(!rec.transitive_in.contains(&repo));
        assert!(rec.partition_holds());

        // And the same the other way around.
        let mut rec = record();
        rec.add_repository(repo.clone(), true);
        rec.add_repository(repo.clone(), false);
        assert!(rec.direct_in.contains(&repo));
        assert!(rec.partition_holds());
    }

    #[test]
    fn test_version_unknown_sentinel() {
        let rec = DependencyRecord::new("mystery", None, VERSION_UNKNOWN, Category::unknown());
        assert!(rec.version_unknown);
        assert_eq!(rec.key().as_str(), "mystery@version unknown");
    }
}
