//! Per-repository ingestion: the dependency graph builder.
//!
//! Consumes one normalized document, builds the repository record, and
//! feeds the global store. Directness at this stage reflects the document's
//! own relationship graph; tree resolution may later rewrite the global
//! classification from resolved depth.

use crate::classify::{classify, registry_ecosystem};
use crate::error::Result;
use crate::model::{
    DepKey, DependencyRecord, LicenseExpression, NormalizedDocument, RepoKey, RepositoryRecord,
};
use crate::registry::RegistryLookup;
use crate::store::AnalysisStore;
use crate::utils::version::{normalize, VERSION_UNKNOWN};
use std::collections::BTreeSet;
use std::time::Duration;

/// How a package's display version was determined.
struct ResolvedVersion {
    version: Option<String>,
    display: String,
    assumed: Option<String>,
    unknown: bool,
}

/// Ingest one repository's normalized SBOM into the store.
///
/// Returns the repository record (also inserted into the store). Packages
/// without a name are skipped and logged; a repository that was ingested
/// before is detached first so re-ingestion never double-counts.
pub async fn ingest(
    store: &mut AnalysisStore,
    repo_key: &RepoKey,
    doc: &NormalizedDocument,
    registry: &dyn RegistryLookup,
    lookup_timeout: Duration,
) -> Result<RepositoryRecord> {
    if store.repositories.contains_key(repo_key) {
        tracing::debug!(repo = %repo_key, "re-ingesting repository, detaching previous state");
        store.detach_repository(repo_key);
    }

    let mut record = RepositoryRecord::new(repo_key);
    record.relationships = doc
        .relationships
        .iter()
        .filter(|r| r.kind.is_dependency())
        .cloned()
        .collect();

    let direct_ids: BTreeSet<&str> = doc.direct_target_ids().into_iter().collect();
    let mut skipped = 0usize;

    for pkg in &doc.packages {
        // The main package is the analyzed project itself, not a dependency.
        if pkg.is_main {
            continue;
        }
        let Some(name) = pkg.name.as_deref().filter(|n| !n.trim().is_empty()) else {
            skipped += 1;
            tracing::debug!(repo = %repo_key, id = %pkg.id, "skipping unidentifiable package");
            continue;
        };

        let category = classify(pkg);
        let resolved = resolve_version(
            name,
            pkg.version.as_deref(),
            registry_ecosystem(&category),
            registry,
            lookup_timeout,
        )
        .await;

        let key = DepKey::new(name, &resolved.display);
        let direct = direct_ids.contains(pkg.id.as_str());

        record.add_dependency(key.clone(), category.kind, direct);
        record.languages.insert(category.language.clone());

        let license = pkg.license.clone();
        store.upsert_dependency(key.clone(), repo_key.clone(), direct, || {
            let mut dep = DependencyRecord::new(
                name,
                resolved.version.clone(),
                &resolved.display,
                category.clone(),
            );
            dep.assumed_version.clone_from(&resolved.assumed);
            dep.version_unknown = resolved.unknown;
            dep.license = license.clone().map(LicenseExpression::new);
            dep
        });

        // Later sightings still contribute language and license knowledge.
        if let Some(dep) = store.dependency_mut(&key) {
            if category.language != "Unknown" {
                dep.languages.insert(category.language.clone());
            }
            if dep.license.is_none() {
                if let Some(expr) = &pkg.license {
                    dep.license = Some(LicenseExpression::new(expr.clone()));
                }
            }
        }
    }

    record.finalize();
    if skipped > 0 {
        tracing::warn!(repo = %repo_key, skipped, "skipped unidentifiable packages");
    }

    store.insert_repository(record.clone());
    Ok(record)
}

/// Determine the display version for a package.
///
/// Declared versions are normalized; missing versions fall back to a
/// best-effort latest-version lookup for ecosystems that support one, and
/// finally to the `"version unknown"` sentinel.
async fn resolve_version(
    name: &str,
    raw: Option<&str>,
    ecosystem: Option<&str>,
    registry: &dyn RegistryLookup,
    lookup_timeout: Duration,
) -> ResolvedVersion {
    if let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) {
        return ResolvedVersion {
            version: Some(raw.to_string()),
            display: normalize(raw),
            assumed: None,
            unknown: false,
        };
    }

    if let Some(ecosystem) = ecosystem {
        let lookup = tokio::time::timeout(lookup_timeout, registry.latest_version(name, ecosystem));
        match lookup.await {
            Ok(Some(latest)) => {
                return ResolvedVersion {
                    version: None,
                    display: latest.clone(),
                    assumed: Some(latest),
                    unknown: false,
                };
            }
            Ok(None) => {}
            Err(_) => {
                tracing::warn!(name, ecosystem, "latest-version lookup timed out");
            }
        }
    }

    ResolvedVersion {
        version: None,
        display: VERSION_UNKNOWN.to_string(),
        assumed: None,
        unknown: true,
    }
}
