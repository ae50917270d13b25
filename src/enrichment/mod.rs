//! Optional enrichment passes over an exported snapshot.
//!
//! Enrichment is composition, not patching: each pass is a pipeline stage
//! applied to a [`Snapshot`] after export. The collaborators are consumed
//! through the traits in [`traits`]; when a collaborator is absent the
//! overlay fields simply stay `None`.

mod license;
mod traits;

pub use license::SpdxLicenseClassifier;
pub use traits::{
    LicenseClassifier, NoOpLicenseClassifier, NoOpVulnerabilityLookup, VulnerabilityLookup,
};

use crate::classify::registry_ecosystem;
use crate::model::VulnerabilityRecord;
use crate::snapshot::Snapshot;
use futures::stream::{self, StreamExt};
use std::time::Duration;

/// Annotate every dependency's license overlay.
///
/// Dependencies without a declared license are left unannotated.
pub fn apply_license_overlay(snapshot: &mut Snapshot, classifier: &dyn LicenseClassifier) {
    let mut annotated = 0usize;
    for dep in &mut snapshot.all_dependencies {
        if let Some(license) = &dep.license {
            dep.license_assessment = Some(classifier.classify(&license.expression));
            annotated += 1;
        }
    }
    tracing::debug!(annotated, "license overlay applied");
}

/// Annotate every dependency's vulnerability overlay.
///
/// Lookups fan out with a bounded concurrency cap and a per-call timeout
/// that degrades to "no findings". Returns the number of dependencies with
/// at least one finding.
pub async fn apply_vulnerability_overlay(
    snapshot: &mut Snapshot,
    lookup: &dyn VulnerabilityLookup,
    concurrency: usize,
    timeout: Duration,
) -> usize {
    let queries: Vec<(usize, String, String, &'static str)> = snapshot
        .all_dependencies
        .iter()
        .enumerate()
        .filter(|(_, d)| !d.version_unknown)
        .filter_map(|(i, d)| {
            registry_ecosystem(&d.category)
                .map(|eco| (i, d.name.clone(), d.display_version.clone(), eco))
        })
        .collect();

    let results: Vec<(usize, Vec<VulnerabilityRecord>)> = stream::iter(queries)
        .map(|(i, name, version, ecosystem)| async move {
            let found = match tokio::time::timeout(timeout, lookup.query(&name, &version, ecosystem))
                .await
            {
                Ok(records) => records,
                Err(_) => {
                    tracing::warn!(%name, ecosystem, "vulnerability lookup timed out");
                    Vec::new()
                }
            };
            (i, found)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut affected = 0usize;
    for (index, records) in results {
        if !records.is_empty() {
            affected += 1;
        }
        if let Some(dep) = snapshot.all_dependencies.get_mut(index) {
            dep.vulnerabilities = Some(records);
        }
    }
    affected
}
