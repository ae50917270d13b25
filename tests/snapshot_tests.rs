//! Snapshot export and merge integration tests, including the CycloneDX /
//! SPDX structural-equivalence check.

use sbom_atlas::ingest::ingest;
use sbom_atlas::model::{NormalizedDocument, RepoKey};
use sbom_atlas::parsers::convert_document;
use sbom_atlas::registry::NullRegistry;
use sbom_atlas::snapshot::{export_snapshot, merge_partial};
use sbom_atlas::store::AnalysisStore;
use serde_json::json;
use std::collections::BTreeSet;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(500);

/// Project a document to (name, version) pairs plus name-level edges for
/// structural comparison across formats.
fn structure(doc: &NormalizedDocument) -> (BTreeSet<(String, String)>, BTreeSet<(String, String)>) {
    let id_to_name: std::collections::HashMap<&str, &str> = doc
        .packages
        .iter()
        .filter_map(|p| p.name.as_deref().map(|n| (p.id.as_str(), n)))
        .collect();
    let packages = doc
        .packages
        .iter()
        .filter_map(|p| {
            p.name
                .clone()
                .map(|n| (n, p.version.clone().unwrap_or_default()))
        })
        .collect();
    let edges = doc
        .relationships
        .iter()
        .filter(|r| r.kind.is_dependency())
        .filter_map(|r| {
            Some((
                (*id_to_name.get(r.source.as_str())?).to_string(),
                (*id_to_name.get(r.target.as_str())?).to_string(),
            ))
        })
        .collect();
    (packages, edges)
}

#[test]
fn scenario_e_cyclonedx_and_spdx_convert_equivalently() {
    let cyclonedx = json!({
        "bomFormat": "CycloneDX",
        "specVersion": "1.5",
        "components": [
            {"bom-ref": "a", "name": "alpha", "version": "1.0.0"},
            {"bom-ref": "b", "name": "beta", "version": "2.0.0"}
        ],
        "dependencies": [{"ref": "a", "dependsOn": ["b"]}]
    });
    let spdx = json!({
        "spdxVersion": "SPDX-2.3",
        "SPDXID": "SPDXRef-DOCUMENT",
        "name": "same-graph",
        "packages": [
            {"SPDXID": "SPDXRef-a", "name": "alpha", "versionInfo": "1.0.0"},
            {"SPDXID": "SPDXRef-b", "name": "beta", "versionInfo": "2.0.0"}
        ],
        "relationships": [
            {"spdxElementId": "SPDXRef-a", "relationshipType": "DEPENDS_ON",
             "relatedSpdxElement": "SPDXRef-b"}
        ]
    });

    let from_cdx = convert_document(&cyclonedx, "x").unwrap();
    let from_spdx = convert_document(&spdx, "x").unwrap();

    assert_eq!(structure(&from_cdx), structure(&from_spdx));
}

async fn snapshot_for(repo: &str, packages: &[(&str, &str)]) -> sbom_atlas::Snapshot {
    let components: Vec<serde_json::Value> = packages
        .iter()
        .map(|(name, version)| {
            json!({"bom-ref": format!("r-{name}"), "name": name, "version": version,
                   "purl": format!("pkg:npm/{name}@{version}")})
        })
        .collect();
    let depends_on: Vec<String> = packages.iter().map(|(n, _)| format!("r-{n}")).collect();
    let raw = json!({
        "bomFormat": "CycloneDX",
        "specVersion": "1.5",
        "metadata": {"component": {"bom-ref": "root", "name": repo, "version": "1.0.0"}},
        "components": components,
        "dependencies": [{"ref": "root", "dependsOn": depends_on}]
    });
    let doc = convert_document(&raw, repo).unwrap();

    let mut store = AnalysisStore::new();
    store.tally.total = 1;
    store.tally.processed = 1;
    store.tally.successful = 1;
    ingest(&mut store, &RepoKey::new("org", repo), &doc, &NullRegistry, TIMEOUT)
        .await
        .unwrap();
    export_snapshot(&store)
}

#[tokio::test]
async fn merge_partial_is_idempotent() {
    let first = snapshot_for("one", &[("a", "1.0.0"), ("b", "1.0.0")]).await;
    let second = snapshot_for("two", &[("a", "1.0.0"), ("c", "3.0.0")]).await;

    let once = merge_partial(Some(&first), &second, false);
    let twice = merge_partial(Some(&once), &second, false);

    assert_eq!(
        serde_json::to_value(&once).unwrap(),
        serde_json::to_value(&twice).unwrap()
    );
}

#[tokio::test]
async fn merge_unions_repositories_per_dependency() {
    let first = snapshot_for("one", &[("a", "1.0.0")]).await;
    let second = snapshot_for("two", &[("a", "1.0.0")]).await;

    let merged = merge_partial(Some(&first), &second, true);
    let a = merged.all_dependencies.iter().find(|d| d.name == "a").unwrap();
    assert_eq!(a.count, 2);
    assert_eq!(merged.statistics.total_dependencies, 1);
    assert_eq!(merged.statistics.processed_repositories, 2);
}

#[tokio::test]
async fn version_sprawl_reported_as_distinct_records() {
    let first = snapshot_for("one", &[("a", "1.0.0")]).await;
    let second = snapshot_for("two", &[("a", "2.0.0")]).await;

    let merged = merge_partial(Some(&first), &second, true);
    let versions: BTreeSet<&str> = merged
        .all_dependencies
        .iter()
        .filter(|d| d.name == "a")
        .map(|d| d.display_version.as_str())
        .collect();
    assert_eq!(versions.len(), 2, "version is part of identity");
}

#[tokio::test]
async fn snapshot_serialization_round_trips() {
    let snapshot = snapshot_for("one", &[("a", "1.0.0")]).await;
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: sbom_atlas::Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(
        back.statistics.total_dependencies,
        snapshot.statistics.total_dependencies
    );
}
