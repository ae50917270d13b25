//! End-to-end resolution tests: ingest real documents, resolve trees
//! against a stub registry, and check the partition invariant.

use sbom_atlas::ingest::ingest;
use sbom_atlas::model::{DepKey, RepoKey};
use sbom_atlas::parsers::convert_document;
use sbom_atlas::registry::{DeclaredDependency, StaticRegistry};
use sbom_atlas::resolver::{resolve_trees, ResolverConfig};
use sbom_atlas::store::AnalysisStore;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(500);

fn cyclonedx_with_direct(names: &[(&str, &str)]) -> serde_json::Value {
    let components: Vec<serde_json::Value> = names
        .iter()
        .map(|(name, version)| {
            json!({
                "bom-ref": format!("ref-{name}"),
                "name": name,
                "version": version,
                "purl": format!("pkg:npm/{name}@{version}")
            })
        })
        .collect();
    let depends_on: Vec<String> = names.iter().map(|(n, _)| format!("ref-{n}")).collect();
    json!({
        "bomFormat": "CycloneDX",
        "specVersion": "1.5",
        "metadata": {"component": {"bom-ref": "root", "name": "app", "version": "1.0.0"}},
        "components": components,
        "dependencies": [{"ref": "root", "dependsOn": depends_on}]
    })
}

async fn ingest_raw(store: &mut AnalysisStore, repo: &RepoKey, raw: &serde_json::Value) {
    let doc = convert_document(raw, repo.name()).unwrap();
    let registry = StaticRegistry::new();
    ingest(store, repo, &doc, &registry, TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn diamond_dependency_resolves_to_min_depth() {
    let raw = cyclonedx_with_direct(&[("b", "1.0.0"), ("c", "1.0.0")]);
    let mut store = AnalysisStore::new();
    let repo = RepoKey::new("octocat", "app");
    ingest_raw(&mut store, &repo, &raw).await;

    let registry = StaticRegistry::new()
        .with_dependencies(
            "npm",
            "b",
            "1.0.0",
            vec![DeclaredDependency::new("d", Some("2.0.0".to_string()))],
        )
        .with_dependencies(
            "npm",
            "c",
            "1.0.0",
            vec![DeclaredDependency::new("d", Some("2.0.0".to_string()))],
        );

    let trees = resolve_trees(
        &mut store,
        Arc::new(registry),
        &ResolverConfig::default(),
        |_, _| {},
    )
    .await;

    let d = &trees["npm"][&DepKey::new("d", "2.0.0")];
    assert_eq!(d.depth, 2);
    assert!(d.parents.contains(&DepKey::new("b", "1.0.0")));
    assert!(d.parents.contains(&DepKey::new("c", "1.0.0")));

    let record = store.dependency(&DepKey::new("d", "2.0.0")).unwrap();
    assert!(record.transitive_in.contains(&repo));
    assert_eq!(record.depth, Some(2));
}

#[tokio::test]
async fn partition_holds_for_every_record_after_resolution() {
    let raw = cyclonedx_with_direct(&[("a", "1.0.0"), ("b", "1.0.0")]);
    let mut store = AnalysisStore::new();
    ingest_raw(&mut store, &RepoKey::new("org", "one"), &raw).await;
    ingest_raw(&mut store, &RepoKey::new("org", "two"), &raw).await;

    let registry = StaticRegistry::new()
        .with_dependencies(
            "npm",
            "a",
            "1.0.0",
            vec![
                DeclaredDependency::new("x", Some("1.1.0".to_string())),
                DeclaredDependency::new("y", None),
            ],
        )
        .with_dependencies(
            "npm",
            "x",
            "1.1.0",
            vec![DeclaredDependency::new("z", Some("0.3.0".to_string()))],
        );

    resolve_trees(
        &mut store,
        Arc::new(registry),
        &ResolverConfig::default(),
        |_, _| {},
    )
    .await;

    for record in store.dependencies.values() {
        assert!(
            record.partition_holds(),
            "partition violated for {}",
            record.key()
        );
    }
}

#[tokio::test]
async fn counts_recomputed_after_resolution() {
    let raw = cyclonedx_with_direct(&[("a", "1.0.0")]);
    let mut store = AnalysisStore::new();
    ingest_raw(&mut store, &RepoKey::new("org", "one"), &raw).await;
    ingest_raw(&mut store, &RepoKey::new("org", "two"), &raw).await;

    let registry = StaticRegistry::new().with_dependencies(
        "npm",
        "a",
        "1.0.0",
        vec![DeclaredDependency::new("shared", Some("1.0.0".to_string()))],
    );
    resolve_trees(
        &mut store,
        Arc::new(registry),
        &ResolverConfig::default(),
        |_, _| {},
    )
    .await;

    let shared = store.dependency(&DepKey::new("shared", "1.0.0")).unwrap();
    assert_eq!(shared.repositories.len(), 2, "reachable from both repos");
    assert_eq!(shared.count, 2);
}

#[tokio::test]
async fn ecosystem_failure_does_not_block_others() {
    // One npm direct dep with registry data, one cargo direct dep whose
    // registry knows nothing: the npm ecosystem must still resolve fully.
    let raw = json!({
        "bomFormat": "CycloneDX",
        "specVersion": "1.5",
        "metadata": {"component": {"bom-ref": "root", "name": "app", "version": "1.0.0"}},
        "components": [
            {"bom-ref": "a", "name": "a", "version": "1.0.0", "purl": "pkg:npm/a@1.0.0"},
            {"bom-ref": "b", "name": "serde", "version": "1.0.200", "purl": "pkg:cargo/serde@1.0.200"}
        ],
        "dependencies": [{"ref": "root", "dependsOn": ["a", "b"]}]
    });
    let mut store = AnalysisStore::new();
    ingest_raw(&mut store, &RepoKey::new("org", "app"), &raw).await;

    let registry = StaticRegistry::new().with_dependencies(
        "npm",
        "a",
        "1.0.0",
        vec![DeclaredDependency::new("child", Some("0.1.0".to_string()))],
    );
    let trees = resolve_trees(
        &mut store,
        Arc::new(registry),
        &ResolverConfig::default(),
        |_, _| {},
    )
    .await;

    assert!(trees["npm"].contains_key(&DepKey::new("child", "0.1.0")));
    assert_eq!(trees["cargo"].len(), 1, "cargo tree is just its seed");
}
