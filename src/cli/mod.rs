//! CLI command handlers.
//!
//! This module provides testable command handlers invoked by main.rs. Each
//! handler implements the business logic for one subcommand.

use crate::config::AtlasConfig;
use crate::pipeline::analyze_repositories;
use crate::registry::NullRegistry;
use crate::snapshot::{merge_partial, Snapshot};
use crate::sources::FileSource;
use crate::storage::MemoryStorage;
use crate::store::AnalysisStore;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Analyze a directory of SBOM files and return the snapshot JSON.
///
/// Files are named `owner__name.json` or nested `owner/name.json`. Without
/// a network registry collaborator, transitive resolution works from
/// declared relationships only.
pub async fn run_analyze(input_dir: &Path, config: &AtlasConfig) -> Result<String> {
    let source = FileSource::scan(input_dir)
        .with_context(|| format!("scanning {}", input_dir.display()))?;
    let repos = source.discovered();
    if repos.is_empty() {
        tracing::warn!(dir = %input_dir.display(), "no SBOM files found");
    }

    let mut store = AnalysisStore::new();
    let storage = MemoryStorage::new();
    let snapshot = analyze_repositories(
        &mut store,
        &repos,
        &source,
        Arc::new(NullRegistry),
        Some(&storage),
        config,
    )
    .await
    .context("analysis failed")?;

    serde_json::to_string_pretty(&snapshot).context("serializing snapshot")
}

/// Merge snapshot files into one accumulated snapshot.
///
/// Partials are folded in argument order; the last one is merged with
/// `is_final` when requested.
pub fn run_merge(inputs: &[std::path::PathBuf], is_final: bool) -> Result<String> {
    let mut accumulated: Option<Snapshot> = None;
    let last = inputs.len().saturating_sub(1);
    for (index, path) in inputs.iter().enumerate() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let partial: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        let finalize = is_final && index == last;
        accumulated = Some(merge_partial(accumulated.as_ref(), &partial, finalize));
    }

    let merged = accumulated.context("no snapshot inputs given")?;
    serde_json::to_string_pretty(&merged).context("serializing merged snapshot")
}

/// Print the JSON schema of the snapshot export contract.
pub fn run_schema() -> Result<String> {
    let schema = schemars::schema_for!(Snapshot);
    serde_json::to_string_pretty(&schema).context("serializing schema")
}
