//! **Multi-repository SBOM aggregation and dependency graph analysis.**
//!
//! `sbom-atlas` ingests SBOM documents (CycloneDX and SPDX) for one or many
//! source-code repositories and builds an aggregated dependency model:
//! per-repository dependency sets, globally deduplicated package records
//! with usage counts and provenance, direct/transitive classification, and
//! license/vulnerability overlays.
//!
//! ## Core Concepts & Modules
//!
//! - **[`parsers`]**: Detects SPDX vs CycloneDX and converts either into one
//!   normalized intermediate form (package list + relationship list).
//! - **[`ingest`]**: Builds per-repository dependency records and feeds the
//!   global deduplication store, marking direct dependencies from the
//!   document's own relationship graph.
//! - **[`resolver`]**: Reconstructs multi-level dependency trees from
//!   registry metadata, per ecosystem, with bounded concurrency and
//!   in-flight request coalescing. Resolved depth is authoritative for the
//!   direct/transitive partition.
//! - **[`snapshot`]**: Exports the aggregate model as a stable JSON contract
//!   and merges incremental partial snapshots idempotently.
//! - **[`enrichment`]**: Optional license and vulnerability overlay stages
//!   applied to an exported snapshot.
//!
//! The external collaborators (SBOM provider, package registries,
//! vulnerability database, persistent storage) are consumed through traits
//! ([`sources::SbomSource`], [`registry::RegistryLookup`],
//! [`enrichment::VulnerabilityLookup`], [`storage::Storage`]); concrete
//! clients live outside this crate.
//!
//! ## Getting Started
//!
//! ```no_run
//! use sbom_atlas::config::AtlasConfig;
//! use sbom_atlas::pipeline::analyze_repositories;
//! use sbom_atlas::registry::NullRegistry;
//! use sbom_atlas::sources::FileSource;
//! use sbom_atlas::store::AnalysisStore;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = FileSource::scan(Path::new("./sboms"))?;
//! let repos = source.discovered();
//! let mut store = AnalysisStore::new();
//!
//! let snapshot = analyze_repositories(
//!     &mut store,
//!     &repos,
//!     &source,
//!     Arc::new(NullRegistry),
//!     None,
//!     &AtlasConfig::default(),
//! )
//! .await?;
//!
//! println!(
//!     "{} dependencies across {} repositories",
//!     snapshot.statistics.total_dependencies,
//!     snapshot.statistics.processed_repositories
//! );
//! # Ok(())
//! # }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Cast safety: usize↔f64 casts appear in statistics math, values bounded
    clippy::cast_precision_loss,
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod classify;
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod ingest;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod snapshot;
pub mod sources;
pub mod storage;
pub mod store;
pub mod utils;

// Re-export main types for convenience
pub use config::AtlasConfig;
pub use error::{AtlasError, Result};
pub use model::{
    Category, CategoryKind, DepKey, DependencyRecord, NormalizedDocument, RepoKey,
    RepositoryRecord, TreeNode,
};
pub use parsers::{convert_document, detect_format, DetectedFormat};
pub use registry::{DeclaredDependency, NullRegistry, RegistryLookup, StaticRegistry};
pub use resolver::{resolve_trees, ResolverConfig};
pub use snapshot::{export_snapshot, merge_partial, Snapshot};
pub use sources::{FileSource, RawSbomDocument, SbomSource};
pub use storage::{MemoryStorage, Storage};
pub use store::AnalysisStore;
