//! Core data model for the aggregated dependency graph.
//!
//! The model is split between the *normalized document* types produced by
//! the format adapters ([`NormalizedDocument`] and friends) and the
//! *aggregate* records accumulated across repositories
//! ([`DependencyRecord`], [`RepositoryRecord`], [`TreeNode`]). Aggregate
//! records use ordered collections throughout so that exports are
//! deterministic regardless of ingestion order.

mod category;
mod dependency;
mod document;
mod keys;
mod license;
mod overlay;
mod repository;
mod tree;

pub use category::{Category, CategoryKind};
pub use dependency::DependencyRecord;
pub use document::{
    DeclaredRelationship, NormalizedDocument, PackageEntry, ProjectInfo, RelationshipKind,
    SbomFormat,
};
pub use keys::{DepKey, RepoKey};
pub use license::LicenseExpression;
pub use overlay::{LicenseAssessment, VulnerabilityRecord};
pub use repository::RepositoryRecord;
pub use tree::TreeNode;
