//! Normalized intermediate form produced by the format adapters.
//!
//! Both SPDX and CycloneDX documents convert into this shape: a flat package
//! list plus SPDX-style element-ID relationship edges. Everything downstream
//! (ingestion, classification) consumes only this form.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Source SBOM format of a converted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SbomFormat {
    Spdx,
    CycloneDx,
}

impl SbomFormat {
    /// Get the human-readable name for this format.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Spdx => "SPDX",
            Self::CycloneDx => "CycloneDX",
        }
    }
}

/// Relationship kind between two document elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RelationshipKind {
    /// Source element depends on target element
    DependsOn,
    /// Source element (usually the document) describes target element
    Describes,
    /// Development-only dependency edge
    DevDependsOn,
    /// Anything else the source document declared
    Other(String),
}

impl RelationshipKind {
    /// Parse an SPDX relationship type string.
    pub fn from_spdx(raw: &str) -> Self {
        match raw {
            "DEPENDS_ON" => Self::DependsOn,
            "DESCRIBES" => Self::Describes,
            "DEV_DEPENDENCY_OF" => Self::DevDependsOn,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether this edge marks the target as a dependency of the source.
    #[must_use]
    pub const fn is_dependency(&self) -> bool {
        matches!(self, Self::DependsOn | Self::DevDependsOn)
    }
}

/// A declared relationship edge between two element IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredRelationship {
    /// Source element ID
    pub source: String,
    /// Relationship kind
    pub kind: RelationshipKind,
    /// Target element ID
    pub target: String,
}

impl DeclaredRelationship {
    /// Create a new relationship edge.
    pub fn new(source: impl Into<String>, kind: RelationshipKind, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind,
            target: target.into(),
        }
    }
}

/// One package entry in a normalized document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEntry {
    /// Stable element ID; synthetic IDs are derived deterministically from
    /// the source identifier so repeated conversion yields identical IDs.
    pub id: String,
    /// Package name
    pub name: Option<String>,
    /// Raw version string as declared (may be a range)
    pub version: Option<String>,
    /// Declared license expression
    pub license: Option<String>,
    /// External reference locators (PURLs, CPEs, URLs)
    pub external_refs: Vec<String>,
    /// Whether this entry is the document's main/root component
    pub is_main: bool,
}

impl PackageEntry {
    /// Create a minimal entry.
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            version: None,
            license: None,
            external_refs: Vec::new(),
            is_main: false,
        }
    }

    /// First PURL-style external reference, if any.
    #[must_use]
    pub fn purl(&self) -> Option<&str> {
        self.external_refs
            .iter()
            .map(String::as_str)
            .find(|r| r.starts_with("pkg:"))
    }
}

/// Document-level information carried through conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Document or project name
    pub name: String,
    /// Element ID of the main/root package, when the document declares one
    pub main_element_id: Option<String>,
    /// Source format
    pub format: SbomFormat,
    /// Source format version (e.g. "2.3", "1.5")
    pub format_version: Option<String>,
}

/// A fully converted SBOM document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDocument {
    /// All package entries, main component included
    pub packages: Vec<PackageEntry>,
    /// Declared relationship edges
    pub relationships: Vec<DeclaredRelationship>,
    /// Document-level info
    pub project: ProjectInfo,
}

impl NormalizedDocument {
    /// The main package entry, if the document declares one.
    #[must_use]
    pub fn main_package(&self) -> Option<&PackageEntry> {
        self.packages.iter().find(|p| p.is_main)
    }

    /// Element IDs that the main element directly depends on.
    pub fn direct_target_ids(&self) -> Vec<&str> {
        let Some(main_id) = self
            .project
            .main_element_id
            .as_deref()
            .or_else(|| self.main_package().map(|p| p.id.as_str()))
        else {
            return Vec::new();
        };

        self.relationships
            .iter()
            .filter(|r| r.kind.is_dependency() && r.source == main_id)
            .map(|r| r.target.as_str())
            .collect()
    }
}
