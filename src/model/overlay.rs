//! Overlay annotations contributed by enrichment passes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// License classification produced by the license-classifier collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicenseAssessment {
    /// Classifier category (e.g. "permissive", "copyleft", "unknown")
    pub category: String,
    /// Risk label (e.g. "low", "review")
    pub risk: String,
}

/// One known vulnerability affecting a package version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityRecord {
    /// Advisory identifier (CVE, GHSA, ...)
    pub id: String,
    /// Severity label when the source provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Short human-readable summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
