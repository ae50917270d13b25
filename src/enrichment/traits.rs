//! Enrichment collaborator traits.

use crate::model::{LicenseAssessment, VulnerabilityRecord};
use async_trait::async_trait;

/// License-string classification collaborator.
///
/// The classification rules themselves are out of scope; the core only
/// consumes the resulting `{category, risk}` pair.
pub trait LicenseClassifier: Send + Sync {
    /// Classify one license expression.
    fn classify(&self, license: &str) -> LicenseAssessment;
}

/// Vulnerability database collaborator.
#[async_trait]
pub trait VulnerabilityLookup: Send + Sync {
    /// Known vulnerabilities for one package version; empty on miss.
    async fn query(&self, name: &str, version: &str, ecosystem: &str) -> Vec<VulnerabilityRecord>;
}

/// Null classifier: everything is unknown/review.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLicenseClassifier;

impl LicenseClassifier for NoOpLicenseClassifier {
    fn classify(&self, _license: &str) -> LicenseAssessment {
        LicenseAssessment {
            category: "unknown".to_string(),
            risk: "review".to_string(),
        }
    }
}

/// Null lookup: never reports findings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpVulnerabilityLookup;

#[async_trait]
impl VulnerabilityLookup for NoOpVulnerabilityLookup {
    async fn query(
        &self,
        _name: &str,
        _version: &str,
        _ecosystem: &str,
    ) -> Vec<VulnerabilityRecord> {
        Vec::new()
    }
}
