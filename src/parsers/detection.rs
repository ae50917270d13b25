//! Centralized format detection for SBOM documents.
//!
//! Detection order is fixed: explicit CycloneDX markers, then explicit SPDX
//! markers, then a structural heuristic for bare arrays of SPDX-style
//! elements. A document matching none of the three is an unknown format.

use super::traits::{ParseError, SbomAdapter};
use super::{CycloneDxAdapter, SpdxAdapter};
use crate::model::{NormalizedDocument, SbomFormat};
use serde_json::Value;

/// Result of format detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedFormat {
    /// Detected format
    pub format: SbomFormat,
    /// Detected spec version if present (e.g. "1.5", "SPDX-2.3")
    pub version: Option<String>,
}

/// Detect the format of a parsed SBOM document.
pub fn detect_format(doc: &Value) -> Result<DetectedFormat, ParseError> {
    let cyclonedx = CycloneDxAdapter::new();
    if let Some(version) = cyclonedx.detect(doc) {
        return Ok(DetectedFormat {
            format: SbomFormat::CycloneDx,
            version,
        });
    }

    let spdx = SpdxAdapter::new();
    if let Some(version) = spdx.detect(doc) {
        return Ok(DetectedFormat {
            format: SbomFormat::Spdx,
            version,
        });
    }

    // Structural heuristic: an array of objects carrying SPDX-style
    // identifier fields is treated as a bare SPDX package list.
    if let Value::Array(items) = doc {
        let spdx_like = items
            .iter()
            .filter_map(Value::as_object)
            .any(|o| o.contains_key("SPDXID"));
        if spdx_like {
            return Ok(DetectedFormat {
                format: SbomFormat::Spdx,
                version: None,
            });
        }
    }

    Err(ParseError::UnknownFormat(
        "expected CycloneDX or SPDX markers".to_string(),
    ))
}

/// Detect and convert a document in one step.
pub fn convert_document(
    doc: &Value,
    fallback_name: &str,
) -> Result<NormalizedDocument, ParseError> {
    let detected = detect_format(doc)?;
    tracing::debug!(
        format = detected.format.name(),
        version = detected.version.as_deref().unwrap_or("unknown"),
        "detected SBOM format"
    );

    match detected.format {
        SbomFormat::CycloneDx => CycloneDxAdapter::new().convert(doc, fallback_name),
        SbomFormat::Spdx => SpdxAdapter::new().convert(doc, fallback_name),
    }
}
