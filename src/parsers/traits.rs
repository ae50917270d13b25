//! Adapter trait definition and parse error types.

use crate::model::NormalizedDocument;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during SBOM detection or conversion
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("Invalid SBOM structure: {0}")]
    InvalidStructure(String),

    #[error("Unknown SBOM format: {0}")]
    UnknownFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<ParseError> for crate::error::AtlasError {
    fn from(err: ParseError) -> Self {
        use crate::error::ParseErrorKind;
        let kind = match &err {
            ParseError::UnknownFormat(_) => ParseErrorKind::UnknownFormat,
            other => ParseErrorKind::InvalidJson(other.to_string()),
        };
        Self::parse("SBOM conversion", kind)
    }
}

/// Trait for format-specific SBOM adapters.
///
/// Implementors report whether a parsed JSON document looks like their
/// format (a lightweight structural check, no full deserialization) and
/// convert matching documents into the normalized intermediate form.
pub trait SbomAdapter {
    /// Format name for diagnostics
    fn format_name(&self) -> &'static str;

    /// Lightweight check whether this adapter can handle the document.
    ///
    /// Returns the detected spec version on a match.
    fn detect(&self, doc: &Value) -> Option<Option<String>>;

    /// Convert the document into the normalized form.
    ///
    /// `fallback_name` is used as the project name when the document does
    /// not carry one.
    fn convert(&self, doc: &Value, fallback_name: &str)
        -> Result<NormalizedDocument, ParseError>;
}
