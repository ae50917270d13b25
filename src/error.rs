//! Unified error types for sbom-atlas.
//!
//! Input errors (malformed documents, nameless packages) are recovered close
//! to where they occur and surface only in the failure tallies of the final
//! snapshot; the variants here cover the cases callers may need to branch on.

use thiserror::Error;

/// Main error type for sbom-atlas operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AtlasError {
    /// Errors during SBOM parsing or format conversion
    #[error("Failed to parse SBOM: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors during per-repository ingestion
    #[error("Ingestion failed for {repo}: {message}")]
    Ingest { repo: String, message: String },

    /// Errors during transitive tree resolution
    #[error("Tree resolution failed for ecosystem {ecosystem}: {message}")]
    Resolve { ecosystem: String, message: String },

    /// Errors raised by the storage collaborator
    #[error("Storage operation failed at {key}: {message}")]
    Storage { key: String, message: String },

    /// Errors during snapshot export or merge
    #[error("Snapshot operation failed: {0}")]
    Snapshot(String),

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO errors with context
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Unknown SBOM format - expected CycloneDX or SPDX markers")]
    UnknownFormat,

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("CycloneDX conversion error: {0}")]
    CycloneDx(String),

    #[error("SPDX conversion error: {0}")]
    Spdx(String),
}

/// Convenient Result type for sbom-atlas operations
pub type Result<T> = std::result::Result<T, AtlasError>;

impl AtlasError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for an unrecognized document
    pub fn unknown_format(context: impl Into<String>) -> Self {
        Self::parse(context, ParseErrorKind::UnknownFormat)
    }

    /// Create an ingestion error
    pub fn ingest(repo: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingest {
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Create a resolution error
    pub fn resolve(ecosystem: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolve {
            ecosystem: ecosystem.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<std::io::Error> for AtlasError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AtlasError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}
