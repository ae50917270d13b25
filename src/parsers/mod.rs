//! SBOM format adapters.
//!
//! Detects SPDX vs CycloneDX input and converts either into the normalized
//! intermediate form ([`crate::model::NormalizedDocument`]). Unknown format
//! is a terminal error for that document, never fatal to a batch.

mod cyclonedx;
mod detection;
mod spdx;
mod traits;

pub use cyclonedx::CycloneDxAdapter;
pub use detection::{convert_document, detect_format, DetectedFormat};
pub use spdx::SpdxAdapter;
pub use traits::{ParseError, SbomAdapter};
