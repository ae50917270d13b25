//! License expression wrapper with SPDX validity.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A declared license expression as found in an SBOM package entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicenseExpression {
    /// Raw expression text (e.g. `MIT OR Apache-2.0`)
    pub expression: String,
    /// Whether the expression parses as valid SPDX
    pub is_valid_spdx: bool,
}

impl LicenseExpression {
    /// Wrap a raw license string, checking SPDX validity.
    pub fn new(expression: String) -> Self {
        let is_valid_spdx =
            spdx::Expression::parse_mode(&expression, spdx::ParseMode::LAX).is_ok();
        Self {
            expression,
            is_valid_spdx,
        }
    }
}
