//! Dependency categorization: kind, language, and ecosystem.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Broad kind of a dependency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Library code pulled in through a package manager
    Code,
    /// CI/CD workflow components (GitHub Actions and similar)
    Workflow,
    /// Container images, system packages, infrastructure tooling
    Infrastructure,
    /// Could not be classified
    Unknown,
}

impl CategoryKind {
    /// Get display label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Workflow => "workflow",
            Self::Infrastructure => "infrastructure",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Full classification of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Broad kind
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// Primary implementation language of the ecosystem
    pub language: String,
    /// Ecosystem display name (npm, PyPI, crates.io, ...)
    pub ecosystem: String,
}

impl Category {
    /// Create a category.
    pub fn new(kind: CategoryKind, language: &str, ecosystem: &str) -> Self {
        Self {
            kind,
            language: language.to_string(),
            ecosystem: ecosystem.to_string(),
        }
    }

    /// The category used when nothing matched.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(CategoryKind::Unknown, "Unknown", "Unknown")
    }

    /// Whether this category carries a known ecosystem.
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.kind != CategoryKind::Unknown
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category() {
        let cat = Category::unknown();
        assert_eq!(cat.kind, CategoryKind::Unknown);
        assert!(!cat.is_classified());
    }

    #[test]
    fn test_serializes_kind_as_type() {
        let cat = Category::new(CategoryKind::Code, "JavaScript", "npm");
        let json = serde_json::to_value(&cat).unwrap();
        assert_eq!(json["type"], "code");
        assert_eq!(json["ecosystem"], "npm");
    }
}
