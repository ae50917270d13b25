//! Configuration types with defaults, file loading, and validation.
//!
//! Configuration can come from YAML or JSON files, searched through a
//! precedence list of paths, or fall back to built-in defaults. All values
//! are plain tunables; collaborator endpoints are configured on the
//! collaborator implementations, not here.

use crate::error::{AtlasError, Result};
use crate::resolver::ResolverConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default config file locations, most specific first.
pub const CONFIG_PATHS: [&str; 3] = [
    ".sbom-atlas.yaml",
    ".config/sbom-atlas/config.yaml",
    "~/.config/sbom-atlas/config.yaml",
];

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AtlasConfig {
    /// Ingestion tunables
    pub ingest: IngestSettings,
    /// Tree-resolution tunables
    pub resolver: ResolverSettings,
    /// Snapshot export tunables
    pub export: ExportSettings,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            ingest: IngestSettings::default(),
            resolver: ResolverSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

/// Ingestion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct IngestSettings {
    /// Fixed delay between repositories, respecting the SBOM source's rate
    /// limits. A deliberate throttle, not a performance limitation.
    pub inter_repo_delay_ms: u64,
    /// Timeout for best-effort latest-version lookups
    pub lookup_timeout_secs: u64,
    /// Repositories per incremental checkpoint
    pub checkpoint_interval: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            inter_repo_delay_ms: 250,
            lookup_timeout_secs: 10,
            checkpoint_interval: 25,
        }
    }
}

/// Tree-resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverSettings {
    /// Maximum tree depth (direct = 1)
    pub max_depth: u32,
    /// Bound on in-flight registry requests
    pub concurrency: usize,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: 5,
            concurrency: 8,
            request_timeout_secs: 10,
        }
    }
}

impl ResolverSettings {
    /// Convert into the resolver's runtime configuration.
    #[must_use]
    pub fn to_resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            max_depth: self.max_depth,
            concurrency: self.concurrency,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Snapshot export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    /// Size of the top-N lists
    pub top_n: usize,
    /// Processed-repository count above which non-final partial payloads
    /// omit the full per-record arrays
    pub partial_detail_threshold: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            partial_detail_threshold: 100,
        }
    }
}

impl AtlasConfig {
    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| AtlasError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AtlasError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (format by extension, YAML first
    /// otherwise).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml" | "yml") => Self::from_yaml(&content),
            _ => Self::from_yaml(&content).or_else(|_| Self::from_json(&content)),
        }
    }

    /// Load the first existing config file from the precedence list, or the
    /// built-in defaults.
    pub fn load_with_precedence(paths: &[&str]) -> Result<Self> {
        for path_str in paths {
            let path = if let Some(rest) = path_str.strip_prefix("~/") {
                let Some(home) = dirs::home_dir() else {
                    continue;
                };
                home.join(rest)
            } else {
                Path::new(path_str).to_path_buf()
            };

            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Check invariants on the configured values.
    pub fn validate(&self) -> Result<()> {
        if self.resolver.max_depth == 0 {
            return Err(AtlasError::config("resolver.maxDepth must be at least 1"));
        }
        if self.resolver.concurrency == 0 {
            return Err(AtlasError::config("resolver.concurrency must be at least 1"));
        }
        if self.export.top_n == 0 {
            return Err(AtlasError::config("export.topN must be at least 1"));
        }
        if self.ingest.checkpoint_interval == 0 {
            return Err(AtlasError::config(
                "ingest.checkpointInterval must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AtlasConfig::default().validate().is_ok());
    }

    #[test]
    fn test_yaml_overrides() {
        let config = AtlasConfig::from_yaml(
            r"
resolver:
  maxDepth: 3
  concurrency: 4
export:
  topN: 25
",
        )
        .unwrap();

        assert_eq!(config.resolver.max_depth, 3);
        assert_eq!(config.resolver.concurrency, 4);
        assert_eq!(config.export.top_n, 25);
        // Unspecified sections keep defaults
        assert_eq!(config.ingest.checkpoint_interval, 25);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = AtlasConfig::from_yaml("resolver:\n  maxDepth: 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_file_loading_by_extension() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"export": {"topN": 7}}"#).unwrap();

        let config = AtlasConfig::from_file(&path).unwrap();
        assert_eq!(config.export.top_n, 7);
    }

    #[test]
    fn test_precedence_falls_back_to_defaults() {
        let config = AtlasConfig::load_with_precedence(&["/nonexistent/path.yaml"]).unwrap();
        assert_eq!(config, AtlasConfig::default());
    }
}
