//! Package-registry collaborator interface.
//!
//! The core never talks to a registry directly; it consumes this trait.
//! Concrete HTTP clients (with their caching and rate-limit policy) live
//! outside the crate. [`StaticRegistry`] is the in-memory implementation
//! used by tests and offline runs, and [`NullRegistry`] is the null object
//! for when no registry is available.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One dependency edge as declared in registry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredDependency {
    /// Package name
    pub name: String,
    /// Declared version requirement, when the registry supplies one
    pub version_range: Option<String>,
}

impl DeclaredDependency {
    /// Create a declared dependency.
    pub fn new(name: impl Into<String>, version_range: Option<String>) -> Self {
        Self {
            name: name.into(),
            version_range,
        }
    }
}

/// Async registry metadata lookup.
///
/// Both methods resolve to `None` on a miss; failures inside an
/// implementation are expected to be mapped to `None` as well, with the
/// implementation doing its own logging. The core never retries.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    /// Best-guess latest published version of a package.
    async fn latest_version(&self, name: &str, ecosystem: &str) -> Option<String>;

    /// Declared dependencies of one package version.
    async fn dependencies_of(
        &self,
        name: &str,
        version: &str,
        ecosystem: &str,
    ) -> Option<Vec<DeclaredDependency>>;
}

/// Null registry: every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRegistry;

#[async_trait]
impl RegistryLookup for NullRegistry {
    async fn latest_version(&self, _name: &str, _ecosystem: &str) -> Option<String> {
        None
    }

    async fn dependencies_of(
        &self,
        _name: &str,
        _version: &str,
        _ecosystem: &str,
    ) -> Option<Vec<DeclaredDependency>> {
        None
    }
}

/// In-memory registry backed by static maps.
///
/// Keys are `ecosystem:name` for latest versions and
/// `ecosystem:name@version` for dependency lists.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    latest: HashMap<String, String>,
    dependencies: HashMap<String, Vec<DeclaredDependency>>,
}

impl StaticRegistry {
    /// Create an empty static registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a latest version for `ecosystem:name`.
    #[must_use]
    pub fn with_latest(mut self, ecosystem: &str, name: &str, version: &str) -> Self {
        self.latest
            .insert(format!("{ecosystem}:{name}"), version.to_string());
        self
    }

    /// Register a dependency list for `ecosystem:name@version`.
    #[must_use]
    pub fn with_dependencies(
        mut self,
        ecosystem: &str,
        name: &str,
        version: &str,
        deps: Vec<DeclaredDependency>,
    ) -> Self {
        self.dependencies
            .insert(format!("{ecosystem}:{name}@{version}"), deps);
        self
    }
}

#[async_trait]
impl RegistryLookup for StaticRegistry {
    async fn latest_version(&self, name: &str, ecosystem: &str) -> Option<String> {
        self.latest.get(&format!("{ecosystem}:{name}")).cloned()
    }

    async fn dependencies_of(
        &self,
        name: &str,
        version: &str,
        ecosystem: &str,
    ) -> Option<Vec<DeclaredDependency>> {
        self.dependencies
            .get(&format!("{ecosystem}:{name}@{version}"))
            .cloned()
    }
}
