//! Stable keys for global dependency and repository records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Global dependency record key: `name@displayVersion`.
///
/// Version is part of identity by design: the same package at two versions
/// produces two records (version sprawl is reported, not collapsed).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct DepKey(String);

impl DepKey {
    /// Build a key from a package name and its display version.
    pub fn new(name: &str, display_version: &str) -> Self {
        Self(format!("{name}@{display_version}"))
    }

    /// The raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The package-name half of the key.
    #[must_use]
    pub fn name(&self) -> &str {
        // The display version never contains '@' but scoped npm names start
        // with one, so split from the right.
        self.0.rsplit_once('@').map_or(self.0.as_str(), |(n, _)| n)
    }

    /// The display-version half of the key.
    #[must_use]
    pub fn display_version(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, v)| v)
    }
}

impl fmt::Display for DepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DepKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Repository record key: `owner/name`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct RepoKey(String);

impl RepoKey {
    /// Build a key from repository owner and name.
    pub fn new(owner: &str, name: &str) -> Self {
        Self(format!("{owner}/{name}"))
    }

    /// The raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The owner half of the key.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(o, _)| o)
    }

    /// The repository-name half of the key.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, n)| n)
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RepoKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
