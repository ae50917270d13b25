//! Ecosystem classification for package entries.
//!
//! Classification is pure and deterministic. The primary path reads a PURL
//! from the package's external references and resolves its type token
//! against a static ecosystem table. When no PURL is present (or the token
//! is unknown) an ordered list of name-pattern rules takes over; see
//! [`rules`].

mod rules;

pub use rules::{name_rules, NameRule};

use crate::model::{Category, CategoryKind, PackageEntry};
use packageurl::PackageUrl;
use std::str::FromStr;

/// Classify a package entry into `{type, language, ecosystem}`.
///
/// Unclassifiable packages get `{unknown, Unknown, Unknown}`.
pub fn classify(pkg: &PackageEntry) -> Category {
    if let Some(purl) = pkg.purl() {
        if let Some(category) = classify_purl(purl) {
            return category;
        }
    }

    let Some(name) = pkg.name.as_deref() else {
        return Category::unknown();
    };
    classify_name(name)
}

/// Classify from a PURL string alone.
fn classify_purl(purl: &str) -> Option<Category> {
    let ecosystem_token = match PackageUrl::from_str(purl) {
        Ok(parsed) => parsed.ty().to_string(),
        // Tolerate malformed PURLs the way generators emit them: take the
        // token between "pkg:" and the first '/'.
        Err(_) => purl.strip_prefix("pkg:")?.split('/').next()?.to_string(),
    };
    lookup_ecosystem(&normalize_alias(&ecosystem_token))
}

/// Classify from a bare package name via the ordered rule list.
pub fn classify_name(name: &str) -> Category {
    for rule in name_rules() {
        if (rule.applies)(name) {
            return rule.category.clone();
        }
    }
    Category::unknown()
}

/// Normalize ecosystem token aliases (`golang` → `go`, `gem` → `rubygems`, ...).
fn normalize_alias(token: &str) -> String {
    match token.to_lowercase().as_str() {
        "golang" => "go".to_string(),
        "gem" => "rubygems".to_string(),
        "crates" | "crates.io" => "cargo".to_string(),
        "composer" => "packagist".to_string(),
        "github" => "githubactions".to_string(),
        "oci" => "docker".to_string(),
        other => other.to_string(),
    }
}

/// Static ecosystem table: token → `{type, language, display name}`.
fn lookup_ecosystem(token: &str) -> Option<Category> {
    let (kind, language, ecosystem) = match token {
        "npm" => (CategoryKind::Code, "JavaScript", "npm"),
        "pypi" => (CategoryKind::Code, "Python", "PyPI"),
        "cargo" => (CategoryKind::Code, "Rust", "crates.io"),
        "rubygems" => (CategoryKind::Code, "Ruby", "RubyGems"),
        "go" => (CategoryKind::Code, "Go", "Go"),
        "maven" => (CategoryKind::Code, "Java", "Maven"),
        "nuget" => (CategoryKind::Code, "C#", "NuGet"),
        "packagist" => (CategoryKind::Code, "PHP", "Packagist"),
        "hex" => (CategoryKind::Code, "Elixir", "Hex"),
        "pub" => (CategoryKind::Code, "Dart", "pub.dev"),
        "swift" => (CategoryKind::Code, "Swift", "Swift PM"),
        "cocoapods" => (CategoryKind::Code, "Objective-C", "CocoaPods"),
        "githubactions" => (CategoryKind::Workflow, "YAML", "GitHub Actions"),
        "docker" => (CategoryKind::Infrastructure, "Container", "Docker"),
        "apk" => (CategoryKind::Infrastructure, "System", "Alpine"),
        "deb" => (CategoryKind::Infrastructure, "System", "Debian"),
        "rpm" => (CategoryKind::Infrastructure, "System", "RPM"),
        _ => return None,
    };
    Some(Category::new(kind, language, ecosystem))
}

/// Category for a registry lookup token, used when a package is first seen
/// through registry metadata rather than an SBOM entry.
#[must_use]
pub fn category_for_registry_token(token: &str) -> Category {
    lookup_ecosystem(&normalize_alias(token)).unwrap_or_else(Category::unknown)
}

/// Canonical registry lookup token for a classified category.
///
/// Only code ecosystems with a queryable registry return a token; workflow,
/// infrastructure, and unknown categories never issue registry lookups.
#[must_use]
pub fn registry_ecosystem(category: &Category) -> Option<&'static str> {
    match category.ecosystem.as_str() {
        "npm" => Some("npm"),
        "PyPI" => Some("pypi"),
        "crates.io" => Some("cargo"),
        "RubyGems" => Some("rubygems"),
        "Go" => Some("go"),
        "Maven" => Some("maven"),
        "NuGet" => Some("nuget"),
        "Packagist" => Some("packagist"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_purl(name: &str, purl: &str) -> PackageEntry {
        let mut entry = PackageEntry::new("id", Some(name.to_string()));
        entry.external_refs.push(purl.to_string());
        entry
    }

    #[test]
    fn test_purl_classification() {
        let cat = classify(&entry_with_purl("lodash", "pkg:npm/lodash@4.17.21"));
        assert_eq!(cat.ecosystem, "npm");
        assert_eq!(cat.kind, CategoryKind::Code);
    }

    #[test]
    fn test_purl_alias_golang() {
        let cat = classify(&entry_with_purl(
            "golang.org/x/text",
            "pkg:golang/golang.org/x/text@v0.14.0",
        ));
        assert_eq!(cat.ecosystem, "Go");
        assert_eq!(cat.language, "Go");
    }

    #[test]
    fn test_malformed_purl_falls_back_to_token_split() {
        let cat = classify(&entry_with_purl("requests", "pkg:pypi/requests@@@"));
        assert_eq!(cat.ecosystem, "PyPI");
    }

    #[test]
    fn test_no_purl_uses_name_rules() {
        let entry = PackageEntry::new("id", Some("@babel/core".to_string()));
        assert_eq!(classify(&entry).ecosystem, "npm");
    }

    #[test]
    fn test_nameless_package_is_unknown() {
        let entry = PackageEntry::new("id", None);
        assert_eq!(classify(&entry), Category::unknown());
    }

    #[test]
    fn test_deterministic() {
        let entry = entry_with_purl("serde", "pkg:cargo/serde@1.0.200");
        assert_eq!(classify(&entry), classify(&entry));
    }

    #[test]
    fn test_registry_ecosystem_tokens() {
        let npm = Category::new(CategoryKind::Code, "JavaScript", "npm");
        assert_eq!(registry_ecosystem(&npm), Some("npm"));

        let actions = Category::new(CategoryKind::Workflow, "YAML", "GitHub Actions");
        assert_eq!(registry_ecosystem(&actions), None);
        assert_eq!(registry_ecosystem(&Category::unknown()), None);
    }
}
