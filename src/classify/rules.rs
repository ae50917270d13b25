//! Ordered name-pattern heuristics for packages without a usable PURL.
//!
//! Each rule is a named predicate paired with the category it implies. Rules
//! are evaluated in sequence and the first match wins, so order matters:
//! specific shapes (GitHub Actions, Maven coordinates) come before the
//! generic lowercase-token fallbacks. New heuristics are added by inserting
//! a rule, not by touching control flow.

use crate::model::{Category, CategoryKind};
use regex::Regex;
use std::sync::LazyLock;

/// One name-pattern rule.
pub struct NameRule {
    /// Short identifier used in trace logs
    pub name: &'static str,
    /// Predicate over the raw package name
    pub applies: fn(&str) -> bool,
    /// Category assigned on match
    pub category: Category,
}

static ACTION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    // owner/repo where either half carries an action-ish marker
    Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("static regex")
});

static MAVEN_COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    // reverse-domain group, colon, artifact
    Regex::new(r"^[a-zA-Z0-9_.-]+\.[a-zA-Z0-9_.-]+:[a-zA-Z0-9_.-]+$").expect("static regex")
});

static GO_MODULE: LazyLock<Regex> = LazyLock::new(|| {
    // host with a dot, then at least one path segment
    Regex::new(r"^[a-z0-9.-]+\.[a-z]{2,}/[A-Za-z0-9_./-]+$").expect("static regex")
});

static DOCKER_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    // repo:tag, optionally registry-prefixed
    Regex::new(r"^([a-z0-9.-]+/)?[a-z0-9_-]+:[A-Za-z0-9_.-]+$").expect("static regex")
});

static PYPI_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+([._-][a-z0-9]+)*$").expect("static regex"));

fn is_github_action(name: &str) -> bool {
    if !ACTION_NAME.is_match(name) {
        return false;
    }
    let lower = name.to_lowercase();
    lower.starts_with("actions/")
        || lower.starts_with("github/")
        || lower.contains("-action")
        || lower.contains("action-")
        || lower.contains("/setup-")
        || lower.contains("/checkout")
}

fn is_maven_coordinate(name: &str) -> bool {
    MAVEN_COORDINATE.is_match(name)
}

fn is_npm_scoped(name: &str) -> bool {
    name.starts_with('@') && name[1..].contains('/')
}

fn is_go_module(name: &str) -> bool {
    GO_MODULE.is_match(name)
}

fn is_docker_image(name: &str) -> bool {
    DOCKER_IMAGE.is_match(name) && !name.contains("::")
}

fn is_pythonic_token(name: &str) -> bool {
    let lower = name.to_lowercase();
    PYPI_TOKEN.is_match(&lower)
        && (lower.starts_with("python-")
            || lower.starts_with("py")
            || lower.ends_with("-python")
            || lower.ends_with("-py")
            || lower.contains('_'))
}

fn is_rubyish_token(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("ruby-") || lower.ends_with("-ruby") || lower.ends_with("-rb")
}

/// The ordered rule list.
pub fn name_rules() -> &'static [NameRule] {
    static RULES: LazyLock<Vec<NameRule>> = LazyLock::new(|| {
        vec![
            NameRule {
                name: "github-action",
                applies: is_github_action,
                category: Category::new(CategoryKind::Workflow, "YAML", "GitHub Actions"),
            },
            NameRule {
                name: "maven-coordinate",
                applies: is_maven_coordinate,
                category: Category::new(CategoryKind::Code, "Java", "Maven"),
            },
            NameRule {
                name: "npm-scoped",
                applies: is_npm_scoped,
                category: Category::new(CategoryKind::Code, "JavaScript", "npm"),
            },
            NameRule {
                name: "go-module",
                applies: is_go_module,
                category: Category::new(CategoryKind::Code, "Go", "Go"),
            },
            NameRule {
                name: "docker-image",
                applies: is_docker_image,
                category: Category::new(CategoryKind::Infrastructure, "Container", "Docker"),
            },
            NameRule {
                name: "pypi-token",
                applies: is_pythonic_token,
                category: Category::new(CategoryKind::Code, "Python", "PyPI"),
            },
            NameRule {
                name: "rubygems-token",
                applies: is_rubyish_token,
                category: Category::new(CategoryKind::Code, "Ruby", "RubyGems"),
            },
        ]
    });
    &RULES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_name;

    #[test]
    fn test_github_action_names() {
        assert_eq!(classify_name("actions/checkout").ecosystem, "GitHub Actions");
        assert_eq!(classify_name("actions/setup-node").ecosystem, "GitHub Actions");
        assert_eq!(
            classify_name("docker/build-push-action").ecosystem,
            "GitHub Actions"
        );
    }

    #[test]
    fn test_maven_coordinate() {
        assert_eq!(
            classify_name("org.apache.commons:commons-lang3").ecosystem,
            "Maven"
        );
    }

    #[test]
    fn test_npm_scoped() {
        assert_eq!(classify_name("@babel/core").ecosystem, "npm");
    }

    #[test]
    fn test_go_module() {
        assert_eq!(classify_name("github.com/spf13/cobra").ecosystem, "Go");
        assert_eq!(classify_name("golang.org/x/text").ecosystem, "Go");
    }

    #[test]
    fn test_docker_image() {
        assert_eq!(classify_name("nginx:1.25-alpine").ecosystem, "Docker");
        assert_eq!(classify_name("library/postgres:16").ecosystem, "Docker");
    }

    #[test]
    fn test_python_tokens() {
        assert_eq!(classify_name("python-dateutil").ecosystem, "PyPI");
        assert_eq!(classify_name("typing_extensions").ecosystem, "PyPI");
    }

    #[test]
    fn test_ruby_tokens() {
        assert_eq!(classify_name("nokogiri-ruby").ecosystem, "RubyGems");
    }

    #[test]
    fn test_rule_order_specific_before_generic() {
        // "docker/build-push-action" matches both the owner/repo and the
        // go-module shapes; the action rule must win by order.
        assert_eq!(
            classify_name("docker/build-push-action").kind,
            CategoryKind::Workflow
        );
    }

    #[test]
    fn test_unmatched_name() {
        assert_eq!(classify_name("WeirdThing!!"), Category::unknown());
    }
}
