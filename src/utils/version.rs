//! Version normalization and comparison utilities.
//!
//! SBOM generators disagree about whether a package version is a concrete
//! release or a requirement expression. `normalize` reduces requirement-like
//! strings (`^1.2.3`, `>=1.0 <2.0`, `1.x || 2.x`) to a canonical form usable
//! as a map key, leaving opaque non-numeric versions untouched.

use semver::Version;
use std::cmp::Ordering;

/// Sentinel used when no version could be determined for a dependency.
pub const VERSION_UNKNOWN: &str = "version unknown";

/// Comparator tokens stripped from the front of a version requirement.
const COMPARATORS: [&str; 7] = [">=", "<=", ">", "<", "^", "~", "="];

/// Normalize a raw version string into a canonical map-key form.
///
/// Strips one leading comparator token, a trailing ` - upper` range suffix,
/// and ` || alternative` branches, keeping the first alternative. If the
/// stripped result contains no digit the input is returned unchanged: a
/// digit-free version is an opaque label (`latest`, `main`), not a range.
///
/// Idempotent: `normalize(normalize(v)) == normalize(v)`.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return raw.to_string();
    }

    // Strip comparators until none remain, so stacked requirement syntax
    // ("==1.0.0", ">=^1.2") reduces in one pass and stays idempotent.
    let mut candidate = trimmed;
    loop {
        let mut stripped = false;
        for comparator in COMPARATORS {
            if let Some(rest) = candidate.strip_prefix(comparator) {
                candidate = rest.trim_start();
                stripped = true;
                break;
            }
        }
        if !stripped {
            break;
        }
    }

    // "1.0.0 - 2.0.0" keeps the lower bound; "1.x || 2.x" keeps the first branch.
    if let Some((head, _)) = candidate.split_once(" - ") {
        candidate = head.trim_end();
    }
    if let Some((head, _)) = candidate.split_once("||") {
        candidate = head.trim_end();
    }

    if candidate.contains(|c: char| c.is_ascii_digit()) {
        candidate.to_string()
    } else {
        raw.to_string()
    }
}

/// Normalize an optional version; `None` and empty pass through unchanged.
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    raw.map(normalize)
}

/// Compare two version strings
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    // Try semver comparison first
    if let (Ok(ver_a), Ok(ver_b)) = (Version::parse(a), Version::parse(b)) {
        return ver_a.cmp(&ver_b);
    }

    // Fall back to string comparison
    a.cmp(b)
}
