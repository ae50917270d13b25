//! Built-in SPDX-based license classifier.
//!
//! A deliberately small default: copyleft terms raise the risk label,
//! OSI/FSF-approved terms classify as permissive, everything else is
//! flagged for review. Richer policy belongs in an external classifier
//! implementation.

use super::traits::LicenseClassifier;
use crate::model::LicenseAssessment;

/// Classifier backed by the SPDX license list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxLicenseClassifier;

impl LicenseClassifier for SpdxLicenseClassifier {
    fn classify(&self, license: &str) -> LicenseAssessment {
        let Ok(expression) = spdx::Expression::parse_mode(license, spdx::ParseMode::LAX) else {
            return LicenseAssessment {
                category: "unrecognized".to_string(),
                risk: "review".to_string(),
            };
        };

        let mut has_copyleft = false;
        let mut all_approved = true;
        for req in expression.requirements() {
            if let spdx::LicenseItem::Spdx { id, .. } = req.req.license {
                if id.is_copyleft() {
                    has_copyleft = true;
                }
                if !(id.is_osi_approved() || id.is_fsf_free_libre()) {
                    all_approved = false;
                }
            } else {
                all_approved = false;
            }
        }

        if has_copyleft {
            LicenseAssessment {
                category: "copyleft".to_string(),
                risk: "elevated".to_string(),
            }
        } else if all_approved {
            LicenseAssessment {
                category: "permissive".to_string(),
                risk: "low".to_string(),
            }
        } else {
            LicenseAssessment {
                category: "other".to_string(),
                risk: "review".to_string(),
            }
        }
    }
}
