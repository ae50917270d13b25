//! SPDX document adapter.
//!
//! Supports SPDX 2.2/2.3 JSON documents as well as bare arrays of
//! SPDX-style package elements (a shape some generators emit for partial
//! exports).

use super::traits::{ParseError, SbomAdapter};
use crate::model::{
    DeclaredRelationship, NormalizedDocument, PackageEntry, ProjectInfo, RelationshipKind,
    SbomFormat,
};
use crate::utils::hash::synthetic_id;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Adapter for SPDX documents.
pub struct SpdxAdapter;

impl SpdxAdapter {
    /// Create a new SPDX adapter.
    pub fn new() -> Self {
        Self
    }

    fn parse_document(doc: &Value) -> Result<SpdxDocument, ParseError> {
        // A bare array of elements is treated as a package list without
        // relationships.
        if doc.is_array() {
            let packages: Vec<SpdxPackage> = serde_json::from_value(doc.clone())?;
            return Ok(SpdxDocument {
                spdx_version: None,
                spdx_id: "SPDXRef-DOCUMENT".to_string(),
                name: None,
                document_describes: None,
                packages: Some(packages),
                relationships: None,
            });
        }
        Ok(serde_json::from_value(doc.clone())?)
    }

    fn convert_package(pkg: &SpdxPackage) -> PackageEntry {
        let mut entry = PackageEntry::new(synthetic_id(&pkg.spdx_id), pkg.name.clone());
        entry.version = pkg.version_info.clone();
        entry.license = pkg
            .license_declared
            .clone()
            .or_else(|| pkg.license_concluded.clone())
            .filter(|l| l != "NOASSERTION" && l != "NONE");
        if let Some(refs) = &pkg.external_refs {
            entry.external_refs = refs.iter().map(|r| r.reference_locator.clone()).collect();
        }
        entry
    }
}

impl Default for SpdxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomAdapter for SpdxAdapter {
    fn format_name(&self) -> &'static str {
        "SPDX"
    }

    fn detect(&self, doc: &Value) -> Option<Option<String>> {
        let obj = doc.as_object()?;
        if obj.contains_key("spdxVersion") || obj.contains_key("SPDXID") {
            let version = obj
                .get("spdxVersion")
                .and_then(Value::as_str)
                .map(str::to_string);
            return Some(version);
        }
        None
    }

    fn convert(
        &self,
        doc: &Value,
        fallback_name: &str,
    ) -> Result<NormalizedDocument, ParseError> {
        let spdx = Self::parse_document(doc)?;

        let mut packages = Vec::new();
        let mut id_map: HashMap<&str, String> = HashMap::new();
        for pkg in spdx.packages.as_deref().unwrap_or_default() {
            let entry = Self::convert_package(pkg);
            id_map.insert(pkg.spdx_id.as_str(), entry.id.clone());
            packages.push(entry);
        }

        // Main element: DESCRIBES from the document element wins, then the
        // documentDescribes shortcut field.
        let mut main_source_id: Option<&str> = None;
        for rel in spdx.relationships.as_deref().unwrap_or_default() {
            if rel.relationship_type == "DESCRIBES"
                && (rel.spdx_element_id == spdx.spdx_id
                    || rel.spdx_element_id == "SPDXRef-DOCUMENT")
            {
                main_source_id = Some(rel.related_spdx_element.as_str());
                break;
            }
        }
        if main_source_id.is_none() {
            main_source_id = spdx
                .document_describes
                .as_deref()
                .and_then(|d| d.first())
                .map(String::as_str);
        }
        let main_element_id = main_source_id.and_then(|sid| id_map.get(sid).cloned());
        if let Some(main_id) = &main_element_id {
            for entry in &mut packages {
                if &entry.id == main_id {
                    entry.is_main = true;
                }
            }
        }

        // Keep edges whose endpoints both resolve to known packages;
        // document-level edges were consumed above.
        let mut relationships = Vec::new();
        for rel in spdx.relationships.as_deref().unwrap_or_default() {
            let (Some(source), Some(target)) = (
                id_map.get(rel.spdx_element_id.as_str()),
                id_map.get(rel.related_spdx_element.as_str()),
            ) else {
                continue;
            };
            relationships.push(DeclaredRelationship::new(
                source.clone(),
                RelationshipKind::from_spdx(&rel.relationship_type),
                target.clone(),
            ));
        }

        let name = spdx
            .name
            .clone()
            .unwrap_or_else(|| fallback_name.to_string());

        Ok(NormalizedDocument {
            packages,
            relationships,
            project: ProjectInfo {
                name,
                main_element_id,
                format: SbomFormat::Spdx,
                format_version: spdx
                    .spdx_version
                    .as_deref()
                    .map(|v| v.strip_prefix("SPDX-").unwrap_or(v).to_string()),
            },
        })
    }
}

// ============================================================================
// SPDX document structures (subset the core needs)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument {
    spdx_version: Option<String>,
    #[serde(rename = "SPDXID", default = "default_document_id")]
    spdx_id: String,
    name: Option<String>,
    document_describes: Option<Vec<String>>,
    packages: Option<Vec<SpdxPackage>>,
    relationships: Option<Vec<SpdxRelationship>>,
}

fn default_document_id() -> String {
    "SPDXRef-DOCUMENT".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    name: Option<String>,
    version_info: Option<String>,
    license_declared: Option<String>,
    license_concluded: Option<String>,
    external_refs: Option<Vec<SpdxExternalRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef {
    reference_locator: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    spdx_element_id: String,
    relationship_type: String,
    related_spdx_element: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_doc() -> Value {
        json!({
            "spdxVersion": "SPDX-2.3",
            "SPDXID": "SPDXRef-DOCUMENT",
            "name": "hello-world",
            "packages": [
                {"SPDXID": "SPDXRef-Package-main", "name": "hello-world", "versionInfo": "1.0.0"},
                {"SPDXID": "SPDXRef-Package-lodash", "name": "lodash", "versionInfo": "4.17.21",
                 "licenseDeclared": "MIT",
                 "externalRefs": [{"referenceCategory": "PACKAGE-MANAGER",
                                   "referenceType": "purl",
                                   "referenceLocator": "pkg:npm/lodash@4.17.21"}]},
                {"SPDXID": "SPDXRef-Package-leftpad", "name": "left-pad", "versionInfo": "1.3.0"}
            ],
            "relationships": [
                {"spdxElementId": "SPDXRef-DOCUMENT", "relationshipType": "DESCRIBES",
                 "relatedSpdxElement": "SPDXRef-Package-main"},
                {"spdxElementId": "SPDXRef-Package-main", "relationshipType": "DEPENDS_ON",
                 "relatedSpdxElement": "SPDXRef-Package-lodash"}
            ]
        })
    }

    #[test]
    fn test_convert_marks_main_and_edges() {
        let doc = SpdxAdapter::new().convert(&minimal_doc(), "fallback").unwrap();

        assert_eq!(doc.packages.len(), 3);
        assert_eq!(doc.main_package().unwrap().name.as_deref(), Some("hello-world"));
        assert_eq!(doc.relationships.len(), 1);
        assert_eq!(doc.direct_target_ids().len(), 1);
        assert_eq!(doc.project.format_version.as_deref(), Some("2.3"));
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let adapter = SpdxAdapter::new();
        let a = adapter.convert(&minimal_doc(), "x").unwrap();
        let b = adapter.convert(&minimal_doc(), "x").unwrap();
        let ids_a: Vec<_> = a.packages.iter().map(|p| p.id.clone()).collect();
        let ids_b: Vec<_> = b.packages.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_bare_array_of_elements() {
        let doc = json!([
            {"SPDXID": "SPDXRef-Package-a", "name": "a", "versionInfo": "1.0"},
            {"SPDXID": "SPDXRef-Package-b", "name": "b"}
        ]);
        let converted = SpdxAdapter::new().convert(&doc, "repo").unwrap();
        assert_eq!(converted.packages.len(), 2);
        assert_eq!(converted.project.name, "repo");
        assert!(converted.main_package().is_none());
    }

    #[test]
    fn test_noassertion_license_dropped() {
        let doc = json!({
            "spdxVersion": "SPDX-2.3",
            "SPDXID": "SPDXRef-DOCUMENT",
            "packages": [{"SPDXID": "p", "name": "x", "licenseDeclared": "NOASSERTION"}]
        });
        let converted = SpdxAdapter::new().convert(&doc, "repo").unwrap();
        assert!(converted.packages[0].license.is_none());
    }
}
