//! CycloneDX document adapter.
//!
//! Maps `components[]` to the same package shape the SPDX adapter produces
//! and synthesizes an SPDX-like relationship list from the
//! `dependencies[].dependsOn[]` edge table. The root component from
//! `metadata.component` is preserved as its own package entry marked main.

use super::traits::{ParseError, SbomAdapter};
use crate::model::{
    DeclaredRelationship, NormalizedDocument, PackageEntry, ProjectInfo, RelationshipKind,
    SbomFormat,
};
use crate::utils::hash::synthetic_id;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Adapter for CycloneDX documents.
pub struct CycloneDxAdapter;

impl CycloneDxAdapter {
    /// Create a new CycloneDX adapter.
    pub fn new() -> Self {
        Self
    }

    fn convert_component(comp: &CdxComponent) -> PackageEntry {
        // bom-ref is the stable source identifier; fall back to
        // name@version which is the next-most-stable thing the format has.
        let source_id = comp.bom_ref.clone().unwrap_or_else(|| {
            format!(
                "{}@{}",
                comp.name.as_deref().unwrap_or(""),
                comp.version.as_deref().unwrap_or("")
            )
        });
        let mut entry = PackageEntry::new(synthetic_id(&source_id), comp.name.clone());
        entry.version = comp.version.clone();
        entry.license = comp.license_expression();
        if let Some(purl) = &comp.purl {
            entry.external_refs.push(purl.clone());
        }
        if let Some(cpe) = &comp.cpe {
            entry.external_refs.push(cpe.clone());
        }
        entry
    }
}

impl Default for CycloneDxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomAdapter for CycloneDxAdapter {
    fn format_name(&self) -> &'static str {
        "CycloneDX"
    }

    fn detect(&self, doc: &Value) -> Option<Option<String>> {
        let obj = doc.as_object()?;
        let has_marker = obj
            .get("bomFormat")
            .and_then(Value::as_str)
            .is_some_and(|f| f.eq_ignore_ascii_case("cyclonedx"))
            || (obj.contains_key("specVersion") && obj.contains_key("components"));
        if has_marker {
            let version = obj
                .get("specVersion")
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
        let bom: CycloneDxBom = serde_json::from_value(doc.clone())?;

        let mut packages = Vec::new();
        let mut ref_map: HashMap<String, String> = HashMap::new();

        // Root component first, marked main.
        let mut main_element_id = None;
        let mut project_name = None;
        if let Some(meta) = &bom.metadata {
            if let Some(root) = &meta.component {
                let mut entry = Self::convert_component(root);
                entry.is_main = true;
                main_element_id = Some(entry.id.clone());
                project_name.clone_from(&root.name);
                if let Some(bom_ref) = &root.bom_ref {
                    ref_map.insert(bom_ref.clone(), entry.id.clone());
                }
                packages.push(entry);
            }
        }

        for comp in bom.components.as_deref().unwrap_or_default() {
            let entry = Self::convert_component(comp);
            if let Some(bom_ref) = &comp.bom_ref {
                ref_map.insert(bom_ref.clone(), entry.id.clone());
            }
            packages.push(entry);
        }

        // Synthesize DEPENDS_ON edges from the dependency table by
        // ref-to-id lookup; unknown refs are skipped with a trace.
        let mut relationships = Vec::new();
        for dep in bom.dependencies.as_deref().unwrap_or_default() {
            let Some(source) = ref_map.get(&dep.ref_field) else {
                tracing::debug!(bom_ref = %dep.ref_field, "dependency ref not found in components");
                continue;
            };
            for target_ref in dep.depends_on.as_deref().unwrap_or_default() {
                if let Some(target) = ref_map.get(target_ref) {
                    relationships.push(DeclaredRelationship::new(
                        source.clone(),
                        RelationshipKind::DependsOn,
                        target.clone(),
                    ));
                }
            }
        }

        Ok(NormalizedDocument {
            packages,
            relationships,
            project: ProjectInfo {
                name: project_name.unwrap_or_else(|| fallback_name.to_string()),
                main_element_id,
                format: SbomFormat::CycloneDx,
                format_version: bom.spec_version,
            },
        })
    }
}

// ============================================================================
// CycloneDX document structures (subset the core needs)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom {
    spec_version: Option<String>,
    metadata: Option<CdxMetadata>,
    components: Option<Vec<CdxComponent>>,
    dependencies: Option<Vec<CdxDependency>>,
}

#[derive(Debug, Deserialize)]
struct CdxMetadata {
    component: Option<CdxComponent>,
}

#[derive(Debug, Deserialize)]
struct CdxComponent {
    #[serde(rename = "bom-ref")]
    bom_ref: Option<String>,
    name: Option<String>,
    version: Option<String>,
    purl: Option<String>,
    cpe: Option<String>,
    licenses: Option<Vec<CdxLicenseChoice>>,
}

impl CdxComponent {
    /// Flatten the license choice list into one expression string.
    fn license_expression(&self) -> Option<String> {
        let choices = self.licenses.as_deref()?;
        let parts: Vec<String> = choices
            .iter()
            .filter_map(|c| {
                c.expression
                    .clone()
                    .or_else(|| c.license.as_ref().and_then(|l| l.id.clone()))
                    .or_else(|| c.license.as_ref().and_then(|l| l.name.clone()))
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" AND "))
        }
    }
}

#[derive(Debug, Deserialize)]
struct CdxLicenseChoice {
    license: Option<CdxLicense>,
    expression: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdxLicense {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdxDependency {
    #[serde(rename = "ref")]
    ref_field: String,
    #[serde(rename = "dependsOn")]
    depends_on: Option<Vec<String>>,
}
