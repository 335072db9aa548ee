//! Read-only CRD projection
//!
//! Projects a captured CustomResourceDefinition document onto the handful of
//! fields the version remapping needs. The projection never mutates or clones
//! the document body; it only checks shapes and copies the names and
//! condition markers it exposes.
//!
//! JSON `null` is treated the same as a missing key. A key that is present
//! with the wrong shape is a [`KubeError::Projection`].

use serde_json::{Map, Value};

use crate::error::{KubeError, Result};

/// Condition type the API server sets on CRDs whose schema is not structural
pub const NON_STRUCTURAL_SCHEMA: &str = "NonStructuralSchema";

/// Typed view over a captured CRD document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrdView {
    /// `metadata.name` (empty when the document has none)
    pub name: String,
    /// Top-level `apiVersion` as captured
    pub api_version: Option<String>,
    /// `spec.versions`, in document order
    pub versions: Vec<CrdVersionView>,
    /// `status.conditions`, in document order
    pub conditions: Vec<CrdCondition>,
}

/// One entry of `spec.versions`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrdVersionView {
    /// Version name (e.g., "v1", "v1beta1")
    pub name: String,
    /// The entry's `schema` block, if any
    pub schema: Option<CrdValidationView>,
}

/// A version's `schema` block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrdValidationView {
    /// Whether `schema.openAPIV3Schema` is present
    pub has_openapi_v3_schema: bool,
}

/// One entry of `status.conditions`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrdCondition {
    pub type_: String,
    pub status: String,
}

impl CrdView {
    /// Project a document onto a `CrdView`
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = expect_object(value, "<root>")?;

        let api_version = optional_string(root, "apiVersion", "apiVersion")?;

        let name = match field(root, "metadata") {
            Some(metadata) => {
                let metadata = expect_object(metadata, "metadata")?;
                optional_string(metadata, "name", "metadata.name")?.unwrap_or_default()
            }
            None => String::new(),
        };

        let versions = match field(root, "spec") {
            Some(spec) => {
                let spec = expect_object(spec, "spec")?;
                Self::project_versions(spec)?
            }
            None => Vec::new(),
        };

        let conditions = match field(root, "status") {
            Some(status) => {
                let status = expect_object(status, "status")?;
                Self::project_conditions(status)?
            }
            None => Vec::new(),
        };

        Ok(Self {
            name,
            api_version,
            versions,
            conditions,
        })
    }

    fn project_versions(spec: &Map<String, Value>) -> Result<Vec<CrdVersionView>> {
        let Some(versions) = field(spec, "versions") else {
            return Ok(Vec::new());
        };
        let versions = expect_array(versions, "spec.versions")?;

        versions
            .iter()
            .enumerate()
            .map(|(i, version)| Self::project_version(i, version))
            .collect()
    }

    fn project_version(index: usize, version: &Value) -> Result<CrdVersionView> {
        let path = format!("spec.versions[{}]", index);
        let version = expect_object(version, &path)?;

        let name = optional_string(version, "name", &format!("{}.name", path))?.unwrap_or_default();

        let schema = match field(version, "schema") {
            Some(schema) => {
                let schema_path = format!("{}.schema", path);
                let schema = expect_object(schema, &schema_path)?;
                let has_openapi_v3_schema = match field(schema, "openAPIV3Schema") {
                    Some(openapi) => {
                        expect_object(openapi, &format!("{}.openAPIV3Schema", schema_path))?;
                        true
                    }
                    None => false,
                };
                Some(CrdValidationView {
                    has_openapi_v3_schema,
                })
            }
            None => None,
        };

        Ok(CrdVersionView { name, schema })
    }

    fn project_conditions(status: &Map<String, Value>) -> Result<Vec<CrdCondition>> {
        let Some(conditions) = field(status, "conditions") else {
            return Ok(Vec::new());
        };
        let conditions = expect_array(conditions, "status.conditions")?;

        conditions
            .iter()
            .enumerate()
            .map(|(i, condition)| {
                let path = format!("status.conditions[{}]", i);
                let condition = expect_object(condition, &path)?;
                Ok(CrdCondition {
                    type_: optional_string(condition, "type", &format!("{}.type", path))?
                        .unwrap_or_default(),
                    status: optional_string(condition, "status", &format!("{}.status", path))?
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    /// True when the first version carries no `schema.openAPIV3Schema`
    ///
    /// Only the first entry is consulted: all versions of one stored CRD come
    /// from the same API generation, and v1beta1 let versions share a single
    /// (possibly empty) schema while v1 requires one per version.
    pub fn schema_absent(&self) -> bool {
        self.versions
            .first()
            .is_some_and(|v| !v.schema.is_some_and(|s| s.has_openapi_v3_schema))
    }

    /// True when any condition has type `NonStructuralSchema`, whatever its status
    pub fn has_non_structural_condition(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| c.type_ == NON_STRUCTURAL_SCHEMA)
    }
}

/// Look up a key, treating `null` as missing
fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| KubeError::projection(path, "a mapping", value))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| KubeError::projection(path, "a list", value))
}

fn optional_string(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    field(map, key)
        .map(|v| {
            v.as_str()
                .map(String::from)
                .ok_or_else(|| KubeError::projection(path, "a string", v))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(yaml: &str) -> Result<CrdView> {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        CrdView::from_value(&value)
    }

    const STRUCTURAL_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: certificates.cert-manager.io
spec:
  group: cert-manager.io
  scope: Namespaced
  names:
    kind: Certificate
    plural: certificates
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
    - name: v1beta1
      served: true
      storage: false
status:
  conditions:
    - type: NamesAccepted
      status: "True"
    - type: Established
      status: "True"
"#;

    #[test]
    fn test_project_structural_crd() {
        let view = view(STRUCTURAL_CRD).unwrap();

        assert_eq!(view.name, "certificates.cert-manager.io");
        assert_eq!(view.api_version.as_deref(), Some("apiextensions.k8s.io/v1"));
        assert_eq!(view.versions.len(), 2);
        assert_eq!(view.versions[0].name, "v1");
        assert_eq!(
            view.versions[0].schema,
            Some(CrdValidationView {
                has_openapi_v3_schema: true
            })
        );
        assert_eq!(view.versions[1].schema, None);
        assert_eq!(view.conditions.len(), 2);
        assert_eq!(view.conditions[1].type_, "Established");
        assert_eq!(view.conditions[1].status, "True");
    }

    #[test]
    fn test_only_first_version_decides() {
        // Second entry has no schema but the first one does
        let view = view(STRUCTURAL_CRD).unwrap();
        assert!(!view.schema_absent());
        assert!(!view.has_non_structural_condition());
    }

    #[test]
    fn test_first_version_without_schema() {
        let view = view(
            r#"
apiVersion: apiextensions.k8s.io/v1
metadata:
  name: widgets.example.com
spec:
  versions:
    - name: v1
    - name: v2
      schema:
        openAPIV3Schema:
          type: object
"#,
        )
        .unwrap();

        assert_eq!(view.versions[0].schema, None);
        assert!(view.schema_absent());
    }

    #[test]
    fn test_schema_without_openapi() {
        let view = view(
            r#"
spec:
  versions:
    - name: v1
      schema: {}
"#,
        )
        .unwrap();

        assert_eq!(
            view.versions[0].schema,
            Some(CrdValidationView {
                has_openapi_v3_schema: false
            })
        );
        assert!(view.schema_absent());
    }

    #[test]
    fn test_empty_versions_is_not_schema_absent() {
        let view = view("spec:\n  versions: []\n").unwrap();
        assert!(view.versions.is_empty());
        assert!(!view.schema_absent());

        let view = CrdView::from_value(&serde_json::json!({})).unwrap();
        assert_eq!(view, CrdView::default());
        assert!(!view.schema_absent());
    }

    #[test]
    fn test_null_means_absent() {
        let view = view(
            r#"
metadata: null
spec:
  versions:
    - name: v1
      schema:
        openAPIV3Schema: null
status:
  conditions: null
"#,
        )
        .unwrap();

        assert_eq!(view.name, "");
        assert!(view.schema_absent());
        assert!(view.conditions.is_empty());
    }

    #[test]
    fn test_non_structural_condition_ignores_status() {
        let view = view(
            r#"
status:
  conditions:
    - type: Established
      status: "True"
    - type: NonStructuralSchema
      status: "False"
"#,
        )
        .unwrap();

        assert!(view.has_non_structural_condition());
    }

    #[test]
    fn test_versions_not_a_list() {
        let err = view("spec:\n  versions: not-a-list\n").unwrap_err();
        assert!(err.is_projection());
        assert!(err.to_string().contains("'spec.versions'"));
        assert!(err.to_string().contains("expected a list, found a string"));
    }

    #[test]
    fn test_condition_type_not_a_string() {
        let err = view(
            r#"
status:
  conditions:
    - type: Established
      status: "True"
    - type: 42
      status: "True"
"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("'status.conditions[1].type'"));
        assert!(err.to_string().contains("found a number"));
    }

    #[test]
    fn test_condition_not_a_mapping() {
        let err = view("status:\n  conditions:\n    - NonStructuralSchema\n").unwrap_err();
        assert!(err.to_string().contains("'status.conditions[0]'"));
    }

    #[test]
    fn test_openapi_schema_must_be_mapping() {
        let err = view(
            r#"
spec:
  versions:
    - name: v1
      schema:
        openAPIV3Schema: [object]
"#,
        )
        .unwrap_err();

        assert!(
            err.to_string()
                .contains("'spec.versions[0].schema.openAPIV3Schema'")
        );
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = CrdView::from_value(&serde_json::json!(["a", "b"])).unwrap_err();
        assert!(err.to_string().contains("'<root>'"));
    }

    #[test]
    fn test_metadata_name_not_a_string() {
        let err = view("metadata:\n  name: [a]\n").unwrap_err();
        assert!(err.to_string().contains("'metadata.name'"));
    }
}
