//! Backup item actions and the selectors that route items to them
//!
//! A backup host walks every captured resource, asks each registered action
//! which resources it [applies to](BackupItemAction::applies_to), and runs the
//! matching actions on the item before persisting it.

use kube::core::GroupVersion;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{KubeError, Result};

/// An action run on captured items during a backup
pub trait BackupItemAction: Send + Sync {
    /// Name used in logs and reports
    fn name(&self) -> &str;

    /// Resources this action should be invoked for
    fn applies_to(&self) -> Result<ResourceSelector>;

    /// Inspect and possibly rewrite `item` in place
    ///
    /// Returns further resources the host should back up with the item.
    fn execute(&self, item: &mut Value) -> Result<Vec<ResourceIdentifier>>;
}

/// Identity of a resource an action asks the host to include
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceIdentifier {
    /// `resource.group` (e.g., "persistentvolume" or "deployment.apps")
    pub group_resource: String,
    /// Namespace, empty for cluster-scoped resources
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
}

impl ResourceIdentifier {
    pub fn new(
        group_resource: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group_resource: group_resource.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Derive the `resource.group` identifier of a manifest from its kind and apiVersion
    ///
    /// Resources in the core group (`apiVersion: v1`) have no group suffix.
    pub fn group_resource_of(manifest: &Value) -> Result<String> {
        let kind = manifest
            .get("kind")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| KubeError::InvalidManifest("missing 'kind' field".to_string()))?;

        let api_version = manifest
            .get("apiVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| KubeError::InvalidManifest("missing 'apiVersion' field".to_string()))?;

        let gv: GroupVersion = api_version.parse().map_err(|e| {
            KubeError::InvalidManifest(format!("invalid apiVersion '{}': {}", api_version, e))
        })?;

        let resource = kind.to_lowercase();
        Ok(if gv.group.is_empty() {
            resource
        } else {
            format!("{}.{}", resource, gv.group)
        })
    }
}

impl std::fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}/{}", self.group_resource, self.name)
        } else {
            write!(f, "{}/{}/{}", self.group_resource, self.namespace, self.name)
        }
    }
}

/// Which resources an action applies to
///
/// Empty `included_*` lists match everything, `"*"` is a wildcard, and
/// exclusions win over inclusions. Resource names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceSelector {
    pub included_resources: Vec<String>,
    pub excluded_resources: Vec<String>,
    pub included_namespaces: Vec<String>,
    pub excluded_namespaces: Vec<String>,
}

impl ResourceSelector {
    /// Selector including exactly the given group resources
    pub fn including<I, S>(resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            included_resources: resources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Exclude a namespace
    pub fn excluding_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.excluded_namespaces.push(namespace.into());
        self
    }

    /// Check whether a resource, in `namespace` if namespaced, is selected
    pub fn matches(&self, group_resource: &str, namespace: Option<&str>) -> bool {
        let resource_ok = included(&self.included_resources, group_resource, true)
            && !listed(&self.excluded_resources, group_resource, true);

        let namespace_ok = match namespace {
            Some(ns) => {
                included(&self.included_namespaces, ns, false)
                    && !listed(&self.excluded_namespaces, ns, false)
            }
            None => true,
        };

        resource_ok && namespace_ok
    }
}

fn included(list: &[String], candidate: &str, ignore_case: bool) -> bool {
    list.is_empty() || listed(list, candidate, ignore_case)
}

fn listed(list: &[String], candidate: &str, ignore_case: bool) -> bool {
    list.iter().any(|entry| {
        entry == "*"
            || if ignore_case {
                entry.eq_ignore_ascii_case(candidate)
            } else {
                entry == candidate
            }
    })
}
