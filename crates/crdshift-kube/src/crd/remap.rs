//! CRD API version remapping for backups
//!
//! A CRD read back from the cluster is always served as
//! `apiextensions.k8s.io/v1`, even when it was created as `v1beta1`. Restoring
//! such a CRD as v1 fails when its schema only satisfies the looser v1beta1
//! contract, so backups rewrite the `apiVersion` of those CRDs to v1beta1.
//!
//! A CRD is treated as originally v1beta1 when either:
//!
//! - its first version carries no `schema.openAPIV3Schema`, or
//! - it has a `NonStructuralSchema` status condition.
//!
//! The rewrite only ever demotes. A CRD that matches neither rule keeps
//! whatever `apiVersion` it was captured with.

use serde::Serialize;
use serde_json::Value;
use tracing::{Span, debug, debug_span, info};

use super::view::CrdView;
use crate::action::{BackupItemAction, ResourceIdentifier, ResourceSelector};
use crate::error::{KubeError, Result};

/// API version written to CRDs that need the looser schema contract
pub const LEGACY_CRD_API_VERSION: &str = "apiextensions.k8s.io/v1beta1";

/// Group resource the remapping applies to
pub const CRD_GROUP_RESOURCE: &str = "customresourcedefinition.apiextensions.k8s.io";

const ACTION_NAME: &str = "RemapCRDVersionAction";

/// Why a CRD is remapped to the legacy API version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RemapReason {
    /// The first version has no `schema.openAPIV3Schema`
    SchemaAbsent { version: String },
    /// A `NonStructuralSchema` condition is present
    NonStructuralSchema,
}

impl RemapReason {
    /// Decide whether a projected CRD must be remapped
    ///
    /// The schema rule is checked first, so it wins when both hold.
    pub fn for_view(view: &CrdView) -> Option<Self> {
        if view.schema_absent() {
            let version = view
                .versions
                .first()
                .map(|v| v.name.clone())
                .unwrap_or_default();
            return Some(Self::SchemaAbsent { version });
        }

        if view.has_non_structural_condition() {
            return Some(Self::NonStructuralSchema);
        }

        None
    }
}

impl std::fmt::Display for RemapReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaAbsent { version } if version.is_empty() => {
                write!(f, "first version has no openAPIV3Schema")
            }
            Self::SchemaAbsent { version } => {
                write!(f, "version '{}' has no openAPIV3Schema", version)
            }
            Self::NonStructuralSchema => write!(f, "NonStructuralSchema condition is set"),
        }
    }
}

/// Overwrite the top-level `apiVersion` of a document
pub fn set_api_version(item: &mut Value, api_version: &str) -> Result<()> {
    let found = crate::error::value_kind(item);
    let root = item.as_object_mut().ok_or(KubeError::Projection {
        field: "<root>".to_string(),
        expected: "a mapping",
        found,
    })?;

    root.insert(
        "apiVersion".to_string(),
        Value::String(api_version.to_string()),
    );
    Ok(())
}

/// Result of running a backup item action by value
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOutput {
    /// The item, possibly rewritten
    pub item: Value,
    /// Other resources the host should back up alongside the item
    pub additional_items: Vec<ResourceIdentifier>,
}

/// Backup item action that remaps CRDs to `apiextensions.k8s.io/v1beta1`
///
/// Events are emitted under the span given at construction, so the host
/// decides where the action's logs are attached.
#[derive(Debug, Clone)]
pub struct RemapCrdVersionAction {
    span: Span,
}

impl Default for RemapCrdVersionAction {
    fn default() -> Self {
        Self::new(Span::current())
    }
}

impl RemapCrdVersionAction {
    /// Create the action, logging under `span`
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    /// Selector for the resources this action handles
    pub fn applies_to(&self) -> Result<ResourceSelector> {
        Ok(ResourceSelector::including([CRD_GROUP_RESOURCE]))
    }

    /// Decide whether `item` would be remapped, without touching it
    pub fn plan(&self, item: &Value) -> Result<Option<RemapReason>> {
        let view = CrdView::from_value(item)?;
        Ok(RemapReason::for_view(&view))
    }

    /// Remap `item` in place
    ///
    /// Returns the additional items to back up, which is always empty. On a
    /// projection error `item` is left untouched.
    pub fn execute(&self, item: &mut Value) -> Result<Vec<ResourceIdentifier>> {
        let _entered = self.span.enter();
        info!("Executing {}", ACTION_NAME);

        let view = CrdView::from_value(item)?;

        let span = debug_span!("remap", plugin = ACTION_NAME, crd = %view.name);
        let _entered = span.enter();

        match RemapReason::for_view(&view) {
            Some(reason) => {
                debug!(%reason, "CRD is a candidate for v1beta1 backup");
                set_api_version(item, LEGACY_CRD_API_VERSION)?;
            }
            None => debug!("CRD keeps its captured apiVersion"),
        }

        Ok(Vec::new())
    }

    /// Remap an owned item and hand it back with its additional items
    pub fn remap(&self, mut item: Value) -> Result<ExecuteOutput> {
        let additional_items = self.execute(&mut item)?;
        Ok(ExecuteOutput {
            item,
            additional_items,
        })
    }
}

impl BackupItemAction for RemapCrdVersionAction {
    fn name(&self) -> &str {
        ACTION_NAME
    }

    fn applies_to(&self) -> Result<ResourceSelector> {
        RemapCrdVersionAction::applies_to(self)
    }

    fn execute(&self, item: &mut Value) -> Result<Vec<ResourceIdentifier>> {
        RemapCrdVersionAction::execute(self, item)
    }
}
