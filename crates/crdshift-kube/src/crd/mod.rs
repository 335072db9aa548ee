//! CRD handling for backups
//!
//! - **Projection** (`view`): typed, read-only view over a captured CRD document
//! - **Remapping** (`remap`): decide whether a CRD must be restored as
//!   `apiextensions.k8s.io/v1beta1` and rewrite its `apiVersion`
//!
//! ```text
//!   captured CRD ──► CrdView::from_value ──► RemapReason::for_view
//!        ▲                                         │
//!        └──────── set_api_version ◄───── Some(reason)
//! ```
//!
//! # Example
//!
//! ```
//! use crdshift_kube::crd::{LEGACY_CRD_API_VERSION, RemapCrdVersionAction};
//! use serde_json::json;
//!
//! let action = RemapCrdVersionAction::default();
//! let mut item = json!({
//!     "apiVersion": "apiextensions.k8s.io/v1",
//!     "spec": {"versions": [{"name": "v1"}]}
//! });
//!
//! let additional = action.execute(&mut item)?;
//! assert!(additional.is_empty());
//! assert_eq!(item["apiVersion"], LEGACY_CRD_API_VERSION);
//! # Ok::<(), crdshift_kube::KubeError>(())
//! ```

mod remap;
mod view;

pub use remap::{
    CRD_GROUP_RESOURCE, ExecuteOutput, LEGACY_CRD_API_VERSION, RemapCrdVersionAction,
    RemapReason, set_api_version,
};
pub use view::{CrdCondition, CrdValidationView, CrdVersionView, CrdView, NON_STRUCTURAL_SCHEMA};
