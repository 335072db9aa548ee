//! Crdshift Kube - CRD version remapping for cluster backups
//!
//! This crate provides:
//! - **CRD Projection**: A typed, read-only view over captured CRD documents
//! - **Version Remapping**: Demote CRDs that only satisfy the v1beta1 schema
//!   contract so they restore cleanly
//! - **Backup Item Actions**: The trait and resource selectors a backup host
//!   uses to route captured items to actions

pub mod action;
pub mod crd;
pub mod error;

pub use action::{BackupItemAction, ResourceIdentifier, ResourceSelector};
pub use crd::{
    CRD_GROUP_RESOURCE, CrdView, ExecuteOutput, LEGACY_CRD_API_VERSION, NON_STRUCTURAL_SCHEMA,
    RemapCrdVersionAction, RemapReason,
};
pub use error::{KubeError, Result};
