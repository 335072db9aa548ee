//! Offline backup host
//!
//! Routes each captured document to the registered backup item actions whose
//! selectors match it, the same way a backup run would before persisting the
//! item.

use crdshift_kube::{BackupItemAction, RemapCrdVersionAction, ResourceIdentifier};
use serde_json::Value;
use tracing::{Span, debug, warn};

use crate::error::{CliError, Result};

/// Per-document outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// An action changed the document's apiVersion
    Remapped { from: Option<String>, to: String },
    /// At least one action ran and left apiVersion alone
    Unchanged,
    /// No action applied to the document
    Skipped,
}

/// Counts over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub remapped: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Remapped { .. } => self.remapped += 1,
            ItemOutcome::Unchanged => self.unchanged += 1,
            ItemOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Actions registered with the offline host
pub fn registered_actions() -> Vec<Box<dyn BackupItemAction>> {
    vec![Box::new(RemapCrdVersionAction::new(Span::current()))]
}

/// Group resource and namespace of a document, or `None` if it can't be identified
fn identify(document: &Value) -> Option<(String, Option<&str>)> {
    let group_resource = ResourceIdentifier::group_resource_of(document)
        .inspect_err(|e| warn!("skipping document: {}", e))
        .ok()?;
    let namespace = document
        .pointer("/metadata/namespace")
        .and_then(Value::as_str)
        .filter(|ns| !ns.is_empty());
    Some((group_resource, namespace))
}

/// Run every matching action over `documents` in place
///
/// Stops at the first action error; documents before it keep their changes.
pub fn run_actions(
    documents: &mut [Value],
    actions: &[Box<dyn BackupItemAction>],
) -> Result<(Vec<ItemOutcome>, RunSummary)> {
    let mut outcomes = Vec::with_capacity(documents.len());
    let mut summary = RunSummary::default();

    for (i, document) in documents.iter_mut().enumerate() {
        let index = i + 1;
        let Some((group_resource, namespace)) = identify(document) else {
            outcomes.push(ItemOutcome::Skipped);
            summary.record(&ItemOutcome::Skipped);
            continue;
        };
        let namespace = namespace.map(String::from);

        let before = document.get("apiVersion").cloned();
        let mut ran = false;

        for action in actions {
            let selector = action
                .applies_to()
                .map_err(|e| CliError::internal(format!("{}: {}", action.name(), e)))?;
            if !selector.matches(&group_resource, namespace.as_deref()) {
                continue;
            }

            ran = true;
            let additional = action
                .execute(document)
                .map_err(|e| CliError::for_document(index, e))?;
            for extra in additional {
                debug!(action = action.name(), %extra, "additional item requested");
            }
        }

        let outcome = if !ran {
            ItemOutcome::Skipped
        } else {
            match document.get("apiVersion") {
                after if after == before.as_ref() => ItemOutcome::Unchanged,
                after => ItemOutcome::Remapped {
                    from: before.as_ref().and_then(Value::as_str).map(String::from),
                    to: after.and_then(Value::as_str).unwrap_or_default().to_string(),
                },
            }
        };

        summary.record(&outcome);
        outcomes.push(outcome);
    }

    Ok((outcomes, summary))
}
