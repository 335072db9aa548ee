//! Check command - report which CRDs a backup would remap, without rewriting them

use std::path::Path;

use crdshift_kube::{RemapCrdVersionAction, ResourceIdentifier};
use serde_json::Value;
use tracing::warn;

use crate::display::{self, CheckRow};
use crate::documents;
use crate::error::{CliError, Result};

pub fn run(input: &Path, json_output: bool) -> Result<()> {
    let manifests = documents::read_path(input)?;
    let action = RemapCrdVersionAction::default();
    let selector = action
        .applies_to()
        .map_err(|e| CliError::internal(e.to_string()))?;

    let mut rows = Vec::new();
    for (i, doc) in manifests.items.iter().enumerate() {
        let Ok(group_resource) = ResourceIdentifier::group_resource_of(doc)
            .inspect_err(|e| warn!(document = i + 1, "skipping document: {}", e))
        else {
            continue;
        };
        if !selector.matches(&group_resource, None) {
            continue;
        }

        let reason = action
            .plan(doc)
            .map_err(|e| CliError::for_document(i + 1, e))?;

        rows.push(CheckRow {
            name: doc
                .pointer("/metadata/name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            api_version: doc.get("apiVersion").and_then(Value::as_str).map(String::from),
            remap: reason.is_some(),
            reason,
        });
    }

    if json_output {
        let json = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{}", json);
    } else {
        display::write_check_report(&mut std::io::stdout().lock(), &rows)?;
    }

    Ok(())
}
