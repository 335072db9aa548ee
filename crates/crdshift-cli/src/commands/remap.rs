//! Remap command - run the backup item actions over captured manifests

use std::path::Path;

use tracing::info;

use crate::display;
use crate::documents::{self, Format};
use crate::error::Result;
use crate::host::{self, ItemOutcome};

pub fn run(input: &Path, output: Option<&Path>, format: Format) -> Result<()> {
    let mut manifests = documents::read_path(input)?;
    info!(documents = manifests.items.len(), input = %input.display(), "loaded manifests");

    let actions = host::registered_actions();
    let (outcomes, summary) = host::run_actions(&mut manifests.items, &actions)?;

    for (i, outcome) in outcomes.iter().enumerate() {
        if let ItemOutcome::Remapped { from, to } = outcome {
            info!(
                document = i + 1,
                from = from.as_deref().unwrap_or("<none>"),
                to = %to,
                "remapped apiVersion"
            );
        }
    }

    let rendered = documents::render(&manifests, format)?;
    documents::write(&rendered, output)?;

    display::print_run_summary(&summary);
    Ok(())
}
