//! Display formatting for CLI output
//!
//! The `remap` run summary goes to stderr so stdout stays a clean document
//! stream. The `check` report is the command's output and goes to stdout.

use console::style;
use serde::Serialize;
use std::io::{self, Write};

use crate::host::RunSummary;
use crdshift_kube::RemapReason;

/// Format count with proper pluralization
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Print the one-line summary of a remap run to stderr
pub fn print_run_summary(summary: &RunSummary) {
    eprintln!(
        "{} {} remapped, {} unchanged, {} skipped",
        style("✓").green(),
        pluralize(summary.remapped, "CRD", "CRDs"),
        summary.unchanged,
        summary.skipped
    );
}

/// One CRD in a `check` report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRow {
    pub name: String,
    pub api_version: Option<String>,
    pub remap: bool,
    pub reason: Option<RemapReason>,
}

/// Write a `check` report as a human-readable list
pub fn write_check_report<W: Write>(writer: &mut W, rows: &[CheckRow]) -> io::Result<()> {
    if rows.is_empty() {
        writeln!(writer, "{} No CustomResourceDefinitions found", style("⚠").yellow())?;
        return Ok(());
    }

    for row in rows {
        let name = if row.name.is_empty() {
            "<unnamed>"
        } else {
            row.name.as_str()
        };
        match &row.reason {
            Some(reason) => writeln!(
                writer,
                "  {} {} -> {} ({})",
                style("↓").yellow(),
                style(name).cyan(),
                crdshift_kube::LEGACY_CRD_API_VERSION,
                reason
            )?,
            None => writeln!(
                writer,
                "  {} {} keeps {}",
                style("✓").green(),
                style(name).cyan(),
                row.api_version.as_deref().unwrap_or("<no apiVersion>")
            )?,
        }
    }

    let remapped = rows.iter().filter(|r| r.remap).count();
    writeln!(writer)?;
    writeln!(
        writer,
        "{} would be remapped, {} kept",
        pluralize(remapped, "CRD", "CRDs"),
        rows.len() - remapped
    )
}
