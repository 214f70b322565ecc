use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::Path;
use tracing::info;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Csv,
    Markdown,
}

/// Export the session as JSON, a CSV summary or a Markdown report
pub fn export_report(state: &AppState, format: ReportFormat, out: Option<&Path>) -> Result<()> {
    let session = state.open_session()?;

    let body = match format {
        ReportFormat::Json => session.export_json()?,
        ReportFormat::Csv => session.summary_csv()?,
        ReportFormat::Markdown => session.markdown_report(),
    };

    match out {
        Some(path) => {
            std::fs::write(path, &body)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!("Wrote {:?} report to {}", format, path.display());
        }
        None => print!("{}", body),
    }
    Ok(())
}
