//! `mcmm download <profile> [--mc-version <v>]`

use std::fmt::Write;
use std::path::PathBuf;

use mcmm_core::DownloadReport;
use mcmm_core::providers::Metadata;
use serde::Serialize;

use super::{Context, Output};
use crate::cli::CliError;

#[derive(Debug, Serialize)]
struct FaultOutput {
    index: usize,
    provider: String,
    metadata: Metadata,
    error: String,
}

#[derive(Debug, Serialize)]
struct DownloadOutput {
    profile: String,
    minecraft_version: String,
    cleared: usize,
    artifacts: Vec<PathBuf>,
    faults: Vec<FaultOutput>,
}

impl From<DownloadReport> for DownloadOutput {
    fn from(report: DownloadReport) -> Self {
        Self {
            faults: report
                .faults
                .into_iter()
                .map(|fault| FaultOutput {
                    index: fault.index,
                    error: fault.reason.to_string(),
                    provider: fault.entry.provider,
                    metadata: fault.entry.metadata,
                })
                .collect(),
            profile: report.profile,
            minecraft_version: report.minecraft_version,
            cleared: report.cleared,
            artifacts: report.artifacts,
        }
    }
}

/// Refresh the profile's jar cache. Entry failures are listed and turn the
/// exit code into [`crate::cli::EXIT_PARTIAL`]; the other entries are kept.
pub async fn execute_download(
    ctx: &Context,
    profile: &str,
    minecraft_version: Option<&str>,
) -> Result<Output, CliError> {
    let report = ctx
        .engine()
        .download(profile, &ctx.runner, minecraft_version)
        .await?;
    let output = DownloadOutput::from(report);

    let mut text = String::new();
    for fault in &output.faults {
        let _ = writeln!(
            text,
            "Error: {} on profile entry #{} ({}): {}",
            fault.error,
            fault.index + 1,
            fault.provider,
            serde_json::Value::Object(fault.metadata.clone())
        );
    }
    let total = output.artifacts.len() + output.faults.len();
    let _ = write!(
        text,
        "Downloaded {} of {total} mod(s) for profile '{}' (Minecraft {}).",
        output.artifacts.len(),
        output.profile,
        output.minecraft_version
    );
    if output.faults.is_empty() {
        let _ = write!(
            text,
            " Use 'mcmm activate {}' to install them.",
            output.profile
        );
    }

    let failed = output.faults.len();
    let result = Output::new(text, &output)?;
    if failed == 0 {
        Ok(result)
    } else {
        Ok(result.with_failure(CliError::partial_with_help(
            format!("{failed} of {total} profile entries failed to download"),
            "Fix or remove the failing entries, then run download again",
        )))
    }
}
