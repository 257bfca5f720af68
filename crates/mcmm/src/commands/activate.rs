//! `mcmm activate <profile>`

use super::{Context, Output};
use crate::cli::CliError;

/// Replace the installation's mods with the profile's cached jars.
pub fn execute_activate(ctx: &Context, profile: &str) -> Result<Output, CliError> {
    let report = ctx.engine().activate(profile)?;

    let text = format!(
        "Profile '{}' activated: removed {} jar(s) and installed {} jar(s) into {}",
        report.profile,
        report.removed.len(),
        report.installed.len(),
        report.mods_dir.display()
    );
    Output::new(text, &report)
}
