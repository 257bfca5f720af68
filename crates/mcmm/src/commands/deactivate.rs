//! `mcmm deactivate [minecraft_folder]`

use std::path::Path;

use mcmm_core::sync::MODS_DIR;
use serde::Serialize;

use super::{Context, Output};
use crate::cli::CliError;

#[derive(Debug, Serialize)]
struct DeactivateOutput<'a> {
    mods_dir: &'a Path,
    removed: usize,
}

/// Remove every jar from the given (or default) installation's mods folder.
pub fn execute_deactivate(
    ctx: &Context,
    minecraft_folder: Option<&Path>,
) -> Result<Output, CliError> {
    let removed = ctx.engine().deactivate(minecraft_folder)?;
    let mods_dir = minecraft_folder
        .unwrap_or(&ctx.settings.minecraft_dir)
        .join(MODS_DIR);

    Output::new(
        format!("Removed {removed} jar(s) from {}", mods_dir.display()),
        &DeactivateOutput {
            mods_dir: &mods_dir,
            removed,
        },
    )
}
