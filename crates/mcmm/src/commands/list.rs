//! `mcmm list`

use serde::Serialize;

use super::{Context, Output};
use crate::cli::CliError;

#[derive(Debug, Serialize)]
struct ListOutput {
    profiles: Vec<String>,
}

/// Names of all stored profiles, one per line.
pub fn execute_list(ctx: &Context) -> Result<Output, CliError> {
    let profiles = ctx.store.list()?;
    Output::new(profiles.join("\n"), &ListOutput { profiles })
}
