// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! mcmm - Minecraft mod manager
//!
//! Profiles name a Minecraft version and a list of mod entries. `download`
//! asks each entry's mod provider for a jar and caches it per profile;
//! `activate` swaps the cached jars into a Minecraft installation.
//!
//! Providers come from [`ProviderSource`]s. The four built-in sources are
//! added by [`McmmBuilder::with_defaults`]; a custom binary can add its own:
//!
//! ```ignore
//! use mcmm::Mcmm;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cli = mcmm::cli::parse();
//!     let code = Mcmm::builder()
//!         .with_defaults()
//!         .with_source(my_provider::source())
//!         .build()
//!         .run(cli)
//!         .await;
//!     std::process::exit(code);
//! }
//! ```

// CLI crate: printing results and errors is its job
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod builder;
/// CLI argument parsing and exit codes.
pub mod cli;
pub mod commands;
pub mod prompt;
pub mod tracing;

pub use builder::McmmBuilder;
pub use mcmm_core::providers::ProviderSource;

use ::tracing::Instrument;
use mcmm_core::Settings;

use crate::cli::{Cli, CliError, Commands, exit_code_for, render_error};
use crate::commands::{Context, Output};
use crate::prompt::StdinPrompt;

/// The main mcmm application.
///
/// Use [`Mcmm::builder()`] to pick provider sources, or
/// [`Mcmm::with_defaults()`] for the built-in ones.
#[derive(Debug)]
pub struct Mcmm {
    sources: Vec<ProviderSource>,
}

impl Mcmm {
    /// Create a new builder for configuring mcmm.
    #[must_use]
    pub fn builder() -> McmmBuilder {
        McmmBuilder::new()
    }

    /// Create mcmm with the built-in provider sources.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::builder().with_defaults().build()
    }

    /// Provider sources this instance discovers from.
    #[must_use]
    pub fn sources(&self) -> &[ProviderSource] {
        &self.sources
    }

    /// Load settings, discover providers and run `cli`'s command.
    ///
    /// Results go to stdout, errors to stderr (as JSON envelopes on stdout
    /// with `--json`). Returns the process exit code.
    pub async fn run(self, cli: Cli) -> i32 {
        let json_mode = cli.json;
        let span = crate::command_span!(cli.command.name());

        let result = execute(self.sources, cli.command, json_mode)
            .instrument(span)
            .await;

        match result {
            Ok(output) => output.emit(json_mode),
            Err(err) => {
                render_error(&err, json_mode);
                exit_code_for(&err)
            }
        }
    }
}

async fn execute(
    sources: Vec<ProviderSource>,
    command: Commands,
    json_mode: bool,
) -> Result<Output, CliError> {
    let settings = Settings::load()?;
    let ctx = Context::new(settings, sources);
    dispatch(&ctx, command, json_mode).await
}

async fn dispatch(ctx: &Context, command: Commands, json_mode: bool) -> Result<Output, CliError> {
    match command {
        Commands::Activate { profile } => commands::activate::execute_activate(ctx, &profile),
        Commands::Deactivate { minecraft_folder } => {
            commands::deactivate::execute_deactivate(ctx, minecraft_folder.as_deref())
        }
        Commands::Download {
            profile,
            mc_version,
        } => {
            commands::download::execute_download(ctx, &profile, mc_version.as_deref()).await
        }
        Commands::Generate { profile } => {
            // Keep stdout clean for the JSON envelope.
            let mut prompt = if json_mode {
                StdinPrompt::on_stderr()
            } else {
                StdinPrompt::new()
            };
            commands::generate::execute_generate(ctx, &profile, &mut prompt)
        }
        Commands::List => commands::list::execute_list(ctx),
        Commands::Providers => commands::providers::execute_providers(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_defaults_has_builtin_sources() {
        assert_eq!(Mcmm::with_defaults().sources().len(), 4);
    }

    #[test]
    fn test_builder_without_sources() {
        assert!(Mcmm::builder().build().sources().is_empty());
    }
}
