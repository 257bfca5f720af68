use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tracing::LogLevel;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Configuration, profile or I/O error exit code
pub const EXIT_ERROR: i32 = 1;
/// At least one profile entry failed to download
pub const EXIT_PARTIAL: i32 = 2;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Configuration or profile error (exit code 1)
    #[error("{message}")]
    #[diagnostic(code(mcmm::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Some profile entries failed while the rest succeeded (exit code 2)
    #[error("{message}")]
    #[diagnostic(code(mcmm::cli::partial))]
    Partial {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 1)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(mcmm::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new partial-failure error with help text
    #[must_use]
    pub fn partial_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Partial {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to an existing error, returning a new error with the help text set.
    #[must_use]
    pub fn with_help(self, help_text: impl Into<String>) -> Self {
        let help = Some(help_text.into());
        match self {
            Self::Config { message, .. } => Self::Config { message, help },
            Self::Partial { message, .. } => Self::Partial { message, help },
            Self::Other { message, .. } => Self::Other { message, help },
        }
    }

    /// Short machine-readable category used in JSON envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Partial { .. } => "partial",
            Self::Other { .. } => "other",
        }
    }
}

/// Convert `mcmm_core::Error` to the matching `CliError` variant, keeping
/// the diagnostic's help text.
impl From<mcmm_core::Error> for CliError {
    fn from(err: mcmm_core::Error) -> Self {
        let help = err.help().map(|h| h.to_string());
        let converted = match &err {
            mcmm_core::Error::Configuration(message) => Self::config(message.clone()),
            mcmm_core::Error::ProfileNotFound { .. }
            | mcmm_core::Error::MalformedProfile { .. }
            | mcmm_core::Error::InvalidProfileName(_)
            | mcmm_core::Error::InstallationNotFound { .. } => Self::config(err.to_string()),
            mcmm_core::Error::Io {
                operation,
                path,
                source,
            } => Self::other(format!(
                "I/O {operation} failed on {}: {source}",
                path.display()
            )),
        };
        match help {
            Some(help) => converted.with_help(help),
            None => converted,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::other("Input ended before the command finished")
        } else {
            Self::other(format!("Terminal I/O failed: {err}"))
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } | CliError::Other { .. } => EXIT_ERROR,
        CliError::Partial { .. } => EXIT_PARTIAL,
    }
}

/// Render error appropriately based on JSON flag
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Main CLI entry point for mcmm.
///
/// Manages sets of Minecraft mods as named profiles.
#[derive(Parser, Debug)]
#[command(name = "mcmm")]
#[command(about = "Minecraft Mod Manager: download and switch between sets of mods")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity for mcmm (overridden by RUST_LOG)
    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Emit JSON logs on stderr and JSON envelopes on stdout
    #[arg(long, global = true, help = "Output logs and results in JSON format")]
    pub json: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install a downloaded profile into its Minecraft folder
    #[command(
        about = "Activate a profile",
        long_about = "Activate a profile.\n\nWARNING: every .jar file in the mods folder is deleted before the profile's jars are copied in, including jars mcmm did not put there."
    )]
    Activate {
        /// Profile name
        profile: String,
    },
    /// Remove every jar from a Minecraft installation's mods folder
    #[command(about = "Remove all jars from the mods folder")]
    Deactivate {
        /// Minecraft folder (defaults to the system installation)
        minecraft_folder: Option<PathBuf>,
    },
    /// Refresh a profile's jar cache
    #[command(about = "Download a profile's mods")]
    Download {
        /// Profile name
        profile: String,
        /// Minecraft version to download for instead of the profile's
        #[arg(long = "mc-version", value_name = "VERSION")]
        mc_version: Option<String>,
    },
    /// Interactively create a profile
    #[command(about = "Generate a new profile")]
    Generate {
        /// Profile name
        profile: String,
    },
    /// Print the names of all profiles
    #[command(about = "List profiles")]
    List,
    /// Print the registered mod providers
    #[command(about = "List mod providers and their capabilities")]
    Providers,
}

impl Commands {
    /// Subcommand name, for spans and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Activate { .. } => "activate",
            Self::Deactivate { .. } => "deactivate",
            Self::Download { .. } => "download",
            Self::Generate { .. } => "generate",
            Self::List => "list",
            Self::Providers => "providers",
        }
    }
}

/// Parse the process arguments, exiting with clap's usage error on failure.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
