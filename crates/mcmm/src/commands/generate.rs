//! `mcmm generate <profile>`
//!
//! Asks for the profile's Minecraft folder and version, then loops over the
//! provider menu until the user types `finish`. A provider that errors only
//! loses the entry being generated, never the profile.

use std::path::PathBuf;

use mcmm_core::Profile;
use mcmm_core::prompt::{Prompt, ask_optional, confirm};
use mcmm_core::providers::CapabilityKind;
use mcmm_core::sync::generate_entry;
use serde::Serialize;
use tracing::{info, warn};

use super::{Context, Output};
use crate::cli::CliError;

/// Menu answer that ends the provider loop.
const FINISH: &str = "finish";

#[derive(Debug, Serialize)]
struct GenerateOutput {
    profile: String,
    saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    mods: usize,
}

/// Interactively build and save `profile`.
pub fn execute_generate(
    ctx: &Context,
    profile: &str,
    prompt: &mut dyn Prompt,
) -> Result<Output, CliError> {
    if ctx.store.exists(profile)?
        && !confirm(
            prompt,
            &format!("Profile '{profile}' already exists. Do you want to overwrite it? (y/n) "),
        )?
    {
        return Output::new(
            "Quitting...",
            &GenerateOutput {
                profile: profile.to_string(),
                saved: false,
                path: None,
                mods: 0,
            },
        );
    }

    let minecraft_folder = ask_optional(
        prompt,
        "Minecraft folder (leave empty for system default): ",
    )?
    .map(|folder| folder.trim().to_string())
    .filter(|folder| !folder.is_empty());

    let default_version = &ctx.settings.default_minecraft_version;
    let version = prompt.ask(&format!("Minecraft Version (default: {default_version}): "))?;
    let version = match version.trim() {
        "" => default_version.clone(),
        v => v.to_string(),
    };

    let mut new_profile = Profile::new(version);
    new_profile.minecraft_folder = minecraft_folder;

    let available = ctx.runner.providers_for(CapabilityKind::Generate);
    loop {
        prompt.say("\nAvailable Mod Providers:")?;
        for id in available {
            prompt.say(&format!("    {id}"))?;
        }

        let answer = prompt.ask(&format!(
            "\nEnter a Mod Provider ID or '{FINISH}' to finish: "
        ))?;
        let id = answer.trim();
        if id == FINISH {
            break;
        }
        if !available.iter().any(|a| a == id) {
            prompt.say(&format!("'{id}' is not a valid Mod Provider ID."))?;
            continue;
        }

        match generate_entry(&ctx.runner, id, prompt) {
            Ok(entry) => {
                info!(profile, provider = id, "Added mod entry");
                new_profile.mods.push(entry);
            }
            Err(e) => {
                warn!(profile, provider = id, error = %e, "Mod provider failed to generate an entry");
                prompt.say(&format!(
                    "The selected mod provider errored with the following explanation: {e}"
                ))?;
            }
        }
    }

    let path = ctx.store.save(profile, &new_profile)?;
    Output::new(
        format!("Profile '{profile}' successfully generated."),
        &GenerateOutput {
            profile: profile.to_string(),
            saved: true,
            path: Some(path),
            mods: new_profile.mods.len(),
        },
    )
}
