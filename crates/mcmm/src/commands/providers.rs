//! `mcmm providers`

use std::fmt::Write;

use mcmm_core::providers::CapabilityKind;
use serde::Serialize;

use super::{Context, Output};
use crate::cli::CliError;

#[derive(Debug, Serialize)]
struct ProviderInfo {
    id: String,
    label: Option<String>,
    source: String,
    capabilities: Vec<CapabilityKind>,
}

#[derive(Debug, Serialize)]
struct ProvidersOutput {
    providers: Vec<ProviderInfo>,
    download: Vec<String>,
    generate: Vec<String>,
}

/// Registered providers in registration order, with their capabilities.
pub fn execute_providers(ctx: &Context) -> Result<Output, CliError> {
    let registry = ctx.runner.registry();
    let providers: Vec<ProviderInfo> = registry
        .iter()
        .map(|p| ProviderInfo {
            id: p.instance().id().to_string(),
            label: p.instance().label().map(str::to_string),
            source: p.source().to_string(),
            capabilities: p.kinds().to_vec(),
        })
        .collect();

    let width = providers.iter().map(|p| p.id.len()).max().unwrap_or(0);
    let mut text = String::new();
    for p in &providers {
        let kinds: Vec<&str> = p.capabilities.iter().map(|k| k.as_str()).collect();
        let _ = writeln!(
            text,
            "{:width$}  {:<10}  {}",
            p.id,
            kinds.join(","),
            p.label.as_deref().unwrap_or("-"),
        );
    }

    let output = ProvidersOutput {
        download: ctx.runner.providers_for(CapabilityKind::Download).to_vec(),
        generate: ctx.runner.providers_for(CapabilityKind::Generate).to_vec(),
        providers,
    };
    Output::new(text.trim_end(), &output)
}
