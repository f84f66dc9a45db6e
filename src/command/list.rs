use anyhow::Result;

use crate::config::{ConfigSource, StoreError};
use crate::registry;
use crate::resolve::{all_provider_names, models_for_built_in_provider, models_for_provider};

pub async fn run_list(source: &dyn ConfigSource) -> Result<()> {
    match source.discover_and_load() {
        Ok(loaded) => {
            println!("Configuration file: {}", loaded.file_path.display());

            let default = loaded.config.default_name().map(str::to_string);
            println!("\nConfigurations:");
            let mut any = false;
            for entry in loaded.config.entries() {
                any = true;
                let name = entry.name.as_deref().unwrap_or("(unnamed)");
                let marker = if Some(name) == default.as_deref() {
                    "*"
                } else {
                    " "
                };
                println!(
                    "  {} {}  ({} / {})",
                    marker,
                    name,
                    entry.provider.as_deref().unwrap_or("?"),
                    entry.model.as_deref().unwrap_or("?"),
                );
            }
            if !any {
                println!("    (none)");
            }

            println!("\nProviders:");
            let providers = all_provider_names(&loaded.config);
            for name in &providers {
                let models = models_for_provider(name, &loaded.config);
                let shadow = if registry::is_built_in_provider(name) {
                    "  (overrides built-in)"
                } else {
                    ""
                };
                println!("    {}  [{}]{}", name, models.join(", "), shadow);
            }
            if providers.is_empty() {
                println!("    (none)");
            }
        }
        Err(StoreError::NotFound { .. }) => {
            println!("No configuration file found.");
        }
        Err(err) => return Err(err.into()),
    }

    println!("\nBuilt-in providers (API key via environment):");
    for provider in registry::built_in_providers() {
        println!(
            "    {} ({}, key: {})  [{}]",
            provider.key,
            provider.display_name,
            provider.api_key_var,
            models_for_built_in_provider(provider.key).join(", ")
        );
    }

    Ok(())
}
