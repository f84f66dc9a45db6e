use anyhow::Result;

use crate::config::{ConfigSource, StoreError};
use crate::env::{self, API_KEY_VAR, BASE_URL_VAR, MODEL_VAR};
use crate::resolve::{all_configuration_names, current_default_configuration};

pub async fn run_status(source: &dyn ConfigSource) -> Result<()> {
    match source.discover_and_load() {
        Ok(loaded) => {
            println!("✅ Configuration file: {}", loaded.file_path.display());
            if !loaded.validation.is_valid() {
                println!(
                    "⚠️  Document has {} validation error(s); run 'llmctl check'",
                    loaded.validation.errors.len()
                );
            }
            println!(
                "   Configurations: {}",
                all_configuration_names(&loaded.config).join(", ")
            );
            match current_default_configuration(&loaded.config) {
                Some(entry) => println!(
                    "   Default: {} ({} / {})",
                    entry.name.as_deref().unwrap_or("?"),
                    entry.provider.as_deref().unwrap_or("?"),
                    entry.model.as_deref().unwrap_or("?"),
                ),
                None => println!("   Default: (none; set one with 'llmctl use <name>')"),
            }
        }
        Err(StoreError::NotFound { .. }) => {
            println!("❌ No configuration file found");
        }
        Err(err) => return Err(err.into()),
    }

    println!("\nEnvironment:");
    for var in [API_KEY_VAR, BASE_URL_VAR, MODEL_VAR] {
        match env::read_var(var) {
            // Never echo credential values.
            Some(value) if var == API_KEY_VAR => {
                println!("   {} = (set, {} chars)", var, value.len())
            }
            Some(value) => println!("   {} = {}", var, value),
            None => println!("   {} is not set", var),
        }
    }

    Ok(())
}
