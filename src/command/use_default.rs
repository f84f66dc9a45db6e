use anyhow::{Context, Result};

use crate::config::ConfigSource;
use crate::resolve;

pub async fn run_use(name: &str, source: &dyn ConfigSource) -> Result<()> {
    let loaded = source
        .discover_and_load()
        .context("a configuration file is required to set a default")?;

    let updated = resolve::set_default_configuration(name, &loaded.config)?;
    source.save(&updated, &loaded.file_path)?;

    println!("✅ Default configuration set to '{}'", name);
    println!("   Saved to {}", loaded.file_path.display());
    Ok(())
}
