use anyhow::{Context, Result};
use tracing::info;

use crate::config::{ConfigSource, StoreError};
use crate::resolve::{resolve_configuration_by_name, resolve_provider_model};
use crate::startup::{run_startup, StartupMode};

/// Activate a configuration, then hand off to the downstream tool with the
/// live environment. Returns the tool's exit code.
pub async fn run_run(
    name: Option<&str>,
    provider: Option<&str>,
    model: Option<&str>,
    tool: &[String],
    source: &dyn ConfigSource,
) -> Result<i32> {
    if let (Some(provider), Some(model)) = (provider, model) {
        let config = match source.discover_and_load() {
            Ok(loaded) => Some(loaded.config),
            Err(StoreError::NotFound { .. }) => None,
            Err(err) => return Err(err.into()),
        };
        let resolution = resolve_provider_model(provider, model, config.as_ref(), true)?;
        let stored_provider = resolution
            .provider
            .as_ref()
            .and_then(|p| p.provider.as_deref())
            .unwrap_or(provider);
        info!(
            provider = stored_provider,
            model = %resolution.environment.model,
            built_in = resolution.used_built_in_provider,
            "activated provider/model pair"
        );
    } else if let Some(name) = name {
        let loaded = source.discover_and_load()?;
        let resolution = resolve_configuration_by_name(name, &loaded.config, true)?;
        let entry_provider = resolution
            .entry
            .as_ref()
            .and_then(|e| e.provider.clone())
            .unwrap_or_default();
        info!(
            configuration = name,
            provider = %entry_provider,
            model = %resolution.environment.model,
            "activated configuration"
        );
    } else {
        let outcome = run_startup(StartupMode::Execute, source)?;
        info!(model = %outcome.environment.model, "activated default configuration");
    }

    spawn_tool(tool).await
}

async fn spawn_tool(tool: &[String]) -> Result<i32> {
    let (program, args) = tool
        .split_first()
        .context("no downstream tool given")?;

    let status = tokio::process::Command::new(program)
        .args(args)
        .status()
        .await
        .with_context(|| format!("failed to launch '{}'", program))?;

    Ok(status.code().unwrap_or(1))
}
