use anyhow::Result;

use crate::config::{ConfigSource, StoreError};
use crate::resolve::{preview_configuration_resolution, preview_provider_model_resolution};
use crate::startup::{run_startup, StartupMode};
use crate::validate::validate_configuration_by_name;

use super::print_report;

/// Validate without activating: either a raw provider+model pair, a named
/// configuration (plus the full-document report), or, with no arguments, the
/// whole validate-only startup flow.
pub async fn run_check(
    name: Option<&str>,
    provider: Option<&str>,
    model: Option<&str>,
    source: &dyn ConfigSource,
) -> Result<()> {
    if let (Some(provider), Some(model)) = (provider, model) {
        return check_pair(provider, model, source);
    }

    match name {
        Some(name) => check_name(name, source),
        None => check_startup(source),
    }
}

fn check_pair(provider: &str, model: &str, source: &dyn ConfigSource) -> Result<()> {
    // The pair works without a document; only real load errors are fatal.
    let config = match source.discover_and_load() {
        Ok(loaded) => Some(loaded.config),
        Err(StoreError::NotFound { .. }) => None,
        Err(err) => return Err(err.into()),
    };

    let report = preview_provider_model_resolution(provider, model, config.as_ref());
    print_report(&report);
    if !report.is_valid() {
        anyhow::bail!("'{}' / '{}' would not resolve", provider, model);
    }
    println!("✅ '{}' / '{}' would resolve", provider, model);
    Ok(())
}

fn check_name(name: &str, source: &dyn ConfigSource) -> Result<()> {
    let loaded = source.discover_and_load()?;

    // Scoped to the named entry: a defect elsewhere in the document must not
    // drown out the answer.
    let report = validate_configuration_by_name(name, &loaded.config);
    print_report(&report);
    if !report.is_valid() {
        anyhow::bail!("configuration '{}' is invalid", name);
    }

    let report = preview_configuration_resolution(name, &loaded.config);
    print_report(&report);
    if !report.is_valid() {
        anyhow::bail!("configuration '{}' would not resolve", name);
    }
    println!("✅ configuration '{}' would resolve", name);
    Ok(())
}

fn check_startup(source: &dyn ConfigSource) -> Result<()> {
    let outcome = run_startup(StartupMode::ValidateOnly, source)?;

    if let Some(loaded) = &outcome.loaded {
        print_report(&loaded.validation);
    }
    if outcome.used_environment_fallback {
        println!("✅ ready from environment variables (no configuration file)");
    } else {
        println!("✅ default configuration would resolve");
    }
    println!("   Model: {}", outcome.environment.model);
    println!("   Base URL: {}", outcome.environment.base_url);
    Ok(())
}
