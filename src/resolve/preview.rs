//! Validate-only resolution previews.
//!
//! These run exactly the lookups the resolver runs, with the environment
//! side effect suppressed, and report the outcome as a
//! [`ValidationReport`]. Used wherever a caller needs to know whether a
//! resolution WOULD succeed without committing to it, such as `llmctl check`.

use crate::config::ConfigFile;
use crate::validate::ValidationReport;

use super::{resolve_configuration_by_name, resolve_provider_model};

/// Would `resolve_configuration_by_name` succeed? Never mutates anything.
pub fn preview_configuration_resolution(name: &str, config: &ConfigFile) -> ValidationReport {
    match resolve_configuration_by_name(name, config, false) {
        Ok(_) => ValidationReport::new(),
        Err(err) => ValidationReport::error(err.to_string()),
    }
}

/// Would `resolve_provider_model` succeed? Never mutates anything. A success
/// that would come from the built-in catalog is flagged as a warning so the
/// caller knows the document did not supply the provider.
pub fn preview_provider_model_resolution(
    provider: &str,
    model: &str,
    config: Option<&ConfigFile>,
) -> ValidationReport {
    match resolve_provider_model(provider, model, config, false) {
        Ok(resolution) => {
            let mut report = ValidationReport::new();
            if resolution.used_built_in_provider {
                report.add_warning(format!(
                    "provider '{}' is not declared in the document; \
                     the built-in catalog would be used",
                    provider
                ));
            }
            report
        }
        Err(err) => ValidationReport::error(err.to_string()),
    }
}
