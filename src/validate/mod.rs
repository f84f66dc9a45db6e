//! Structural and cross-reference validation of configuration documents.
//!
//! Every function here returns a [`ValidationReport`] and never panics on a
//! malformed document. Validation is exhaustive, not fail-fast: a single pass
//! reports every defect, because these reports are meant for diagnostic
//! display, not activation. Activation uses the resolver, which stops at the
//! first mismatch.

use std::collections::BTreeSet;

use url::Url;

use crate::config::{ConfigEntry, ConfigFile, ConfigGroup, ModelEntry, Provider, ProviderEnv};

/// Outcome of a validation pass: collected errors and warnings.
///
/// A report is valid when it carries no errors; warnings never fail a
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A report carrying a single error.
    pub fn error(message: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.add_error(message);
        report
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Fold another report's findings into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Validate one model entry within a provider's model list.
pub fn validate_model_entry(entry: &ModelEntry, provider: &str, index: usize) -> ValidationReport {
    let mut report = ValidationReport::new();
    if is_blank(&entry.model) {
        report.add_error(format!(
            "provider '{}': model entry {} is missing a model name",
            provider, index
        ));
    }
    report
}

/// Validate a provider's credential/endpoint/model block.
pub fn validate_provider_env(env: &ProviderEnv, provider: &str) -> ValidationReport {
    let mut report = ValidationReport::new();

    if is_blank(&env.api_key) {
        report.add_error(format!("provider '{}': api_key is missing or empty", provider));
    }

    match env.base_url.as_deref() {
        None => report.add_error(format!("provider '{}': base_url is missing", provider)),
        Some(raw) if raw.trim().is_empty() => {
            report.add_error(format!("provider '{}': base_url is empty", provider));
        }
        Some(raw) => {
            if Url::parse(raw).is_err() {
                report.add_error(format!(
                    "provider '{}': base_url '{}' is not a valid URL",
                    provider, raw
                ));
            }
        }
    }

    match &env.models {
        None => report.add_warning(format!("provider '{}': no models declared", provider)),
        Some(models) if models.is_empty() => {
            report.add_warning(format!("provider '{}': no models declared", provider));
        }
        Some(models) => {
            for (index, model) in models.iter().enumerate() {
                report.merge(validate_model_entry(model, provider, index));
            }
        }
    }

    report
}

/// Validate one declared provider.
pub fn validate_provider(provider: &Provider, index: usize) -> ValidationReport {
    let mut report = ValidationReport::new();

    let name = match provider.provider.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            report.add_error(format!("provider at index {} is missing a name", index));
            return report;
        }
    };

    match &provider.env {
        Some(env) => report.merge(validate_provider_env(env, name)),
        None => report.add_error(format!("provider '{}': env block is missing", name)),
    }

    report
}

/// Validate one configuration entry's own fields (no cross-references).
pub fn validate_config_entry(entry: &ConfigEntry, index: usize) -> ValidationReport {
    let mut report = ValidationReport::new();

    let label = entry
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("configuration '{}'", n))
        .unwrap_or_else(|| format!("configuration entry {}", index));

    if is_blank(&entry.name) {
        report.add_error(format!("{}: name is missing or empty", label));
    }
    if is_blank(&entry.provider) {
        report.add_error(format!("{}: provider is missing or empty", label));
    }
    if is_blank(&entry.model) {
        report.add_error(format!("{}: model is missing or empty", label));
    }

    report
}

/// Validate one configuration group and its entries.
pub fn validate_config_group(group: &ConfigGroup, index: usize) -> ValidationReport {
    let mut report = ValidationReport::new();

    match &group.config {
        None => report.add_error(format!(
            "configuration group {} is missing its 'config' list",
            index
        )),
        Some(entries) => {
            for (entry_index, entry) in entries.iter().enumerate() {
                report.merge(validate_config_entry(entry, entry_index));
            }
        }
    }

    report
}

/// Validate the `default_config` section: zero entries is fine, extras beyond
/// the first are a warning, and the authoritative name must exist.
pub fn validate_default_config(config: &ConfigFile) -> ValidationReport {
    let mut report = ValidationReport::new();

    let defaults = match &config.default_config {
        Some(defaults) if !defaults.is_empty() => defaults,
        _ => return report,
    };

    if defaults.len() > 1 {
        report.add_warning(format!(
            "default_config declares {} entries; only the first is used",
            defaults.len()
        ));
    }

    match defaults[0].name.as_deref() {
        None => report.add_error("default_config entry is missing a name".to_string()),
        Some(name) if name.trim().is_empty() => {
            report.add_error("default_config entry has an empty name".to_string());
        }
        Some(name) => {
            if !config.config_names().contains(&name) {
                report.add_error(format!(
                    "default_config points at '{}', which does not exist; known configurations: {}",
                    name,
                    join_or_none(&config.config_names())
                ));
            }
        }
    }

    report
}

/// Report each configuration name used more than once, once per distinct
/// duplicate. Names are flattened across all groups before comparing.
pub fn validate_unique_config_names(config: &ConfigFile) -> ValidationReport {
    let mut report = ValidationReport::new();
    for name in duplicates(config.config_names()) {
        report.add_error(format!(
            "configuration name '{}' is declared more than once",
            name
        ));
    }
    report
}

/// Report each provider name declared more than once.
pub fn validate_unique_provider_names(config: &ConfigFile) -> ValidationReport {
    let mut report = ValidationReport::new();
    for name in duplicates(config.provider_names()) {
        report.add_error(format!(
            "provider name '{}' is declared more than once",
            name
        ));
    }
    report
}

/// Check the cross-reference graph: every entry's provider exists, and its
/// model appears in that provider's model list. Entries with missing fields
/// are skipped here; the structural checks already report them.
pub fn validate_provider_model_cross_references(config: &ConfigFile) -> ValidationReport {
    let mut report = ValidationReport::new();

    for entry in config.entries() {
        let (name, provider_name, model) = match (
            entry.name.as_deref(),
            entry.provider.as_deref(),
            entry.model.as_deref(),
        ) {
            (Some(n), Some(p), Some(m)) => (n, p, m),
            _ => continue,
        };

        report.merge(check_entry_references(config, name, provider_name, model));
    }

    report
}

fn check_entry_references(
    config: &ConfigFile,
    name: &str,
    provider_name: &str,
    model: &str,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    let provider = config
        .declared_providers()
        .find(|p| p.provider.as_deref() == Some(provider_name));

    let provider = match provider {
        Some(provider) => provider,
        None => {
            report.add_error(format!(
                "configuration '{}' references unknown provider '{}'; known providers: {}",
                name,
                provider_name,
                join_or_none(&config.provider_names())
            ));
            return report;
        }
    };

    let models: Vec<&str> = provider
        .env
        .as_ref()
        .map(|env| env.model_names().collect())
        .unwrap_or_default();

    if !models.contains(&model) {
        report.add_error(format!(
            "configuration '{}' references model '{}' not declared by provider '{}'; known models: {}",
            name,
            model,
            provider_name,
            join_or_none(&models)
        ));
    }

    report
}

/// Validate the whole document: sections, entries, providers, uniqueness,
/// cross-references, and the default pointer, aggregated into one report.
pub fn validate_config_file(config: &ConfigFile) -> ValidationReport {
    let mut report = ValidationReport::new();

    match &config.configs {
        None => report.add_error("document is missing the 'configs' section".to_string()),
        Some(groups) => {
            for (index, group) in groups.iter().enumerate() {
                report.merge(validate_config_group(group, index));
            }
        }
    }

    match &config.providers {
        None => report.add_error("document is missing the 'providers' section".to_string()),
        Some(providers) => {
            for (index, provider) in providers.iter().enumerate() {
                report.merge(validate_provider(provider, index));
            }
        }
    }

    report.merge(validate_unique_config_names(config));
    report.merge(validate_unique_provider_names(config));
    report.merge(validate_provider_model_cross_references(config));
    report.merge(validate_default_config(config));

    report
}

/// Validate a single named entry plus its cross-references only. Used by the
/// `check <name>` surface, where a defect elsewhere in the document should
/// not drown out the answer.
pub fn validate_configuration_by_name(name: &str, config: &ConfigFile) -> ValidationReport {
    let entry = config
        .entries()
        .find(|e| e.name.as_deref() == Some(name));

    let entry = match entry {
        Some(entry) => entry,
        None => {
            return ValidationReport::error(format!(
                "configuration '{}' not found; known configurations: {}",
                name,
                join_or_none(&config.config_names())
            ));
        }
    };

    let mut report = validate_config_entry(entry, 0);

    if let (Some(provider_name), Some(model)) =
        (entry.provider.as_deref(), entry.model.as_deref())
    {
        report.merge(check_entry_references(config, name, provider_name, model));
    }

    report
}

/// Distinct values appearing more than once, in first-occurrence order.
fn duplicates(names: Vec<&str>) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    let mut out = Vec::new();
    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            out.push(name);
        }
    }
    out
}

fn join_or_none(names: &[&str]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
