//! Configuration resolution.
//!
//! Turns a saved configuration name, or a raw provider+model pair, into the
//! concrete credential/endpoint/model triple. Resolution is fail-fast: it
//! exists for activation, not reporting, so it stops at the first mismatch
//! with a message that enumerates what IS available. Exhaustive diagnostics
//! live in the validator and the [`preview`] helpers.
//!
//! Resolution itself is pure; the environment write happens only when the
//! caller passes `apply = true`, through [`ActivationEnv::apply`].

mod preview;
mod queries;

pub use preview::{preview_configuration_resolution, preview_provider_model_resolution};
pub use queries::{
    all_configuration_names, all_provider_names, current_default_configuration,
    find_configuration_by_name, find_provider_by_name, models_for_built_in_provider,
    models_for_provider,
};

use thiserror::Error;

use crate::config::{canonical_key, ConfigEntry, ConfigFile, DefaultConfig, Provider};
use crate::env::{self, ActivationEnv};
use crate::registry;

/// Why a resolution failed. Display always carries remediation: the names,
/// providers, models, or variables the caller could have used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("configuration '{name}' not found; known configurations: {known}")]
    UnknownConfiguration { name: String, known: String },

    #[error("configuration '{name}' is incomplete: missing {field}")]
    IncompleteEntry { name: String, field: &'static str },

    #[error(
        "configuration '{name}' references unknown provider '{provider}'; \
         known providers: {known}"
    )]
    UnknownProvider {
        name: String,
        provider: String,
        known: String,
    },

    #[error(
        "provider '{provider}' is neither declared in the document nor built in; \
         declared providers: {declared}; built-in providers: {built_in}"
    )]
    UnknownProviderKey {
        provider: String,
        declared: String,
        built_in: String,
    },

    #[error("provider '{provider}' does not support model '{model}'; known models: {known}")]
    UnsupportedModel {
        provider: String,
        model: String,
        known: String,
    },

    #[error("provider '{provider}' has no env block in the document")]
    MissingProviderEnv { provider: String },

    #[error("provider '{provider}': api_key is missing or empty in the document")]
    MissingApiKey { provider: String },

    #[error("provider '{provider}': base_url is missing or empty in the document")]
    MissingBaseUrl { provider: String },

    #[error(
        "no API key available for built-in provider '{provider}'; \
         set {specific} or {generic}"
    )]
    MissingBuiltInKey {
        provider: String,
        specific: &'static str,
        generic: &'static str,
    },

    #[error("built-in provider '{provider}' needs a resource name; set {var}")]
    MissingResource {
        provider: String,
        var: &'static str,
    },

    #[error("no default configuration declared; set one with 'llmctl use <name>'")]
    NoDefaultConfiguration,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The triple that was (or would be) activated.
    pub environment: ActivationEnv,
    /// The matched configuration entry, for by-name resolution.
    pub entry: Option<ConfigEntry>,
    /// The matched document provider, when the document supplied it.
    pub provider: Option<Provider>,
    /// Whether the built-in catalog supplied the provider.
    pub used_built_in_provider: bool,
}

pub type ResolveResult = Result<Resolution, ResolveError>;

fn join_or_none<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn required<'a>(
    value: &'a Option<String>,
    name: &str,
    field: &'static str,
) -> Result<&'a str, ResolveError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ResolveError::IncompleteEntry {
            name: name.to_string(),
            field,
        })
}

/// Resolve a saved configuration by name.
///
/// Uniqueness is a validator concern; if duplicates exist the first match in
/// document order wins. The provider lookup is by exact name, matching the
/// cross-reference invariant the validator enforces.
pub fn resolve_configuration_by_name(
    name: &str,
    config: &ConfigFile,
    apply: bool,
) -> ResolveResult {
    let entry = find_configuration_by_name(name, config).ok_or_else(|| {
        ResolveError::UnknownConfiguration {
            name: name.to_string(),
            known: join_or_none(&config.config_names()),
        }
    })?;

    let provider_name = required(&entry.provider, name, "provider")?;
    let model = required(&entry.model, name, "model")?;

    let provider = config
        .declared_providers()
        .find(|p| p.provider.as_deref() == Some(provider_name))
        .ok_or_else(|| ResolveError::UnknownProvider {
            name: name.to_string(),
            provider: provider_name.to_string(),
            known: join_or_none(&config.provider_names()),
        })?;

    let provider_env =
        provider
            .env
            .as_ref()
            .ok_or_else(|| ResolveError::MissingProviderEnv {
                provider: provider_name.to_string(),
            })?;

    if !provider_env.model_names().any(|m| m == model) {
        return Err(ResolveError::UnsupportedModel {
            provider: provider_name.to_string(),
            model: model.to_string(),
            known: join_or_none(&provider_env.model_names().collect::<Vec<_>>()),
        });
    }

    let environment = ActivationEnv {
        api_key: non_empty(&provider_env.api_key).ok_or_else(|| ResolveError::MissingApiKey {
            provider: provider_name.to_string(),
        })?,
        base_url: non_empty(&provider_env.base_url).ok_or_else(|| {
            ResolveError::MissingBaseUrl {
                provider: provider_name.to_string(),
            }
        })?,
        model: model.to_string(),
    };

    if apply {
        environment.apply();
    }

    tracing::debug!(configuration = name, model, "resolved configuration by name");

    Ok(Resolution {
        environment,
        entry: Some(entry.clone()),
        provider: Some(provider.clone()),
        used_built_in_provider: false,
    })
}

/// Resolve a raw provider+model pair.
///
/// Tries the document first (provider matched case-insensitively, model
/// matched case-insensitively against its list), then falls back to the
/// built-in catalog, which needs an API key from the environment. The
/// returned model is always in the stored case, not the caller's.
pub fn resolve_provider_model(
    provider: &str,
    model: &str,
    config: Option<&ConfigFile>,
    apply: bool,
) -> ResolveResult {
    if let Some(config) = config {
        if let Some(declared) = find_provider_by_name(provider, config) {
            if let Some(resolution) = resolve_from_document(declared, model, apply)? {
                return Ok(resolution);
            }
        }
    }

    resolve_from_built_in(provider, model, config, apply)
}

/// Document branch of the pair resolution. Returns `Ok(None)` when the
/// declared provider does not list the model, so the built-in catalog gets a
/// chance; a declared provider that has the model but unusable credentials is
/// a hard failure rather than a silent fallback.
fn resolve_from_document(
    declared: &Provider,
    model: &str,
    apply: bool,
) -> Result<Option<Resolution>, ResolveError> {
    let provider_name = declared.provider.as_deref().unwrap_or_default();

    let provider_env = match &declared.env {
        Some(env) => env,
        None => return Ok(None),
    };

    let stored = match provider_env.stored_model(model) {
        Some(stored) => stored.to_string(),
        None => return Ok(None),
    };

    let environment = ActivationEnv {
        api_key: non_empty(&provider_env.api_key).ok_or_else(|| ResolveError::MissingApiKey {
            provider: provider_name.to_string(),
        })?,
        base_url: non_empty(&provider_env.base_url).ok_or_else(|| {
            ResolveError::MissingBaseUrl {
                provider: provider_name.to_string(),
            }
        })?,
        model: stored,
    };

    if apply {
        environment.apply();
    }

    tracing::debug!(provider = provider_name, model = %environment.model, "resolved declared provider");

    Ok(Some(Resolution {
        environment,
        entry: None,
        provider: Some(declared.clone()),
        used_built_in_provider: false,
    }))
}

fn resolve_from_built_in(
    provider: &str,
    model: &str,
    config: Option<&ConfigFile>,
    apply: bool,
) -> ResolveResult {
    let built_in = registry::find_built_in(provider).ok_or_else(|| {
        ResolveError::UnknownProviderKey {
            provider: provider.to_string(),
            declared: join_or_none(
                &config.map(|c| c.provider_names()).unwrap_or_default(),
            ),
            built_in: join_or_none(&registry::built_in_provider_names()),
        }
    })?;

    let stored = built_in.stored_model(model).ok_or_else(|| {
        ResolveError::UnsupportedModel {
            provider: built_in.key.to_string(),
            model: model.to_string(),
            known: join_or_none(built_in.models()),
        }
    })?;

    let api_key = env::read_var(built_in.api_key_var)
        .or_else(|| env::read_var(env::API_KEY_VAR))
        .ok_or_else(|| ResolveError::MissingBuiltInKey {
            provider: built_in.key.to_string(),
            specific: built_in.api_key_var,
            generic: env::API_KEY_VAR,
        })?;

    let resource = env::read_var(env::AZURE_RESOURCE_VAR).or_else(|| resource_from_model(stored));
    let base_url = built_in.base_url(resource.as_deref()).ok_or_else(|| {
        ResolveError::MissingResource {
            provider: built_in.key.to_string(),
            var: env::AZURE_RESOURCE_VAR,
        }
    })?;

    let environment = ActivationEnv {
        api_key,
        base_url,
        model: stored.to_string(),
    };

    if apply {
        environment.apply();
    }

    tracing::debug!(provider = built_in.key, model = stored, "resolved built-in provider");

    Ok(Resolution {
        environment,
        entry: None,
        provider: None,
        used_built_in_provider: true,
    })
}

/// Resolve the authoritative default configuration. Entries beyond the first
/// `default_config` element are ignored.
pub fn resolve_default_configuration(config: &ConfigFile, apply: bool) -> ResolveResult {
    match config.default_name() {
        Some(name) => resolve_configuration_by_name(name, config, apply),
        None => Err(ResolveError::NoDefaultConfiguration),
    }
}

/// Produce an updated document whose `default_config` points at `name`.
/// Fails without producing anything when the name is unknown; the caller is
/// responsible for persisting the result.
pub fn set_default_configuration(name: &str, config: &ConfigFile) -> Result<ConfigFile, ResolveError> {
    if find_configuration_by_name(name, config).is_none() {
        return Err(ResolveError::UnknownConfiguration {
            name: name.to_string(),
            known: join_or_none(&config.config_names()),
        });
    }

    let mut updated = config.clone();
    updated.default_config = Some(vec![DefaultConfig {
        name: Some(name.to_string()),
    }]);
    Ok(updated)
}

/// Deployment resource derived from a model name when no dedicated variable
/// is set: the alphanumeric characters, lowercased.
fn resource_from_model(model: &str) -> Option<String> {
    let resource: String = canonical_key(model)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if resource.is_empty() {
        None
    } else {
        Some(resource)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}


#[cfg(test)]
mod tests {
    use super::testcfg::single_entry;
    use super::*;
    use crate::env::testenv::EnvGuard;
    use crate::env::{API_KEY_VAR, AZURE_RESOURCE_VAR, BASE_URL_VAR, MODEL_VAR};

    const ALL_VARS: &[&str] = &[
        API_KEY_VAR,
        BASE_URL_VAR,
        MODEL_VAR,
        AZURE_RESOURCE_VAR,
        "GOOGLE_API_KEY",
        "ANTHROPIC_API_KEY",
        "AZURE_OPENAI_API_KEY",
    ];

    #[test]
    fn test_resolve_by_name_success() {
        let _guard = EnvGuard::new(ALL_VARS);
        let cfg = single_entry();
        let resolution = resolve_configuration_by_name("a", &cfg, false).unwrap();
        assert_eq!(resolution.environment.api_key, "k");
        assert_eq!(resolution.environment.base_url, "https://x/v1");
        assert_eq!(resolution.environment.model, "m");
        assert!(!resolution.used_built_in_provider);
        assert_eq!(
            resolution.entry.unwrap().name.as_deref(),
            Some("a")
        );
        // apply = false must leave the environment untouched
        assert_eq!(crate::env::read_var(API_KEY_VAR), None);
    }

    #[test]
    fn test_resolve_by_name_applies_environment() {
        let _guard = EnvGuard::new(ALL_VARS);
        let cfg = single_entry();
        resolve_configuration_by_name("a", &cfg, true).unwrap();
        assert_eq!(crate::env::read_var(API_KEY_VAR).as_deref(), Some("k"));
        assert_eq!(
            crate::env::read_var(BASE_URL_VAR).as_deref(),
            Some("https://x/v1")
        );
        assert_eq!(crate::env::read_var(MODEL_VAR).as_deref(), Some("m"));
    }

    #[test]
    fn test_resolve_by_name_unknown_lists_available() {
        let cfg = single_entry();
        let err = resolve_configuration_by_name("b", &cfg, false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'b' not found"));
        assert!(message.contains("known configurations: a"));
    }

    #[test]
    fn test_resolve_by_name_is_idempotent() {
        let cfg = single_entry();
        let first = resolve_configuration_by_name("a", &cfg, false).unwrap();
        let second = resolve_configuration_by_name("a", &cfg, false).unwrap();
        assert_eq!(first.environment, second.environment);
    }

    #[test]
    fn test_resolve_by_name_model_not_listed() {
        let mut cfg = single_entry();
        cfg.configs.as_mut().unwrap()[0].config.as_mut().unwrap()[0].model =
            Some("other".to_string());
        let err = resolve_configuration_by_name("a", &cfg, false).unwrap_err();
        assert!(err.to_string().contains("known models: m"));
    }

    #[test]
    fn test_resolve_pair_document_case_insensitive_stored_case() {
        let _guard = EnvGuard::new(ALL_VARS);
        let cfg: ConfigFile = serde_yaml::from_str(
            r#"
configs: []
providers:
  - provider: OpenAI
    env:
      api_key: k
      base_url: https://x/v1
      models:
        - model: GPT-4
"#,
        )
        .unwrap();

        let upper = resolve_provider_model("OPENAI", "gpt-4", Some(&cfg), false).unwrap();
        let lower = resolve_provider_model("openai", "GPT-4", Some(&cfg), false).unwrap();
        assert_eq!(upper.environment.model, "GPT-4");
        assert_eq!(lower.environment.model, "GPT-4");
        assert!(!upper.used_built_in_provider);
    }

    #[test]
    fn test_resolve_pair_falls_back_to_built_in() {
        let _guard = EnvGuard::new(ALL_VARS);
        std::env::set_var("GOOGLE_API_KEY", "gk");
        let cfg = single_entry(); // no google provider declared
        let resolution =
            resolve_provider_model("google", "gemini-pro", Some(&cfg), false).unwrap();
        assert!(resolution.used_built_in_provider);
        assert_eq!(resolution.environment.api_key, "gk");
        assert_eq!(resolution.environment.model, "gemini-pro");
    }

    #[test]
    fn test_built_in_prefers_specific_key_over_generic() {
        let _guard = EnvGuard::new(ALL_VARS);
        std::env::set_var(API_KEY_VAR, "generic");
        std::env::set_var("GOOGLE_API_KEY", "specific");
        let resolution = resolve_provider_model("google", "gemini-pro", None, false).unwrap();
        assert_eq!(resolution.environment.api_key, "specific");

        std::env::remove_var("GOOGLE_API_KEY");
        let resolution = resolve_provider_model("google", "gemini-pro", None, false).unwrap();
        assert_eq!(resolution.environment.api_key, "generic");
    }

    #[test]
    fn test_built_in_without_key_fails_with_variable_names() {
        let _guard = EnvGuard::new(ALL_VARS);
        let err = resolve_provider_model("google", "gemini-pro", None, false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("GOOGLE_API_KEY"));
        assert!(message.contains(API_KEY_VAR));
    }

    #[test]
    fn test_azure_base_url_from_resource_variable() {
        let _guard = EnvGuard::new(ALL_VARS);
        std::env::set_var("AZURE_OPENAI_API_KEY", "ak");
        std::env::set_var(AZURE_RESOURCE_VAR, "myorg");
        let resolution = resolve_provider_model("azure", "gpt-4o", None, false).unwrap();
        assert_eq!(
            resolution.environment.base_url,
            "https://myorg.openai.azure.com/openai"
        );
    }

    #[test]
    fn test_azure_base_url_derived_from_model() {
        let _guard = EnvGuard::new(ALL_VARS);
        std::env::set_var("AZURE_OPENAI_API_KEY", "ak");
        let resolution = resolve_provider_model("azure", "gpt-4o", None, false).unwrap();
        assert_eq!(
            resolution.environment.base_url,
            "https://gpt4o.openai.azure.com/openai"
        );
    }

    #[test]
    fn test_unknown_provider_lists_both_catalogs() {
        let _guard = EnvGuard::new(ALL_VARS);
        let cfg = single_entry();
        let err = resolve_provider_model("mistral", "x", Some(&cfg), false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("declared providers: p"));
        assert!(message.contains("built-in providers: openai, azure, anthropic, google"));
    }

    #[test]
    fn test_resolve_default_configuration() {
        let _guard = EnvGuard::new(ALL_VARS);
        let mut cfg = single_entry();
        assert_eq!(
            resolve_default_configuration(&cfg, false).unwrap_err(),
            ResolveError::NoDefaultConfiguration
        );

        cfg = set_default_configuration("a", &cfg).unwrap();
        let resolution = resolve_default_configuration(&cfg, false).unwrap();
        assert_eq!(resolution.environment.model, "m");
    }

    #[test]
    fn test_set_default_unknown_name_fails_without_change() {
        let cfg = single_entry();
        let err = set_default_configuration("nope", &cfg).unwrap_err();
        assert!(err.to_string().contains("known configurations: a"));
        assert!(cfg.default_config.is_none());
    }

    #[test]
    fn test_only_first_default_entry_counts() {
        let _guard = EnvGuard::new(ALL_VARS);
        let mut cfg = single_entry();
        cfg.default_config = Some(vec![
            DefaultConfig {
                name: Some("a".to_string()),
            },
            DefaultConfig {
                name: Some("missing".to_string()),
            },
        ]);
        assert!(resolve_default_configuration(&cfg, false).is_ok());
    }
}
