//! Configuration document data model.
//!
//! These types mirror the on-disk YAML/JSON object 1:1:
//!
//! ```yaml
//! default_config:
//!   - name: work
//! configs:
//!   - config:
//!       - name: work
//!         provider: openai
//!         model: gpt-4o
//! providers:
//!   - provider: openai
//!     env:
//!       api_key: sk-...
//!       base_url: https://api.openai.com/v1
//!       models:
//!         - model: gpt-4o
//! ```
//!
//! Every leaf a document can omit or null out is an `Option`, so a malformed
//! document still deserializes and the validator reports the defect with a
//! specific message instead of serde rejecting the whole file.

use serde::{Deserialize, Serialize};

/// Normalize a provider or model key for lookups.
///
/// This is the single canonicalization point for case-insensitive matching:
/// the registry stores its keys pre-canonicalized, and every document lookup
/// passes both sides through here.
pub fn canonical_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Case-insensitive key comparison via [`canonical_key`].
pub fn keys_match(a: &str, b: &str) -> bool {
    canonical_key(a) == canonical_key(b)
}

/// A single model identifier, scoped to a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEntry {
    #[serde(default)]
    pub model: Option<String>,
}

/// A provider's credentials, endpoint, and supported models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderEnv {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub models: Option<Vec<ModelEntry>>,
}

impl ProviderEnv {
    /// Iterate the declared model names, skipping null entries.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models
            .iter()
            .flatten()
            .filter_map(|m| m.model.as_deref())
    }

    /// Find a declared model matching `model` case-insensitively, returning
    /// it in the document's stored case.
    pub fn stored_model(&self, model: &str) -> Option<&str> {
        self.model_names().find(|m| keys_match(m, model))
    }
}

/// A named provider declared by the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provider {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub env: Option<ProviderEnv>,
}

/// A named activation target: which provider and model to switch to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// A group of configuration entries. Grouping is organizational only; names
/// are unique across all groups, not per group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigGroup {
    #[serde(default)]
    pub config: Option<Vec<ConfigEntry>>,
}

/// Pointer to the configuration activated when no explicit name is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultConfig {
    #[serde(default)]
    pub name: Option<String>,
}

/// The root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_config: Option<Vec<DefaultConfig>>,
    #[serde(default)]
    pub configs: Option<Vec<ConfigGroup>>,
    #[serde(default)]
    pub providers: Option<Vec<Provider>>,
}

impl ConfigFile {
    /// Iterate all configuration entries, flattened across groups in
    /// document order.
    pub fn entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.configs
            .iter()
            .flatten()
            .filter_map(|g| g.config.as_ref())
            .flatten()
    }

    /// Iterate all declared providers.
    pub fn declared_providers(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter().flatten()
    }

    /// All configuration names in document order, skipping unnamed entries.
    pub fn config_names(&self) -> Vec<&str> {
        self.entries().filter_map(|e| e.name.as_deref()).collect()
    }

    /// All provider names in document order, skipping unnamed providers.
    pub fn provider_names(&self) -> Vec<&str> {
        self.declared_providers()
            .filter_map(|p| p.provider.as_deref())
            .collect()
    }

    /// Name of the authoritative default configuration, if declared.
    ///
    /// Only the first `default_config` entry counts; extras are a validator
    /// warning.
    pub fn default_name(&self) -> Option<&str> {
        self.default_config.as_ref()?.first()?.name.as_deref()
    }
}
