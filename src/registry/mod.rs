//! Built-in provider registry.
//!
//! A compiled-in catalog of well-known providers that a user can activate
//! without declaring them in the configuration document, supplying only an
//! API key through the environment. Keys are stored pre-canonicalized
//! (lowercase); lookups normalize the requested key once. Model names keep
//! their declared case and are returned in that case, not the caller's.

use crate::config::canonical_key;

/// Placeholder substituted into templated base URLs.
const RESOURCE_TOKEN: &str = "{resource}";

/// One entry in the built-in catalog.
#[derive(Debug)]
pub struct BuiltInProvider {
    /// Canonical (lowercase) provider key.
    pub key: &'static str,
    /// Human-readable provider name.
    pub display_name: &'static str,
    /// Environment variable holding this provider's API key. The generic
    /// credential variable is consulted as a fallback by the resolver.
    pub api_key_var: &'static str,
    /// Base URL, or a template containing `{resource}` for providers whose
    /// endpoint embeds a deployment resource name.
    base_url: &'static str,
    models: &'static [&'static str],
}

impl BuiltInProvider {
    /// Model identifiers this provider is known to serve, in declared case.
    pub fn models(&self) -> &'static [&'static str] {
        self.models
    }

    /// Find a known model matching `model` case-insensitively, returned in
    /// its declared case.
    pub fn stored_model(&self, model: &str) -> Option<&'static str> {
        let wanted = canonical_key(model);
        self.models
            .iter()
            .copied()
            .find(|m| canonical_key(m) == wanted)
    }

    /// Whether the base URL needs a resource name substituted in.
    pub fn requires_resource(&self) -> bool {
        self.base_url.contains(RESOURCE_TOKEN)
    }

    /// Produce the concrete base URL, substituting `resource` into the
    /// template when one is required. Returns `None` when a resource is
    /// required but absent.
    pub fn base_url(&self, resource: Option<&str>) -> Option<String> {
        if self.requires_resource() {
            let resource = resource?;
            if resource.is_empty() {
                return None;
            }
            Some(self.base_url.replace(RESOURCE_TOKEN, resource))
        } else {
            Some(self.base_url.to_string())
        }
    }
}

/// The built-in catalog. Order is the display order for listings.
static BUILT_IN_PROVIDERS: &[BuiltInProvider] = &[
    BuiltInProvider {
        key: "openai",
        display_name: "OpenAI",
        api_key_var: "OPENAI_API_KEY",
        base_url: "https://api.openai.com/v1",
        models: &["gpt-4o", "gpt-4o-mini", "gpt-4.1", "gpt-4.1-mini", "o3-mini"],
    },
    BuiltInProvider {
        key: "azure",
        display_name: "Azure OpenAI",
        api_key_var: "AZURE_OPENAI_API_KEY",
        base_url: "https://{resource}.openai.azure.com/openai",
        models: &["gpt-4o", "gpt-4o-mini", "gpt-35-turbo"],
    },
    BuiltInProvider {
        key: "anthropic",
        display_name: "Anthropic",
        api_key_var: "ANTHROPIC_API_KEY",
        base_url: "https://api.anthropic.com/v1",
        models: &[
            "claude-sonnet-4-20250514",
            "claude-opus-4-20250514",
            "claude-3-5-haiku-20241022",
        ],
    },
    BuiltInProvider {
        key: "google",
        display_name: "Google",
        api_key_var: "GOOGLE_API_KEY",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
        models: &["gemini-pro", "gemini-1.5-pro", "gemini-2.0-flash"],
    },
];

/// The full catalog, in display order.
pub fn built_in_providers() -> &'static [BuiltInProvider] {
    BUILT_IN_PROVIDERS
}

/// Look up a built-in provider by key, case-insensitively.
pub fn find_built_in(provider: &str) -> Option<&'static BuiltInProvider> {
    let wanted = canonical_key(provider);
    BUILT_IN_PROVIDERS.iter().find(|p| p.key == wanted)
}

/// Whether `provider` names a built-in provider.
pub fn is_built_in_provider(provider: &str) -> bool {
    find_built_in(provider).is_some()
}

/// All built-in provider keys, in catalog order.
pub fn built_in_provider_names() -> Vec<&'static str> {
    BUILT_IN_PROVIDERS.iter().map(|p| p.key).collect()
}

/// Models for a built-in provider, in declared case. Empty if unknown.
pub fn models_for_built_in_provider(provider: &str) -> Vec<&'static str> {
    find_built_in(provider)
        .map(|p| p.models().to_vec())
        .unwrap_or_default()
}
