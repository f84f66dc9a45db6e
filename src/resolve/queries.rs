//! Pure, side-effect-free lookups over the document and built-in catalog.
//!
//! Provider and model keys match case-insensitively through the single
//! [`canonical_key`](crate::config::canonical_key) helper; configuration
//! names match exactly.

use crate::config::{keys_match, ConfigEntry, ConfigFile, Provider};
use crate::registry;

/// First configuration entry with this exact name, in document order.
pub fn find_configuration_by_name<'a>(
    name: &str,
    config: &'a ConfigFile,
) -> Option<&'a ConfigEntry> {
    config
        .entries()
        .find(|e| e.name.as_deref() == Some(name))
}

/// First declared provider matching `name` case-insensitively.
pub fn find_provider_by_name<'a>(name: &str, config: &'a ConfigFile) -> Option<&'a Provider> {
    config
        .declared_providers()
        .find(|p| p.provider.as_deref().is_some_and(|n| keys_match(n, name)))
}

/// All configuration names, flattened across groups in document order.
pub fn all_configuration_names(config: &ConfigFile) -> Vec<String> {
    config
        .config_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// All declared provider names in document order.
pub fn all_provider_names(config: &ConfigFile) -> Vec<String> {
    config
        .provider_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Models a declared provider supports, in stored case.
pub fn models_for_provider(provider: &str, config: &ConfigFile) -> Vec<String> {
    find_provider_by_name(provider, config)
        .and_then(|p| p.env.as_ref())
        .map(|env| env.model_names().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Models a built-in provider is known to serve.
pub fn models_for_built_in_provider(provider: &str) -> Vec<String> {
    registry::models_for_built_in_provider(provider)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// The entry the authoritative default points at, if both exist.
pub fn current_default_configuration(config: &ConfigFile) -> Option<&ConfigEntry> {
    find_configuration_by_name(config.default_name()?, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::testcfg::single_entry;

    #[test]
    fn test_find_configuration_name_is_exact() {
        let cfg = single_entry();
        assert!(find_configuration_by_name("a", &cfg).is_some());
        assert!(find_configuration_by_name("A", &cfg).is_none());
    }

    #[test]
    fn test_find_provider_is_case_insensitive() {
        let cfg = single_entry();
        let provider = find_provider_by_name("P", &cfg).unwrap();
        assert_eq!(provider.provider.as_deref(), Some("p"));
    }

    #[test]
    fn test_name_listings() {
        let cfg = single_entry();
        assert_eq!(all_configuration_names(&cfg), vec!["a"]);
        assert_eq!(all_provider_names(&cfg), vec!["p"]);
        assert_eq!(models_for_provider("P", &cfg), vec!["m"]);
        assert!(models_for_provider("missing", &cfg).is_empty());
    }

    #[test]
    fn test_current_default_configuration() {
        let mut cfg = single_entry();
        assert!(current_default_configuration(&cfg).is_none());
        cfg = crate::resolve::set_default_configuration("a", &cfg).unwrap();
        let entry = current_default_configuration(&cfg).unwrap();
        assert_eq!(entry.model.as_deref(), Some("m"));
    }
}
