//! Configuration file discovery paths.

use std::path::{Path, PathBuf};

/// Extensions tried at each location, in preference order.
const EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Paths searched for a configuration document, in order:
/// an explicit path (alone, when given), `./llmctl.{yaml,yml,json}`, then
/// `<config dir>/llmctl/config.{yaml,yml,json}`.
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for ext in EXTENSIONS {
            candidates.push(cwd.join(format!("llmctl.{}", ext)));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let base = config_dir.join("llmctl");
        for ext in EXTENSIONS {
            candidates.push(base.join(format!("config.{}", ext)));
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_short_circuits() {
        let explicit = PathBuf::from("/tmp/custom.yaml");
        let candidates = candidate_paths(Some(&explicit));
        assert_eq!(candidates, vec![explicit]);
    }

    #[test]
    fn test_discovery_order_prefers_cwd_yaml() {
        let candidates = candidate_paths(None);
        assert!(!candidates.is_empty());
        assert!(candidates[0].ends_with("llmctl.yaml"));
    }
}
