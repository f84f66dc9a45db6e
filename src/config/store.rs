//! Configuration document persistence.
//!
//! Discovery, parsing, and write-back live here so the engine itself never
//! owns file lifetime. Load failures are typed: the startup flow switches on
//! [`StoreError::NotFound`] to enter its environment-variable fallback, and
//! treats every other variant as fatal.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::cli::paths::candidate_paths;
use crate::config::ConfigFile;
use crate::validate::{validate_config_file, ValidationReport};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no configuration file found; searched: {searched}")]
    NotFound { searched: String },

    #[error("failed to read {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A discovered, parsed, and structurally validated document.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: ConfigFile,
    pub validation: ValidationReport,
    pub file_path: PathBuf,
}

/// The persistence collaborator the startup flow and commands depend on.
/// Trait-shaped so tests can inject in-memory documents.
pub trait ConfigSource {
    fn discover_and_load(&self) -> Result<LoadedConfig, StoreError>;
    fn save(&self, config: &ConfigFile, path: &Path) -> Result<(), StoreError>;
}

/// File-backed source: an explicit `--config` path, or the standard
/// discovery order from [`candidate_paths`].
pub struct FileConfigSource {
    explicit: Option<PathBuf>,
}

impl FileConfigSource {
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }
}

impl ConfigSource for FileConfigSource {
    fn discover_and_load(&self) -> Result<LoadedConfig, StoreError> {
        let candidates = candidate_paths(self.explicit.as_deref());

        let path = candidates
            .iter()
            .find(|p| p.exists())
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                searched: candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        debug!(path = %path.display(), "loading configuration file");

        let content = std::fs::read_to_string(&path).map_err(|source| StoreError::Unreadable {
            path: path.clone(),
            source,
        })?;

        let config = parse_document(&path, &content)?;
        let validation = validate_config_file(&config);

        Ok(LoadedConfig {
            config,
            validation,
            file_path: path,
        })
    }

    fn save(&self, config: &ConfigFile, path: &Path) -> Result<(), StoreError> {
        let content = serialize_document(path, config)?;
        std::fs::write(path, content).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "saved configuration file");
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

fn parse_document(path: &Path, content: &str) -> Result<ConfigFile, StoreError> {
    let parsed = if is_json(path) {
        serde_json::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| StoreError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Serialize in the format the file was loaded in: yaml stays yaml, json
/// stays json.
fn serialize_document(path: &Path, config: &ConfigFile) -> Result<String, StoreError> {
    let serialized = if is_json(path) {
        serde_json::to_string_pretty(config).map_err(|e| e.to_string())
    } else {
        serde_yaml::to_string(config).map_err(|e| e.to_string())
    };
    serialized.map_err(|message| StoreError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
