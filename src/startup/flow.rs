//! The startup state machine.
//!
//! Sequences discovery, structural validation, default selection, resolution,
//! and environment activation:
//!
//! ```text
//! CheckingConfigFile -> CheckingDefaultConfig -> ValidatingDefaultConfig
//!     -> SettingEnvironment -> Ready
//! ```
//!
//! Any step can terminate in a [`StartupFailure`], which carries the step it
//! failed at, a short message, a details string, and an [`ExitClass`] the
//! binary maps to a process exit code.
//!
//! Only when discovery reports the typed [`StoreError::NotFound`] does the
//! flow take the environment-variable fallback path instead: if the
//! `OPENAI_API_KEY`/`OPENAI_BASE_URL`/`OPENAI_MODEL` triple is already live
//! and valid, the tool is ready without any configuration file. This keeps
//! containers and CI working where only environment injection is available.

use std::fmt;

use tracing::{debug, info};

use crate::config::{ConfigSource, LoadedConfig, StoreError};
use crate::env::{self, ActivationEnv};
use crate::resolve::resolve_configuration_by_name;

/// Where in the sequence the flow currently is, or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStep {
    CheckingConfigFile,
    CheckingDefaultConfig,
    ValidatingDefaultConfig,
    SettingEnvironment,
    Ready,
}

impl fmt::Display for StartupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartupStep::CheckingConfigFile => "checking configuration file",
            StartupStep::CheckingDefaultConfig => "checking default configuration",
            StartupStep::ValidatingDefaultConfig => "validating default configuration",
            StartupStep::SettingEnvironment => "setting environment",
            StartupStep::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Failure classification, distinct enough for the binary to pick an exit
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    FileNotFound,
    InvalidConfiguration,
    ValidationFailed,
    EnvironmentError,
    General,
}

impl ExitClass {
    /// Process exit code for this class.
    pub fn code(self) -> i32 {
        match self {
            ExitClass::General => 1,
            ExitClass::FileNotFound => 2,
            ExitClass::InvalidConfiguration => 3,
            ExitClass::ValidationFailed => 4,
            ExitClass::EnvironmentError => 5,
        }
    }
}

/// A terminal startup failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupFailure {
    pub step: StartupStep,
    pub message: String,
    pub details: String,
    pub class: ExitClass,
}

impl fmt::Display for StartupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (while {})", self.message, self.step)?;
        if !self.details.is_empty() {
            write!(f, "\n{}", self.details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StartupFailure {}

/// Whether the flow commits the environment side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupMode {
    /// Resolve and write the triple into the process environment.
    Execute,
    /// Resolve with the side effect suppressed; mutates nothing.
    ValidateOnly,
}

/// Terminal success.
#[derive(Debug)]
pub struct StartupOutcome {
    /// The triple that is live (Execute) or would be (ValidateOnly).
    pub environment: ActivationEnv,
    /// The loaded document, absent on the environment fallback path.
    pub loaded: Option<LoadedConfig>,
    /// Whether readiness came from environment variables alone.
    pub used_environment_fallback: bool,
}

/// Run the startup sequence against a persistence collaborator.
pub fn run_startup(
    mode: StartupMode,
    source: &dyn ConfigSource,
) -> Result<StartupOutcome, StartupFailure> {
    // CheckingConfigFile
    debug!("startup: {}", StartupStep::CheckingConfigFile);
    let loaded = match source.discover_and_load() {
        Ok(loaded) => loaded,
        Err(StoreError::NotFound { searched }) => {
            info!("no configuration file found, trying environment variables");
            return environment_fallback(&searched);
        }
        Err(err) => {
            let class = match err {
                StoreError::Parse { .. } => ExitClass::InvalidConfiguration,
                _ => ExitClass::General,
            };
            return Err(StartupFailure {
                step: StartupStep::CheckingConfigFile,
                message: "failed to load configuration file".to_string(),
                details: err.to_string(),
                class,
            });
        }
    };

    if !loaded.validation.is_valid() {
        return Err(StartupFailure {
            step: StartupStep::CheckingConfigFile,
            message: format!(
                "configuration file {} is invalid",
                loaded.file_path.display()
            ),
            details: loaded.validation.errors.join("\n"),
            class: ExitClass::ValidationFailed,
        });
    }

    // CheckingDefaultConfig
    debug!("startup: {}", StartupStep::CheckingDefaultConfig);
    let default_name = match loaded.config.default_name() {
        Some(name) => name.to_string(),
        None => {
            return Err(StartupFailure {
                step: StartupStep::CheckingDefaultConfig,
                message: "no default configuration declared".to_string(),
                details: format!(
                    "pick one with 'llmctl use <name>'; known configurations: {}",
                    join_or_none(&loaded.config.config_names())
                ),
                class: ExitClass::InvalidConfiguration,
            });
        }
    };

    // ValidatingDefaultConfig
    debug!("startup: {}", StartupStep::ValidatingDefaultConfig);
    let apply = mode == StartupMode::Execute;
    let resolution = resolve_configuration_by_name(&default_name, &loaded.config, apply)
        .map_err(|err| StartupFailure {
            step: StartupStep::ValidatingDefaultConfig,
            message: format!("cannot resolve default configuration '{}'", default_name),
            details: err.to_string(),
            class: ExitClass::ValidationFailed,
        })?;

    // SettingEnvironment: re-validate what is actually observable, to catch
    // inconsistency between what the resolver believed it set and the live
    // environment. Execute variant only.
    if apply {
        debug!("startup: {}", StartupStep::SettingEnvironment);
        let report = env::validate_environment_variables();
        if !report.is_valid() {
            return Err(StartupFailure {
                step: StartupStep::SettingEnvironment,
                message: "environment variables are invalid after activation".to_string(),
                details: report.errors.join("\n"),
                class: ExitClass::EnvironmentError,
            });
        }
    }

    debug!("startup: {}", StartupStep::Ready);
    info!(
        configuration = %default_name,
        model = %resolution.environment.model,
        "startup ready"
    );

    Ok(StartupOutcome {
        environment: resolution.environment,
        loaded: Some(loaded),
        used_environment_fallback: false,
    })
}

/// The fallback path: readiness from the live triple alone. A failure
/// enumerates exactly which variables are missing or invalid, never a
/// generic message.
fn environment_fallback(searched: &str) -> Result<StartupOutcome, StartupFailure> {
    let report = env::validate_environment_variables();
    if !report.is_valid() {
        return Err(StartupFailure {
            step: StartupStep::CheckingConfigFile,
            message: "no configuration file found and the environment is incomplete".to_string(),
            details: format!(
                "searched: {}\n{}\n\nto run without a configuration file, set:\n{}",
                searched,
                report.errors.join("\n"),
                env::REMEDIATION
            ),
            class: ExitClass::FileNotFound,
        });
    }

    let environment = ActivationEnv::from_process().ok_or_else(|| StartupFailure {
        step: StartupStep::CheckingConfigFile,
        message: "environment variables changed during startup".to_string(),
        details: String::new(),
        class: ExitClass::General,
    })?;

    debug!("startup: {}", StartupStep::Ready);
    info!(model = %environment.model, "ready from environment variables");

    Ok(StartupOutcome {
        environment,
        loaded: None,
        used_environment_fallback: true,
    })
}

fn join_or_none(names: &[&str]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use crate::env::testenv::EnvGuard;
    use crate::env::{API_KEY_VAR, BASE_URL_VAR, MODEL_VAR};
    use crate::validate::validate_config_file;
    use std::path::{Path, PathBuf};

    const TRIPLE: &[&str] = &[API_KEY_VAR, BASE_URL_VAR, MODEL_VAR];

    /// In-memory persistence collaborator for exercising the flow.
    enum MemorySource {
        NotFound,
        Unparseable,
        Document(ConfigFile),
        // Hands the document over with a clean report regardless of its
        // contents, the way a stale or buggy collaborator could.
        Unchecked(ConfigFile),
    }

    impl ConfigSource for MemorySource {
        fn discover_and_load(&self) -> Result<LoadedConfig, StoreError> {
            match self {
                MemorySource::NotFound => Err(StoreError::NotFound {
                    searched: "llmctl.yaml".to_string(),
                }),
                MemorySource::Unparseable => Err(StoreError::Parse {
                    path: PathBuf::from("llmctl.yaml"),
                    message: "bad document".to_string(),
                }),
                MemorySource::Document(config) => Ok(LoadedConfig {
                    validation: validate_config_file(config),
                    config: config.clone(),
                    file_path: PathBuf::from("llmctl.yaml"),
                }),
                MemorySource::Unchecked(config) => Ok(LoadedConfig {
                    validation: crate::validate::ValidationReport::new(),
                    config: config.clone(),
                    file_path: PathBuf::from("llmctl.yaml"),
                }),
            }
        }

        fn save(&self, _config: &ConfigFile, _path: &Path) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn document_with_default() -> ConfigFile {
        serde_yaml::from_str(
            r#"
default_config:
  - name: a
configs:
  - config:
      - name: a
        provider: p
        model: m
providers:
  - provider: p
    env:
      api_key: k
      base_url: https://x/v1
      models:
        - model: m
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_execute_reaches_ready_and_activates() {
        let _guard = EnvGuard::new(TRIPLE);
        let source = MemorySource::Document(document_with_default());
        let outcome = run_startup(StartupMode::Execute, &source).unwrap();
        assert!(!outcome.used_environment_fallback);
        assert_eq!(outcome.environment.model, "m");
        assert_eq!(crate::env::read_var(MODEL_VAR).as_deref(), Some("m"));
    }

    #[test]
    fn test_validate_only_mutates_nothing() {
        let _guard = EnvGuard::new(TRIPLE);
        let source = MemorySource::Document(document_with_default());
        let outcome = run_startup(StartupMode::ValidateOnly, &source).unwrap();
        assert_eq!(outcome.environment.api_key, "k");
        assert_eq!(crate::env::read_var(API_KEY_VAR), None);
    }

    #[test]
    fn test_missing_default_is_invalid_configuration() {
        let mut config = document_with_default();
        config.default_config = None;
        let source = MemorySource::Document(config);
        let failure = run_startup(StartupMode::ValidateOnly, &source).unwrap_err();
        assert_eq!(failure.step, StartupStep::CheckingDefaultConfig);
        assert_eq!(failure.class, ExitClass::InvalidConfiguration);
        assert!(failure.details.contains("known configurations: a"));
    }

    #[test]
    fn test_structural_failure_is_validation_failed() {
        let mut config = document_with_default();
        config.providers = Some(Vec::new());
        let source = MemorySource::Document(config);
        let failure = run_startup(StartupMode::ValidateOnly, &source).unwrap_err();
        assert_eq!(failure.step, StartupStep::CheckingConfigFile);
        assert_eq!(failure.class, ExitClass::ValidationFailed);
    }

    #[test]
    fn test_dangling_default_caught_before_resolution() {
        // A default pointing at a nonexistent entry is a structural defect,
        // so the flow stops at the file check rather than the resolver.
        let mut config = document_with_default();
        config.default_config = Some(vec![crate::config::DefaultConfig {
            name: Some("ghost".to_string()),
        }]);
        let source = MemorySource::Document(config);
        let failure = run_startup(StartupMode::ValidateOnly, &source).unwrap_err();
        assert_eq!(failure.step, StartupStep::CheckingConfigFile);
        assert_eq!(failure.class, ExitClass::ValidationFailed);
        assert!(failure.details.contains("'ghost'"));
    }

    #[test]
    fn test_live_environment_recheck_is_environment_error() {
        // The resolver believes it set a usable triple, but what lands in
        // the live environment is a malformed base URL; the re-check after
        // activation must fail in its own class, distinct from resolution.
        let _guard = EnvGuard::new(TRIPLE);
        let mut config = document_with_default();
        config.providers.as_mut().unwrap()[0]
            .env
            .as_mut()
            .unwrap()
            .base_url = Some("not a url".to_string());

        let source = MemorySource::Unchecked(config);
        let failure = run_startup(StartupMode::Execute, &source).unwrap_err();
        assert_eq!(failure.step, StartupStep::SettingEnvironment);
        assert_eq!(failure.class, ExitClass::EnvironmentError);
        assert!(failure.details.contains(BASE_URL_VAR));
    }

    #[test]
    fn test_not_found_with_valid_environment_is_ready() {
        let _guard = EnvGuard::new(TRIPLE);
        std::env::set_var(API_KEY_VAR, "k");
        std::env::set_var(BASE_URL_VAR, "https://x/v1");
        std::env::set_var(MODEL_VAR, "m");

        let outcome = run_startup(StartupMode::ValidateOnly, &MemorySource::NotFound).unwrap();
        assert!(outcome.used_environment_fallback);
        assert!(outcome.loaded.is_none());
        assert_eq!(outcome.environment.model, "m");
    }

    #[test]
    fn test_fallback_failure_enumerates_missing_variables() {
        let _guard = EnvGuard::new(TRIPLE);
        std::env::set_var(API_KEY_VAR, "k");

        let failure = run_startup(StartupMode::ValidateOnly, &MemorySource::NotFound).unwrap_err();
        assert_eq!(failure.class, ExitClass::FileNotFound);
        assert!(!failure.details.contains(&format!("{} is not set", API_KEY_VAR)));
        assert!(failure.details.contains(BASE_URL_VAR));
        assert!(failure.details.contains(MODEL_VAR));
        assert!(failure.details.contains("export OPENAI_API_KEY"));
    }

    #[test]
    fn test_other_discovery_errors_never_take_the_fallback() {
        let _guard = EnvGuard::new(TRIPLE);
        std::env::set_var(API_KEY_VAR, "k");
        std::env::set_var(BASE_URL_VAR, "https://x/v1");
        std::env::set_var(MODEL_VAR, "m");

        let failure = run_startup(StartupMode::ValidateOnly, &MemorySource::Unparseable).unwrap_err();
        assert_eq!(failure.step, StartupStep::CheckingConfigFile);
        assert_eq!(failure.class, ExitClass::InvalidConfiguration);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let classes = [
            ExitClass::General,
            ExitClass::FileNotFound,
            ExitClass::InvalidConfiguration,
            ExitClass::ValidationFailed,
            ExitClass::EnvironmentError,
        ];
        let mut codes: Vec<i32> = classes.iter().map(|c| c.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), classes.len());
    }
}
