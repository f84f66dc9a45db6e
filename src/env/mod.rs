//! Process-environment collaborator.
//!
//! Resolution computes an [`ActivationEnv`] value; this module is the only
//! place that writes it into the real process environment. Keeping the write
//! behind [`ActivationEnv::apply`] lets validate-only callers run the exact
//! same resolution without touching shared state.

use url::Url;

use crate::validate::ValidationReport;

/// Variable carrying the activated API key. Also the generic fallback
/// credential for built-in providers without a provider-specific key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Variable carrying the activated base URL.
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
/// Variable carrying the activated model.
pub const MODEL_VAR: &str = "OPENAI_MODEL";
/// Azure deployment resource name, substituted into the azure URL template.
pub const AZURE_RESOURCE_VAR: &str = "AZURE_RESOURCE_NAME";

/// Remediation text shown when the environment fallback is incomplete.
pub const REMEDIATION: &str = "\
export OPENAI_API_KEY=sk-...\n\
export OPENAI_BASE_URL=https://api.openai.com/v1\n\
export OPENAI_MODEL=gpt-4o";

/// The concrete credential/endpoint/model triple a resolution produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationEnv {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ActivationEnv {
    /// Write the triple into the process environment. Last writer wins; the
    /// three writes are not atomic.
    pub fn apply(&self) {
        std::env::set_var(API_KEY_VAR, &self.api_key);
        std::env::set_var(BASE_URL_VAR, &self.base_url);
        std::env::set_var(MODEL_VAR, &self.model);
        tracing::debug!(
            model = %self.model,
            base_url = %self.base_url,
            "activated environment"
        );
    }

    /// Read the triple back from the process environment, if all three
    /// variables are present and non-empty.
    pub fn from_process() -> Option<Self> {
        Some(Self {
            api_key: read_var(API_KEY_VAR)?,
            base_url: read_var(BASE_URL_VAR)?,
            model: read_var(MODEL_VAR)?,
        })
    }
}

/// Read an environment variable, treating absent and blank as the same.
pub fn read_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Check the live triple: each variable present, non-empty, and the base URL
/// well-formed. Each defect names the exact variable.
pub fn validate_environment_variables() -> ValidationReport {
    let mut report = ValidationReport::new();

    if read_var(API_KEY_VAR).is_none() {
        report.add_error(format!("{} is not set or empty", API_KEY_VAR));
    }

    match read_var(BASE_URL_VAR) {
        None => report.add_error(format!("{} is not set or empty", BASE_URL_VAR)),
        Some(raw) => {
            if Url::parse(&raw).is_err() {
                report.add_error(format!("{} ('{}') is not a valid URL", BASE_URL_VAR, raw));
            }
        }
    }

    if read_var(MODEL_VAR).is_none() {
        report.add_error(format!("{} is not set or empty", MODEL_VAR));
    }

    report
}
