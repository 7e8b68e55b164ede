//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use powerscore_config::ConfigError;
use powerscore_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const ANALYSIS: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the analysis backend at {url}")]
    #[diagnostic(
        code(powerscore::connection_failed),
        help(
            "Check your network connection and the backend URL.\n\
             Try: powerscore --env stage analyze <url>"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Analysis timed out after {seconds}s")]
    #[diagnostic(
        code(powerscore::timeout),
        help(
            "Large sites can take several minutes. Raise the polling budgets \
             in the config file or retry later."
        )
    )]
    Timeout { seconds: u64 },

    // ── Analysis ─────────────────────────────────────────────────────
    #[error("Analysis incomplete: {failed}")]
    #[diagnostic(
        code(powerscore::analysis_incomplete),
        help("Partial results were printed. Retry with --force to start a fresh analysis.")
    )]
    AnalysisIncomplete { failed: String },

    #[error("Analysis interrupted")]
    #[diagnostic(code(powerscore::interrupted))]
    Interrupted,

    #[error("Backend error: {message}")]
    #[diagnostic(code(powerscore::api_error))]
    Api { message: String, status: Option<u16> },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(powerscore::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(powerscore::config_exists),
        help("Use `powerscore config init --force` to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(powerscore::config),
        help("Run `powerscore config show` to inspect the resolved configuration.")
    )]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    #[diagnostic(code(powerscore::internal))]
    Internal(String),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AnalysisIncomplete { .. } => exit_code::ANALYSIS,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Data(error) => CliError::AnalysisIncomplete {
                failed: error.to_string(),
            },

            CoreError::SessionClosed { data_types } => CliError::AnalysisIncomplete {
                failed: format!("session closed before {data_types} resolved"),
            },

            CoreError::Api { message, status } => CliError::Api { message, status },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::InvalidParameter { name, value } => CliError::Validation {
                field: name,
                reason: format!("{value:?} is not a number"),
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
