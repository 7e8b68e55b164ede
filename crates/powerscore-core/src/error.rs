// ── Core error types ──
//
// Two families live here. `DataError` is what travels on the bus: it is
// cheap to clone because one failure fans out to many registrations.
// `CoreError` is the user-facing error for everything else (session
// setup, configuration, awaiting results). Transport-layer errors from
// `powerscore_api` are translated into both.

use std::time::Duration;

use thiserror::Error;

use crate::data_type::DataType;

// ── Bus errors ───────────────────────────────────────────────────────

/// Failure category of a published [`DataError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DataErrorKind {
    /// Network failure talking to the backend.
    Transport,
    /// Non-2xx answer or an application-level error field.
    Backend,
    /// A polled action exceeded its maximum wait.
    Timeout,
    /// Malformed input to a derivation step or undecodable payload.
    Derivation,
}

/// A failure published for one [`DataType`].
///
/// `data_type` names where the failure originated. When a derivation
/// step propagates an upstream failure to its own outputs it republishes
/// the same error, so consumers always see the root cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{data_type} failed ({kind}): {message}")]
pub struct DataError {
    pub data_type: DataType,
    pub kind: DataErrorKind,
    pub message: String,
}

impl DataError {
    pub fn new(data_type: DataType, kind: DataErrorKind, message: impl Into<String>) -> Self {
        Self {
            data_type,
            kind,
            message: message.into(),
        }
    }

    pub fn transport(data_type: DataType, message: impl Into<String>) -> Self {
        Self::new(data_type, DataErrorKind::Transport, message)
    }

    pub fn backend(data_type: DataType, message: impl Into<String>) -> Self {
        Self::new(data_type, DataErrorKind::Backend, message)
    }

    pub fn derivation(data_type: DataType, message: impl Into<String>) -> Self {
        Self::new(data_type, DataErrorKind::Derivation, message)
    }

    /// A polled action ran past its budget.
    pub fn timeout(data_type: DataType, max_wait: Duration) -> Self {
        Self::new(
            data_type,
            DataErrorKind::Timeout,
            format!(
                "action {data_type} exceeded max allowed time of {}s",
                max_wait.as_secs()
            ),
        )
    }

    /// Translate a transport-layer error raised while producing `data_type`.
    pub fn from_api(data_type: DataType, err: &powerscore_api::Error) -> Self {
        match err {
            powerscore_api::Error::Transport(_)
            | powerscore_api::Error::InvalidUrl(_)
            | powerscore_api::Error::Timeout { .. } => Self::transport(data_type, err.to_string()),
            powerscore_api::Error::Status { .. } | powerscore_api::Error::Action { .. } => {
                Self::backend(data_type, err.to_string())
            }
            powerscore_api::Error::Deserialization { .. } => {
                Self::derivation(data_type, err.to_string())
            }
        }
    }
}

// ── Core errors ──────────────────────────────────────────────────────

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach analysis backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Analysis backend timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Session was closed before {data_types} resolved")]
    SessionClosed { data_types: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value {value:?} for calculator parameter {name}")]
    InvalidParameter { name: String, value: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<powerscore_api::Error> for CoreError {
    fn from(err: powerscore_api::Error) -> Self {
        match err {
            powerscore_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            powerscore_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            powerscore_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            powerscore_api::Error::Status { status, path } => CoreError::Api {
                message: format!("action {path} failed"),
                status: Some(status),
            },
            powerscore_api::Error::Action { message, status } => CoreError::Api { message, status },
            powerscore_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
