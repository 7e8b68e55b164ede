// Wire types for the IO action backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope wrapping every action response: `{ statusCode, body, error }`.
///
/// Actions answer HTTP 200 even for some application failures, so
/// `statusCode` and `error` are inspected in addition to the transport
/// status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEnvelope {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ActionEnvelope {
    /// The application-level error message, if the action reported one.
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(obj)) => Some(
                obj.get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| Value::Object(obj.clone()).to_string(), str::to_owned),
            ),
            Some(other) => Some(other.to_string()),
        }
    }

    /// `true` when `statusCode` is absent or 200.
    pub fn is_ok(&self) -> bool {
        self.status_code.is_none_or(|s| s == 200)
    }
}

/// Body of `get-file-url.json`: a signed URL pointing at the result file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUrl {
    pub url: String,
}
