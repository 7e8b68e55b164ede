// IO action HTTP client
//
// Wraps `reqwest::Client` with action URL construction and envelope
// unwrapping. Single-shot actions return their `body`; long-running
// actions are triggered here and their result files fetched, while the
// polling cadence lives in `powerscore-core`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::io::models::{ActionEnvelope, FileUrl};
use crate::transport::TransportConfig;

const PROD_BASE_URL: &str = "https://316182-301graysole.adobeioruntime.net/api/v1/web/powerscore";
const STAGE_BASE_URL: &str =
    "https://316182-301graysole-stage.adobeioruntime.net/api/v1/web/powerscore";

/// Which deployment of the action backend to talk to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    #[default]
    Prod,
    Stage,
}

impl Environment {
    /// Root URL under which every action is addressed.
    pub fn base_url(self) -> Url {
        let raw = match self {
            Self::Prod => PROD_BASE_URL,
            Self::Stage => STAGE_BASE_URL,
        };
        Url::parse(raw).expect("static base URL is valid")
    }
}

/// Raw HTTP client for the IO action backend.
///
/// All methods return the unwrapped `body` payload; the envelope is
/// stripped before the caller sees it. Cloning shares the underlying
/// connection pool.
#[derive(Clone)]
pub struct IoClient {
    http: reqwest::Client,
    base_url: Url,
}

impl IoClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The action base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{path}`, tolerating slashes on either side.
    pub(crate) fn action_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    fn file_url(&self, endpoint: &str, file_name: &str) -> Result<Url, Error> {
        let mut url = self.action_url(endpoint)?;
        url.query_pairs_mut().append_pair("fileName", file_name);
        Ok(url)
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// POST a JSON body to a single-shot action and return its `body`.
    pub async fn invoke_action(&self, path: &str, body: &impl Serialize) -> Result<Value, Error> {
        let url = self.action_url(path)?;
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                path: path.to_owned(),
            });
        }

        let envelope = parse_envelope(resp).await?;
        if let Some(message) = envelope.error_message() {
            return Err(Error::Action {
                message,
                status: envelope.status_code,
            });
        }
        if !envelope.is_ok() {
            return Err(Error::Action {
                message: format!("action {path} reported status {:?}", envelope.status_code),
                status: envelope.status_code,
            });
        }
        Ok(envelope.body)
    }

    /// Kick off a long-running action that writes its result to `file_name`.
    ///
    /// The action body is the caller's object extended with `actionName`
    /// and `fileName`. Non-object bodies are replaced by those two keys.
    pub async fn trigger_action(
        &self,
        action_name: &str,
        file_name: &str,
        body: &Value,
    ) -> Result<(), Error> {
        let url = self.action_url("trigger-action.json")?;
        debug!(action = action_name, file = file_name, "POST {}", url);

        let mut payload = match body {
            Value::Object(obj) => obj.clone(),
            _ => Map::new(),
        };
        payload.insert("actionName".into(), Value::String(action_name.into()));
        payload.insert("fileName".into(), Value::String(file_name.into()));

        let resp = self.http.post(url).json(&payload).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Status {
                status: status.as_u16(),
                path: "trigger-action.json".into(),
            })
        }
    }

    // ── Result files ─────────────────────────────────────────────────

    /// Fetch a result file. `Ok(None)` means "not written yet".
    ///
    /// A non-2xx answer from `get-file.json` falls back to
    /// [`get_file_url`](Self::get_file_url), which serves large files
    /// through a signed URL.
    pub async fn get_file(&self, file_name: &str) -> Result<Option<Value>, Error> {
        let url = self.file_url("get-file.json", file_name)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return self.get_file_url(file_name).await;
        }

        let envelope = parse_envelope(resp).await?;
        Ok((envelope.status_code == Some(200)).then_some(envelope.body))
    }

    /// Resolve a signed URL for a result file and download it.
    pub async fn get_file_url(&self, file_name: &str) -> Result<Option<Value>, Error> {
        let url = self.file_url("get-file-url.json", file_name)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Ok(None);
        }

        let envelope = parse_envelope(resp).await?;
        if envelope.status_code != Some(200) {
            return Ok(None);
        }

        let file: FileUrl =
            serde_json::from_value(envelope.body.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: envelope.body.to_string(),
            })?;
        let signed = Url::parse(&file.url)?;
        debug!("GET {}", signed);

        let file_resp = self.http.get(signed).send().await?;
        if !file_resp.status().is_success() {
            return Ok(None);
        }
        let text = file_resp.text().await?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: text,
            })
    }
}

/// Decode the `{ statusCode, body, error }` envelope.
async fn parse_envelope(resp: reqwest::Response) -> Result<ActionEnvelope, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}
