//! Shared configuration for the power score tools.
//!
//! TOML config with environment overrides, platform path resolution,
//! translation to `powerscore_core::RuntimeConfig`, and the file-backed
//! session cache used between runs.

mod session_cache;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use powerscore_api::Environment;
use powerscore_core::{DerivationConfig, PollPolicies, PollPolicy, RuntimeConfig};

pub use session_cache::FileSessionCache;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Which analysis backend to talk to.
    #[serde(default)]
    pub endpoint: Endpoint,

    /// Poll cadence for the long-running actions.
    #[serde(default)]
    pub polling: Polling,

    #[serde(default)]
    pub sampling: Sampling,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Endpoint {
    /// `prod` or `stage`.
    #[serde(default)]
    pub environment: Environment,

    /// Overrides the environment's URL (e.g. a local action server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Endpoint {
    /// The action namespace URL this endpoint resolves to.
    pub fn resolve(&self) -> Result<url::Url, ConfigError> {
        match &self.base_url {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Validation {
                field: "endpoint.base_url".into(),
                reason: format!("invalid URL: {raw}"),
            }),
            None => Ok(self.environment.base_url()),
        }
    }
}

/// Interval and budget of one polled action, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollSettings {
    pub interval_secs: u64,
    pub max_wait_secs: u64,
}

impl PollSettings {
    fn from_policy(policy: PollPolicy) -> Self {
        Self {
            interval_secs: policy.interval.as_secs(),
            max_wait_secs: policy.max_wait.as_secs(),
        }
    }

    fn to_policy(self, field: &str) -> Result<PollPolicy, ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: format!("polling.{field}.interval_secs"),
                reason: "must be at least 1".into(),
            });
        }
        Ok(PollPolicy::from_secs(self.interval_secs, self.max_wait_secs))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Polling {
    pub sitemap: PollSettings,
    pub psi: PollSettings,
    pub templates: PollSettings,
}

impl Default for Polling {
    fn default() -> Self {
        let policies = PollPolicies::default();
        Self {
            sitemap: PollSettings::from_policy(policies.sitemap),
            psi: PollSettings::from_policy(policies.psi),
            templates: PollSettings::from_policy(policies.templates),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Sampling {
    /// How many page URLs to send to the template analysis.
    #[serde(default = "default_target_url_count")]
    pub target_url_count: usize,

    /// Fixed seed for reproducible sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            target_url_count: default_target_url_count(),
            seed: None,
        }
    }
}

fn default_target_url_count() -> usize {
    powerscore_core::derive::DEFAULT_TARGET_URL_COUNT
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "powerscore", "powerscore")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("powerscore");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where the last analysis session is remembered.
pub fn session_cache_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("session.json"),
        |dirs| dirs.cache_dir().join("session.json"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `POWERSCORE_*` variables
/// (`__` separates sections, e.g. `POWERSCORE_DEFAULTS__TIMEOUT`).
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("POWERSCORE_").split("__"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Build the core runtime config. No CLI overrides applied here.
    pub fn to_runtime_config(&self) -> Result<RuntimeConfig, ConfigError> {
        if self.defaults.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "defaults.timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        if self.sampling.target_url_count == 0 {
            return Err(ConfigError::Validation {
                field: "sampling.target_url_count".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(RuntimeConfig {
            base_url: self.endpoint.resolve()?,
            timeout: Duration::from_secs(self.defaults.timeout),
            polling: PollPolicies {
                sitemap: self.polling.sitemap.to_policy("sitemap")?,
                psi: self.polling.psi.to_policy("psi")?,
                templates: self.polling.templates.to_policy("templates")?,
            },
            derivation: DerivationConfig {
                target_url_count: self.sampling.target_url_count,
                sampling_seed: self.sampling.seed,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_targets_prod() {
        let runtime = Config::default().to_runtime_config().unwrap();
        assert_eq!(runtime.base_url, Environment::Prod.base_url());
        assert_eq!(runtime.timeout, Duration::from_secs(30));
        assert_eq!(runtime.polling, PollPolicies::default());
        assert_eq!(runtime.derivation, DerivationConfig::default());
    }

    #[test]
    fn base_url_override_wins_over_environment() {
        let mut config = Config::default();
        config.endpoint.environment = Environment::Stage;
        config.endpoint.base_url = Some("http://localhost:9080/api/v1/web/powerscore".into());
        let runtime = config.to_runtime_config().unwrap();
        assert_eq!(runtime.base_url.host_str(), Some("localhost"));
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        config.endpoint.base_url = Some("not a url".into());
        assert!(matches!(
            config.to_runtime_config(),
            Err(ConfigError::Validation { field, .. }) if field == "endpoint.base_url"
        ));

        let mut config = Config::default();
        config.polling.psi.interval_secs = 0;
        assert!(matches!(
            config.to_runtime_config(),
            Err(ConfigError::Validation { field, .. }) if field == "polling.psi.interval_secs"
        ));

        let mut config = Config::default();
        config.defaults.timeout = 0;
        assert!(config.to_runtime_config().is_err());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [endpoint]
                environment = "stage"

                [polling.psi]
                interval_secs = 5
                max_wait_secs = 60
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.endpoint.environment, Environment::Stage);
        assert_eq!(config.polling.psi, PollSettings { interval_secs: 5, max_wait_secs: 60 });
        assert_eq!(config.polling.sitemap, Polling::default().sitemap);
        assert_eq!(config.defaults.output, "table");
    }

    #[test]
    fn config_path_ends_in_toml() {
        assert!(config_path().ends_with("config.toml"));
        assert!(session_cache_path().ends_with("session.json"));
    }
}
