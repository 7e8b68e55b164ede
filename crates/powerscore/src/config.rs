//! CLI-side configuration: file + environment from `powerscore-config`,
//! with command-line flags applied on top.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use powerscore_api::Environment;
use powerscore_config::Config;
use powerscore_core::RuntimeConfig;

use crate::cli::{BackendEnv, ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Config file in effect: `--config`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(powerscore_config::config_path)
}

/// Load the config file (or defaults) and fold in the global flags.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = powerscore_config::load_config_from(&config_path(global))?;

    if let Some(env) = global.environment {
        cfg.endpoint.environment = match env {
            BackendEnv::Prod => Environment::Prod,
            BackendEnv::Stage => Environment::Stage,
        };
        // An explicit --env beats a base_url from the file.
        cfg.endpoint.base_url = None;
    }
    if let Some(base_url) = &global.base_url {
        cfg.endpoint.base_url = Some(base_url.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.defaults.timeout = timeout;
    }
    Ok(cfg)
}

/// Core runtime config with flags applied.
pub fn runtime_config(cfg: &Config) -> Result<RuntimeConfig, CliError> {
    Ok(cfg.to_runtime_config()?)
}

pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    match global.output {
        Some(format) => Ok(format),
        None => parse_setting("defaults.output", &cfg.defaults.output),
    }
}

pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> Result<ColorMode, CliError> {
    match global.color {
        Some(mode) => Ok(mode),
        None => parse_setting("defaults.color", &cfg.defaults.color),
    }
}

fn parse_setting<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Upper bound on a whole analysis: the slowest chain of polls plus a
/// few request round trips.
pub fn analysis_deadline(runtime: &RuntimeConfig) -> Duration {
    let polls = runtime.polling.sitemap.max_wait
        + runtime.polling.templates.max_wait.max(runtime.polling.psi.max_wait);
    polls + runtime.timeout * 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["powerscore"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["config", "show"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[defaults]\noutput = \"yaml\"\n[endpoint]\nbase_url = \"http://localhost:1/api\"\n",
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let opts = global(&["--config", path]);
        let cfg = load(&opts).unwrap();
        assert_eq!(output_format(&opts, &cfg).unwrap(), OutputFormat::Yaml);
        assert_eq!(
            runtime_config(&cfg).unwrap().base_url.as_str(),
            "http://localhost:1/api"
        );

        let opts = global(&["--config", path, "--env", "stage", "-o", "json", "--timeout", "5"]);
        let cfg = load(&opts).unwrap();
        assert_eq!(output_format(&opts, &cfg).unwrap(), OutputFormat::Json);
        let runtime = runtime_config(&cfg).unwrap();
        assert_eq!(runtime.base_url, Environment::Stage.base_url());
        assert_eq!(runtime.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_output_setting_is_a_usage_error() {
        let opts = global(&[]);
        let mut cfg = Config::default();
        cfg.defaults.color = "sometimes".into();
        let err = color_mode(&opts, &cfg).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "defaults.color"));
    }

    #[test]
    fn deadline_covers_polling_budgets() {
        let runtime = Config::default().to_runtime_config().unwrap();
        // 300 + max(600, 120) + 4 * 30
        assert_eq!(analysis_deadline(&runtime), Duration::from_secs(1020));
    }
}
