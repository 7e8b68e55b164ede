//! Clap derive structures for the `powerscore` CLI.
//!
//! Kept free of crate-internal imports: `build.rs` includes this file
//! directly to render man pages and completions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// powerscore -- estimate how hard a website is to migrate
#[derive(Debug, Parser)]
#[command(
    name = "powerscore",
    version,
    about = "Estimate the migration complexity of a website",
    long_about = "Runs the power score analysis against a live website: sitemap, \
        templates, traffic, CDN and Lighthouse data are collected by the \
        analysis backend and combined into code, import and site complexity \
        scores.\n\n\
        `calculate` computes the same scores offline from hand-entered values.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "POWERSCORE_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend deployment
    #[arg(long = "env", env = "POWERSCORE_ENV", global = true)]
    pub environment: Option<BackendEnv>,

    /// Action namespace URL (overrides --env)
    #[arg(long, env = "POWERSCORE_BASE_URL", global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "POWERSCORE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "POWERSCORE_TIMEOUT", global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

// ── Output, Color & Backend Enums ────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// The overall score only (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendEnv {
    /// Production actions
    Prod,
    /// Staging actions
    Stage,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a live website
    #[command(alias = "a")]
    Analyze(AnalyzeArgs),

    /// Compute scores from hand-entered site characteristics
    #[command(alias = "calc")]
    Calculate(CalculateArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Analyze ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Website to analyze (scheme optional, https assumed)
    pub url: String,

    /// Start a fresh backend analysis even if one is cached
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Neither read nor write the session cache
    #[arg(long)]
    pub no_cache: bool,

    /// Also print the calculator query that reproduces the result
    #[arg(long)]
    pub link: bool,
}

// ── Calculate ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CalculateArgs {
    /// Calculator query string or fragment, e.g. "pages=400&layouts=10"
    #[arg(long, value_name = "QUERY")]
    pub query: Option<String>,

    /// Number of pages
    #[arg(long)]
    pub pages: Option<u64>,

    /// Number of languages
    #[arg(long)]
    pub langs: Option<u64>,

    /// Number of distinct page layouts
    #[arg(long)]
    pub layouts: Option<u32>,

    /// Average blocks per page
    #[arg(long)]
    pub blocks: Option<f64>,

    /// Global popularity rank
    #[arg(long)]
    pub traffic_rank: Option<u64>,

    /// CDN id (akamai, cloudfront, azure, wpengine, adobe, fastly, cloudflare)
    #[arg(long)]
    pub cdn: Option<String>,

    /// Site has forms
    #[arg(long)]
    pub forms: bool,

    /// Site has commerce
    #[arg(long)]
    pub commerce: bool,

    /// Site has authentication
    #[arg(long, alias = "auth")]
    pub authentication: bool,

    /// Lighthouse mobile performance, 0.0 to 1.0
    #[arg(long)]
    pub mobile_perf: Option<f64>,

    /// Customer complexity slider, 0 to 100
    #[arg(long)]
    pub customer_complexity: Option<f64>,

    /// Customer urgency slider, 0 to 100
    #[arg(long)]
    pub customer_urgency: Option<f64>,

    /// Also print the calculator query for these inputs
    #[arg(long)]
    pub link: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with the default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
