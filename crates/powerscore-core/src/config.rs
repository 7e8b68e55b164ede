// ── Runtime analysis configuration ──
//
// Describes where the analysis backend lives and how long to wait for
// it. Core never reads config files; the CLI builds a `RuntimeConfig`
// and hands it in.

use std::time::Duration;

use url::Url;

use crate::derive::DerivationConfig;

/// Interval and budget for one polled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Time between result checks.
    pub interval: Duration,
    /// Total wait before the action is failed with a timeout.
    pub max_wait: Duration,
}

impl PollPolicy {
    pub const fn from_secs(interval_secs: u64, max_wait_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            max_wait: Duration::from_secs(max_wait_secs),
        }
    }

    /// A zero interval cannot drive a poll timer.
    pub fn is_valid(self) -> bool {
        !self.interval.is_zero()
    }

    pub const SITEMAP: Self = Self::from_secs(10, 300);
    pub const PSI: Self = Self::from_secs(15, 120);
    pub const TEMPLATES: Self = Self::from_secs(15, 600);
}

/// Poll policies for each long-running action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicies {
    pub sitemap: PollPolicy,
    pub psi: PollPolicy,
    pub templates: PollPolicy,
}

impl Default for PollPolicies {
    fn default() -> Self {
        Self {
            sitemap: PollPolicy::SITEMAP,
            psi: PollPolicy::PSI,
            templates: PollPolicy::TEMPLATES,
        }
    }
}

/// Everything a connected session needs.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Base URL of the IO action namespace, e.g.
    /// `https://…adobeioruntime.net/api/v1/web/powerscore`.
    pub base_url: Url,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    pub polling: PollPolicies,
    pub derivation: DerivationConfig,
}

impl RuntimeConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            polling: PollPolicies::default(),
            derivation: DerivationConfig::default(),
        }
    }
}
