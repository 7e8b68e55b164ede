// ── Analysis session ──
//
// One bus, its derivation pipeline and (when connected) the remote
// providers feeding it. Dropping the session cancels outstanding polls
// and drops every registration.

use std::sync::Arc;

use powerscore_api::{IoClient, TransportConfig};
use tracing::debug;

use crate::bus::NotificationBus;
use crate::calculator::{CalculatorParams, provide_calculator_data};
use crate::config::RuntimeConfig;
use crate::derive::{DerivationConfig, init_calculations};
use crate::error::CoreError;
use crate::provider::{RemoteProviders, SessionCache};
use crate::report::AnalysisReport;

#[derive(Debug)]
pub struct PowerScoreSession {
    bus: NotificationBus,
    providers: Option<RemoteProviders>,
}

impl PowerScoreSession {
    /// A session backed by the analysis backend. Must be created inside a
    /// tokio runtime.
    pub fn connect(config: &RuntimeConfig, cache: Arc<dyn SessionCache>) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = IoClient::new(config.base_url.clone(), &transport)?;
        let bus = NotificationBus::new();
        init_calculations(&bus, &config.derivation);
        let providers = RemoteProviders::new(client, bus.clone(), cache, config.polling)?;
        debug!(base_url = %config.base_url, "analysis session created");
        Ok(Self {
            bus,
            providers: Some(providers),
        })
    }

    /// A session with the pipeline only; data comes from the caller.
    pub fn offline(derivation: &DerivationConfig) -> Self {
        let bus = NotificationBus::new();
        init_calculations(&bus, derivation);
        Self {
            bus,
            providers: None,
        }
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn providers(&self) -> Option<&RemoteProviders> {
        self.providers.as_ref()
    }

    /// Start analyzing `url`. Register consumers on [`bus`](Self::bus)
    /// before calling this.
    pub fn start(&self, url: &str, force: bool) -> Result<(), CoreError> {
        let providers = self.providers.as_ref().ok_or_else(|| CoreError::Config {
            message: "offline session cannot run a remote analysis".into(),
        })?;
        providers.load_data(url, force);
        Ok(())
    }

    /// Publish calculator inputs in place of a remote analysis.
    pub fn load_calculator(&self, params: &CalculatorParams) {
        provide_calculator_data(&self.bus, params);
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport::from_bus(&self.bus)
    }

    /// Cancel outstanding provider work.
    pub fn shutdown(&self) {
        if let Some(providers) = &self.providers {
            providers.shutdown();
        }
    }
}

impl Drop for PowerScoreSession {
    fn drop(&mut self) {
        self.shutdown();
        self.bus.clear();
    }
}
