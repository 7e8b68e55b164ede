// ── Remote data providers ──
//
// Turns the analysis backend's IO actions into bus publications. Each
// action publishes exactly one outcome for its data type. Long-running
// actions are triggered once and then polled through a `PollTask`.

pub mod cache;
pub mod poll;

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use powerscore_api::IoClient;
use serde_json::{Value, json};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::NotificationBus;
use crate::config::{PollPolicies, PollPolicy};
use crate::data_type::DataType;
use crate::error::{CoreError, DataError};
use crate::model::{Datum, SessionId, SetupInfo};

pub use cache::{CachedSession, MemorySessionCache, SessionCache};
pub use poll::PollTask;

/// Types started once setup resolves; a setup failure fails all of them.
const SETUP_DEPENDENTS: [DataType; 4] = [
    DataType::Sitemap,
    DataType::Dns,
    DataType::RawTraffic,
    DataType::Psi,
];

struct ProviderInner {
    client: IoClient,
    bus: NotificationBus,
    cache: Arc<dyn SessionCache>,
    policies: PollPolicies,
    runtime: Handle,
    cancel: CancellationToken,
    session_id: Mutex<Option<SessionId>>,
    polls: Mutex<Vec<PollTask>>,
}

impl Drop for ProviderInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Publishes backend data onto one bus.
#[derive(Clone)]
pub struct RemoteProviders {
    inner: Arc<ProviderInner>,
}

impl std::fmt::Debug for RemoteProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteProviders")
            .field("base_url", &self.inner.client.base_url().as_str())
            .field("active_polls", &self.active_polls())
            .finish_non_exhaustive()
    }
}

impl RemoteProviders {
    /// Must be called from within a tokio runtime; spawned work runs on it.
    pub fn new(
        client: IoClient,
        bus: NotificationBus,
        cache: Arc<dyn SessionCache>,
        policies: PollPolicies,
    ) -> Result<Self, CoreError> {
        let runtime = Handle::try_current()
            .map_err(|e| CoreError::Internal(format!("no tokio runtime for providers: {e}")))?;
        Ok(Self {
            inner: Arc::new(ProviderInner {
                client,
                bus,
                cache,
                policies,
                runtime,
                cancel: CancellationToken::new(),
                session_id: Mutex::new(None),
                polls: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Start a full analysis of `url`.
    ///
    /// Registers the provider chain (setup → base actions, sampled URLs →
    /// templates) and then resolves setup, from the session cache when it
    /// holds the same origin and `force` is off.
    pub fn load_data(&self, url: &str, force: bool) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.bus.observe(&[DataType::Setup], move |delivery| {
            let Some(inner) = weak.upgrade() else { return };
            let setup = delivery
                .map_err(Clone::clone)
                .and_then(|values| {
                    values[0]
                        .setup()
                        .cloned()
                        .map_err(|e| e.into_data_error(DataType::Setup))
                });
            match setup {
                Ok(setup) => inner.start_base_actions(&setup),
                Err(error) => {
                    for data_type in SETUP_DEPENDENTS {
                        inner.bus.fail(data_type, error.clone());
                    }
                }
            }
        });

        let weak = Arc::downgrade(&self.inner);
        self.inner
            .bus
            .observe(&[DataType::SampledUrls], move |delivery| {
                let Some(inner) = weak.upgrade() else { return };
                match delivery {
                    Ok(values) => inner.invoke_polled_action(
                        DataType::Templates,
                        "powerscore/get-templates",
                        json!({ "sampledUrls": &*values[0] }),
                        inner.policies.templates,
                    ),
                    Err(error) => inner.bus.fail(DataType::Templates, error.clone()),
                }
            });

        let cached = match self.inner.cache.load() {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "session cache unreadable, starting fresh");
                None
            }
        };
        match cached.filter(|c| !force && c.origin == url) {
            Some(session) => {
                info!(origin = %session.origin, id = %session.id, "reusing cached session");
                self.inner
                    .bus
                    .provide(DataType::Setup, Datum::Setup(session.to_setup()));
            }
            None => self.inner.invoke_action(
                DataType::Setup,
                "setup.json",
                json!({ "powerscoreURL": url, "force": force.to_string() }),
            ),
        }
    }

    /// Run a single-shot action and publish its body as `data_type`.
    pub fn invoke_action(&self, data_type: DataType, path: &'static str, body: Value) {
        self.inner.invoke_action(data_type, path, body);
    }

    /// Trigger a long-running action and poll for its result file.
    pub fn invoke_polled_action(
        &self,
        data_type: DataType,
        action_name: &'static str,
        body: Value,
        policy: PollPolicy,
    ) {
        self.inner
            .invoke_polled_action(data_type, action_name, body, policy);
    }

    /// Session id used for result file names, once setup has resolved.
    pub fn session_id(&self) -> Option<SessionId> {
        self.inner.session_id.lock().clone()
    }

    /// Polls still running.
    pub fn active_polls(&self) -> usize {
        let mut polls = self.inner.polls.lock();
        polls.retain(|p| !p.is_finished());
        polls.len()
    }

    /// Cancel every in-flight action and poll. Nothing further is
    /// published by this provider.
    pub fn shutdown(&self) {
        debug!("cancelling remote providers");
        self.inner.cancel.cancel();
    }

    /// Wait until every poll started so far has ended.
    pub async fn join_polls(&self) {
        let polls: Vec<PollTask> = std::mem::take(&mut *self.inner.polls.lock());
        for poll in polls {
            poll.join().await;
        }
    }
}

impl ProviderInner {
    fn start_base_actions(self: &Arc<Self>, setup: &SetupInfo) {
        *self.session_id.lock() = Some(setup.id.clone());
        if let Err(e) = self.cache.store(&CachedSession::from_setup(setup)) {
            warn!(error = %e, "could not cache session");
        }
        info!(origin = %setup.origin, id = %setup.id, "analysis session ready");

        let site = json!({ "powerscoreURL": setup.origin, "id": setup.id });
        self.invoke_polled_action(
            DataType::Sitemap,
            "powerscore/get-sitemap",
            site.clone(),
            self.policies.sitemap,
        );
        self.invoke_action(DataType::Dns, "dns.json", site);
        self.invoke_action(
            DataType::RawTraffic,
            "get-traffic.json",
            json!({ "url": setup.origin, "id": setup.id }),
        );
        self.invoke_polled_action(
            DataType::Psi,
            "powerscore/psi",
            json!({ "powerscoreURL": setup.origin }),
            self.policies.psi,
        );
    }

    fn invoke_action(self: &Arc<Self>, data_type: DataType, path: &'static str, body: Value) {
        let inner = Arc::clone(self);
        self.spawn(async move {
            let outcome = match inner.client.invoke_action(path, &body).await {
                Ok(value) => Datum::decode(data_type, value),
                Err(e) => Err(DataError::from_api(data_type, &e)),
            };
            inner.bus.publish(data_type, outcome);
        });
    }

    fn invoke_polled_action(
        self: &Arc<Self>,
        data_type: DataType,
        action_name: &'static str,
        body: Value,
        policy: PollPolicy,
    ) {
        if !policy.is_valid() {
            self.bus.fail(
                data_type,
                DataError::derivation(data_type, "poll interval must be greater than zero"),
            );
            return;
        }

        let inner = Arc::clone(self);
        self.spawn(async move {
            let id = inner.session_id.lock().clone();
            let Some(id) = id else {
                inner.bus.fail(
                    data_type,
                    DataError::derivation(data_type, "no analysis session id"),
                );
                return;
            };
            let file_name = data_type.result_file_name(id.as_str());

            match inner.client.get_file(&file_name).await {
                Ok(Some(existing)) => {
                    debug!(data_type = %data_type, file = %file_name, "result already available");
                    inner.bus.publish(data_type, Datum::decode(data_type, existing));
                    return;
                }
                Ok(None) => {}
                Err(e) => warn!(data_type = %data_type, error = %e, "result check failed"),
            }

            if let Err(e) = inner
                .client
                .trigger_action(action_name, &file_name, &body)
                .await
            {
                inner.bus.fail(data_type, DataError::from_api(data_type, &e));
                return;
            }

            let task = PollTask::spawn(
                &inner.runtime,
                inner.client.clone(),
                inner.bus.clone(),
                data_type,
                file_name,
                policy,
                inner.cancel.child_token(),
            );
            inner.track(task);
        });
    }

    /// Keep `task` for `join_polls`, dropping handles of polls that ended.
    fn track(&self, task: PollTask) {
        let mut polls = self.polls.lock();
        polls.retain(|p| !p.is_finished());
        polls.push(task);
    }

    /// Spawn `work` on the provider runtime, abandoned on shutdown.
    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = work => {}
            }
        });
    }
}
