// ── Result file polling ──
//
// A triggered action writes its result to a file on the backend. A
// `PollTask` checks for that file on a fixed interval and publishes it,
// or publishes a timeout once the budget is spent.

use std::time::Duration;

use powerscore_api::IoClient;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::bus::NotificationBus;
use crate::config::PollPolicy;
use crate::data_type::DataType;
use crate::error::DataError;
use crate::model::Datum;

/// Handle to a running poll. Ends on success, timeout or cancellation.
pub struct PollTask {
    data_type: DataType,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollTask {
    pub(crate) fn spawn(
        runtime: &Handle,
        client: IoClient,
        bus: NotificationBus,
        data_type: DataType,
        file_name: String,
        policy: PollPolicy,
        cancel: CancellationToken,
    ) -> Self {
        let handle = runtime.spawn(poll_file(
            client,
            bus,
            data_type,
            file_name,
            policy,
            cancel.clone(),
        ));
        Self {
            data_type,
            cancel,
            handle,
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Stop polling without publishing anything.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to end.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

impl std::fmt::Debug for PollTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollTask")
            .field("data_type", &self.data_type)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

async fn poll_file(
    client: IoClient,
    bus: NotificationBus,
    data_type: DataType,
    file_name: String,
    policy: PollPolicy,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(policy.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    let mut waited = Duration::ZERO;
    debug!(data_type = %data_type, file = %file_name, "polling for result");

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(data_type = %data_type, "poll cancelled");
                break;
            }
            _ = interval.tick() => {
                waited += policy.interval;
                if waited >= policy.max_wait {
                    bus.fail(data_type, DataError::timeout(data_type, policy.max_wait));
                    break;
                }

                let fetched = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    fetched = client.get_file(&file_name) => fetched,
                };
                match fetched {
                    Ok(Some(body)) => {
                        bus.publish(data_type, Datum::decode(data_type, body));
                        break;
                    }
                    Ok(None) => {
                        trace!(data_type = %data_type, waited_secs = waited.as_secs(), "result not ready");
                    }
                    Err(e) => {
                        warn!(data_type = %data_type, error = %e, "result check failed");
                    }
                }
            }
        }
    }
}
