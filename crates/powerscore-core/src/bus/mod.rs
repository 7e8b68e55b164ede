// ── Notification bus ──
//
// Per-session publish/subscribe hub. Consumers declare the data types
// they need; producers publish successes and failures; each
// registration fires once all of its dependencies have arrived and
// again whenever one of them is republished.

mod registration;
mod stream;

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::data_type::DataType;
use crate::error::DataError;
use crate::model::Datum;

use registration::{Callback, Registration, Slot};

pub use registration::Delivery;
pub use stream::{DeliveryResult, DeliveryStream, DeliveryWatchStream};

/// Last outcome published for a data type.
pub type Published = Result<Arc<Datum>, DataError>;

struct BusInner {
    /// Registrations per data type, in registration order.
    waiters: DashMap<DataType, Vec<Arc<Registration>>>,
    latest: DashMap<DataType, Published>,
}

/// Cloneable handle to one session's bus.
///
/// Publishing is synchronous: `provide` and `fail` run every affected
/// callback before returning. No lock is held while a callback runs,
/// so callbacks may publish, observe or clear.
#[derive(Clone)]
pub struct NotificationBus {
    inner: Arc<BusInner>,
}

/// Non-owning handle, for callbacks that publish back into their bus.
#[derive(Clone)]
pub struct WeakBus {
    inner: Weak<BusInner>,
}

impl WeakBus {
    pub fn upgrade(&self) -> Option<NotificationBus> {
        self.inner.upgrade().map(|inner| NotificationBus { inner })
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("data_types", &self.inner.waiters.len())
            .finish_non_exhaustive()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                waiters: DashMap::new(),
                latest: DashMap::new(),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakBus {
        WeakBus {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Register `callback` to run once every type in `data_types` has a
    /// value, and again on each later publish of any of them.
    ///
    /// Only publishes made after registration are seen. Repeated types
    /// are allowed; each declared position receives the value.
    pub fn observe<F>(&self, data_types: &[DataType], callback: F)
    where
        F: Fn(Delivery<'_>) + Send + Sync + 'static,
    {
        if data_types.is_empty() {
            warn!("observe called with no data types; callback will never fire");
            return;
        }

        let callback: Callback = Arc::new(callback);
        let registration = Arc::new(Registration::new(data_types, callback));

        let mut attached: Vec<DataType> = Vec::with_capacity(data_types.len());
        for &data_type in registration.dependencies() {
            if attached.contains(&data_type) {
                continue;
            }
            attached.push(data_type);
            self.inner
                .waiters
                .entry(data_type)
                .or_default()
                .push(Arc::clone(&registration));
        }
    }

    /// Publish a successful value for `data_type`.
    pub fn provide(&self, data_type: DataType, value: Datum) {
        let value = Arc::new(value);
        self.inner
            .latest
            .insert(data_type, Ok(Arc::clone(&value)));
        let handlers = self.handlers(data_type);
        debug!(data_type = %data_type, handlers = handlers.len(), "provide");
        let slot = Slot::Ready(value);
        for registration in handlers {
            registration.receive(data_type, &slot);
        }
    }

    /// Publish a failure for `data_type`.
    pub fn fail(&self, data_type: DataType, error: DataError) {
        self.inner.latest.insert(data_type, Err(error.clone()));
        let handlers = self.handlers(data_type);
        warn!(data_type = %data_type, handlers = handlers.len(), error = %error, "fail");
        let slot = Slot::Failed(error);
        for registration in handlers {
            registration.receive(data_type, &slot);
        }
    }

    /// Publish either outcome.
    pub fn publish(&self, data_type: DataType, outcome: Result<Datum, DataError>) {
        match outcome {
            Ok(value) => self.provide(data_type, value),
            Err(error) => self.fail(data_type, error),
        }
    }

    /// Drop every registration and every recorded outcome.
    pub fn clear(&self) {
        let registrations: usize = self.inner.waiters.iter().map(|w| w.value().len()).sum();
        self.inner.waiters.clear();
        self.inner.latest.clear();
        debug!(registrations, "bus cleared");
    }

    /// The last outcome published for `data_type`, if any.
    pub fn latest(&self, data_type: DataType) -> Option<Published> {
        self.inner.latest.get(&data_type).map(|p| p.value().clone())
    }

    /// Number of registrations waiting on `data_type`.
    pub fn registration_count(&self, data_type: DataType) -> usize {
        self.inner.waiters.get(&data_type).map_or(0, |w| w.len())
    }

    /// Snapshot the handler list so no map guard is held during callbacks.
    fn handlers(&self, data_type: DataType) -> Vec<Arc<Registration>> {
        self.inner
            .waiters
            .get(&data_type)
            .map(|w| w.value().clone())
            .unwrap_or_default()
    }
}
