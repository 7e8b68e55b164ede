// ── Async consumers ──
//
// Future and stream adapters over `observe`, for consumers that would
// rather await deliveries than register callbacks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tokio_stream::wrappers::WatchStream;

use super::NotificationBus;
use crate::data_type::DataType;
use crate::error::{CoreError, DataError};
use crate::model::Datum;

/// Owned form of a [`Delivery`](super::Delivery).
pub type DeliveryResult = Result<Vec<Arc<Datum>>, DataError>;

fn describe(data_types: &[DataType]) -> String {
    data_types
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(", ")
}

impl NotificationBus {
    /// Resolve with the first delivery for `data_types`.
    ///
    /// The registration is made before this returns, so publishes that
    /// happen before the future is first polled are not missed. Resolves
    /// to [`CoreError::SessionClosed`] if the bus is cleared or dropped
    /// first.
    pub fn wait_for(
        &self,
        data_types: &[DataType],
    ) -> impl Future<Output = Result<Vec<Arc<Datum>>, CoreError>> + Send + 'static {
        let (tx, rx) = oneshot::channel::<DeliveryResult>();
        let tx = Mutex::new(Some(tx));
        self.observe(data_types, move |delivery| {
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(delivery.map(<[_]>::to_vec).map_err(Clone::clone));
            }
        });

        let names = describe(data_types);
        async move {
            match rx.await {
                Ok(Ok(values)) => Ok(values),
                Ok(Err(err)) => Err(CoreError::Data(err)),
                Err(_) => Err(CoreError::SessionClosed { data_types: names }),
            }
        }
    }

    /// Follow every delivery for `data_types`.
    pub fn watch(&self, data_types: &[DataType]) -> DeliveryStream {
        let (tx, rx) = watch::channel::<Option<DeliveryResult>>(None);
        self.observe(data_types, move |delivery| {
            tx.send_replace(Some(delivery.map(<[_]>::to_vec).map_err(Clone::clone)));
        });
        DeliveryStream { receiver: rx }
    }
}

/// A subscription to the deliveries of one dependency set.
///
/// Backed by a `watch` channel: a slow reader sees the most recent
/// delivery, not every intermediate one. Ends when the bus is cleared or
/// dropped.
pub struct DeliveryStream {
    receiver: watch::Receiver<Option<DeliveryResult>>,
}

impl DeliveryStream {
    /// The most recent delivery, if any has happened.
    pub fn latest(&self) -> Option<DeliveryResult> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next delivery. Returns `None` once the bus is gone.
    pub async fn changed(&mut self) -> Option<DeliveryResult> {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update().clone()
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> DeliveryWatchStream {
        DeliveryWatchStream {
            inner: WatchStream::from_changes(self.receiver),
        }
    }
}

/// `Stream` adapter over a [`DeliveryStream`].
pub struct DeliveryWatchStream {
    inner: WatchStream<Option<DeliveryResult>>,
}

impl Stream for DeliveryWatchStream {
    type Item = DeliveryResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Some(delivery))) => return Poll::Ready(Some(delivery)),
                Poll::Ready(Some(None)) => {}
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    const A: DataType = DataType::Blocks;
    const B: DataType = DataType::CodeComplexity;

    #[tokio::test]
    async fn wait_for_sees_publish_before_first_poll() {
        let bus = NotificationBus::new();
        let pending = bus.wait_for(&[A, B]);

        bus.provide(B, Datum::Score(2.0));
        bus.provide(A, Datum::Score(1.0));

        let values = pending.await.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1].score().unwrap(), 2.0);
    }

    #[tokio::test]
    async fn wait_for_surfaces_failure() {
        let bus = NotificationBus::new();
        let pending = bus.wait_for(&[A]);
        bus.fail(A, DataError::timeout(A, std::time::Duration::from_secs(5)));

        let err = pending.await.unwrap_err();
        assert!(matches!(err, CoreError::Data(ref e) if e.data_type == A));
    }

    #[tokio::test]
    async fn wait_for_reports_closed_session() {
        let bus = NotificationBus::new();
        let pending = bus.wait_for(&[A, B]);
        bus.clear();

        let err = pending.await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Session was closed before blocks, code-complexity resolved"
        );
    }

    #[tokio::test]
    async fn watch_yields_each_delivery() {
        let bus = NotificationBus::new();
        let mut stream = bus.watch(&[B]);
        assert!(stream.latest().is_none());

        bus.provide(B, Datum::Score(10.0));
        let first = stream.changed().await.unwrap().unwrap();
        assert_eq!(first[0].score().unwrap(), 10.0);

        bus.provide(B, Datum::Score(20.0));
        let second = stream.changed().await.unwrap().unwrap();
        assert_eq!(second[0].score().unwrap(), 20.0);
    }

    #[tokio::test]
    async fn watch_stream_ends_on_clear() {
        let bus = NotificationBus::new();
        let mut stream = bus.watch(&[A]).into_stream();

        bus.provide(A, Datum::Score(1.0));
        let delivery = stream.next().await.unwrap().unwrap();
        assert_eq!(delivery[0].score().unwrap(), 1.0);

        bus.clear();
        assert!(stream.next().await.is_none());
    }
}
