// ── Per-consumer dependency accumulator ──

use std::sync::Arc;

use parking_lot::Mutex;

use crate::data_type::DataType;
use crate::error::DataError;
use crate::model::Datum;

/// What a registration's callback receives: every declared value in
/// declaration order, or the error of the first failed dependency.
pub type Delivery<'a> = Result<&'a [Arc<Datum>], &'a DataError>;

pub(crate) type Callback = Arc<dyn Fn(Delivery<'_>) + Send + Sync>;

/// State of one declared dependency.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Pending,
    Ready(Arc<Datum>),
    Failed(DataError),
}

enum Outcome {
    Waiting,
    Ready(Vec<Arc<Datum>>),
    Failed(DataError),
}

/// A consumer's standing declaration: dependencies plus callback.
pub(crate) struct Registration {
    dependencies: Vec<DataType>,
    state: Mutex<State>,
    callback: Callback,
}

struct State {
    slots: Vec<Slot>,
    /// Bumped on every received outcome.
    generation: u64,
    /// Set while some thread is running the callback.
    delivering: bool,
}

/// Clears `delivering` if the callback unwinds, so later rounds still fire.
struct UnwindGuard<'a>(&'a Mutex<State>);

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().delivering = false;
        }
    }
}

impl Registration {
    pub(crate) fn new(dependencies: &[DataType], callback: Callback) -> Self {
        Self {
            dependencies: dependencies.to_vec(),
            state: Mutex::new(State {
                slots: vec![Slot::Pending; dependencies.len()],
                generation: 0,
                delivering: false,
            }),
            callback,
        }
    }

    pub(crate) fn dependencies(&self) -> &[DataType] {
        &self.dependencies
    }

    /// Record a published outcome and fire the callback if this round
    /// completes a delivery.
    ///
    /// Deliveries for one registration never overlap. When an outcome
    /// arrives while another thread (or the callback itself) is
    /// delivering, it is only recorded; the delivering thread re-fires
    /// with the current slots once its callback returns, so the last
    /// delivery always reflects the last outcome received. No lock is
    /// held while the callback runs.
    pub(crate) fn receive(&self, data_type: DataType, published: &Slot) {
        {
            let mut state = self.state.lock();
            for (dep, slot) in self.dependencies.iter().zip(state.slots.iter_mut()) {
                if *dep == data_type {
                    *slot = published.clone();
                }
            }
            state.generation += 1;
            if state.delivering {
                return;
            }
            state.delivering = true;
        }

        let _guard = UnwindGuard(&self.state);
        loop {
            let (outcome, generation) = {
                let state = self.state.lock();
                (evaluate(&state.slots), state.generation)
            };

            match outcome {
                Outcome::Waiting => {}
                Outcome::Ready(values) => (self.callback)(Ok(&values)),
                Outcome::Failed(err) => (self.callback)(Err(&err)),
            }

            let mut state = self.state.lock();
            if state.generation == generation {
                state.delivering = false;
                return;
            }
        }
    }
}

/// One pass over the slots in declaration order. The first failed slot
/// wins, even if an earlier slot is still pending.
fn evaluate(slots: &[Slot]) -> Outcome {
    let mut values = Vec::with_capacity(slots.len());
    let mut waiting = false;
    for slot in slots {
        match slot {
            Slot::Failed(err) => return Outcome::Failed(err.clone()),
            Slot::Pending => waiting = true,
            Slot::Ready(value) => values.push(Arc::clone(value)),
        }
    }
    if waiting {
        Outcome::Waiting
    } else {
        Outcome::Ready(values)
    }
}
