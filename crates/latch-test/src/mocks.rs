//! Recording and failing listeners.

use std::sync::{Arc, Mutex, PoisonError};

use latch_events::{Listener, ListenerResult, Snapshot, listener};
use serde_json::Value;

/// A single delivery captured by a [`Recorder`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Label of the callback that received the event.
    pub label: String,
    /// The snapshot it received.
    pub snapshot: Snapshot,
}

/// Records every delivery made to the callbacks it hands out.
///
/// All callbacks from one recorder share a single log, so the order across
/// callbacks is the order the bus invoked them in.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl Recorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that records deliveries under `label`.
    pub fn callback(
        &self,
        label: &str,
    ) -> impl Fn(&Snapshot) -> ListenerResult + Send + Sync + 'static + use<> {
        let calls = Arc::clone(&self.calls);
        let label = label.to_owned();
        move |snapshot: &Snapshot| -> ListenerResult {
            calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedCall {
                    label: label.clone(),
                    snapshot: snapshot.clone(),
                });
            Ok(())
        }
    }

    /// Same as [`Recorder::callback`], wrapped as a shared [`Listener`].
    #[must_use]
    pub fn listener(&self, label: &str) -> Listener {
        listener(self.callback(label))
    }

    /// All recorded calls, in delivery order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Labels of the recorded calls, in delivery order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.label).collect()
    }

    /// Recorded payloads, in delivery order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .map(|c| c.snapshot.value().clone())
            .collect()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// A callback that always fails with `message`.
pub fn failing_callback(
    message: &'static str,
) -> impl Fn(&Snapshot) -> ListenerResult + Send + Sync + 'static {
    move |_: &Snapshot| -> ListenerResult { Err(message.into()) }
}
