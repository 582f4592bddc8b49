//! Event bus with per-type listener slots, buffered replay and a mountable
//! listener set.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{
    Arc, LazyLock, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::BusConfig;
use crate::error::{BusError, BusResult, ListenerResult};
use crate::registry::{Handle, Listener, ListenerSet, SlotArena};
use crate::snapshot::Snapshot;

/// Name of the process-wide default bus.
pub const GLOBAL_BUS_NAME: &str = "global";

static GLOBAL: LazyLock<EventBus> =
    LazyLock::new(|| EventBus::with_config(BusConfig::new(GLOBAL_BUS_NAME)));

/// The process-wide default bus.
///
/// Created on first use. Prefer constructing a bus where the application is
/// assembled and passing it down; this exists for code that has no such place.
#[must_use]
pub fn global_bus() -> &'static EventBus {
    &GLOBAL
}

/// Create a new, independent bus with the default configuration.
#[must_use]
pub fn create_bus() -> EventBus {
    EventBus::new()
}

#[derive(Default)]
struct BusState {
    listeners: HashMap<String, SlotArena>,
    buffer: HashMap<String, Snapshot>,
    mounted: Option<ListenerSet>,
}

struct BusInner {
    config: BusConfig,
    state: RwLock<BusState>,
}

/// Synchronous publish/subscribe bus.
///
/// Listeners run on the emitting thread, in registration order, before
/// [`EventBus::emit`] returns. The internal lock is never held while a
/// listener runs, so listeners may call back into the bus.
///
/// `EventBus` is a handle: clones share the same listeners, buffer and
/// mounted set. Buses from separate [`EventBus::new`] calls share nothing.
///
/// **WARNING:** a listener that captures a clone of the bus it is registered
/// on forms an `Arc` cycle that keeps the bus alive until the listener is
/// removed. Capture a [`WeakEventBus`] instead when the listener outlives
/// the code that registered it.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

/// Non-owning reference to an [`EventBus`].
#[derive(Clone)]
pub struct WeakEventBus {
    inner: Weak<BusInner>,
}

impl WeakEventBus {
    /// Get the bus back if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<EventBus> {
        self.inner.upgrade().map(|inner| EventBus { inner })
    }
}

impl fmt::Debug for WeakEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventBus")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl EventBus {
    /// Create a bus with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a bus from a configuration.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        let mut state = BusState::default();
        for event_type in &config.preregistered_types {
            state
                .listeners
                .entry(event_type.clone())
                .or_default();
        }

        debug!(
            bus = %config.name,
            preregistered = config.preregistered_types.len(),
            "Event bus created"
        );

        Self {
            inner: Arc::new(BusInner {
                config,
                state: RwLock::new(state),
            }),
        }
    }

    /// Name of this bus, as configured.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// The configuration this bus was built from.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// A non-owning reference to this bus.
    #[must_use]
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Publish an event.
    ///
    /// The payload is copied into an immutable [`Snapshot`]. With `buffer`
    /// set, the snapshot replaces the buffered value for `event_type`. Then
    /// every live listener registered for `event_type` is invoked in
    /// registration order, followed by the mounted set's listeners for that
    /// type.
    ///
    /// # Errors
    ///
    /// - [`BusError::UnserializablePayload`] if the payload cannot be copied.
    ///   Nothing is buffered or delivered.
    /// - [`BusError::ListenerFailure`] if a listener returns an error. The
    ///   listeners after it, including the mounted set, are not invoked.
    ///   Buffering has already happened at that point.
    pub fn emit<T>(&self, event_type: &str, payload: &T, buffer: bool) -> BusResult<()>
    where
        T: Serialize + ?Sized,
    {
        let snapshot =
            Snapshot::capture(payload).map_err(|source| BusError::UnserializablePayload {
                event_type: event_type.to_owned(),
                source,
            })?;

        if self.inner.config.log_payloads {
            trace!(bus = %self.name(), event_type, buffer, payload = %snapshot, "Emitting event");
        } else {
            trace!(bus = %self.name(), event_type, buffer, "Emitting event");
        }

        if buffer {
            self.write()
                .buffer
                .insert(event_type.to_owned(), snapshot.clone());
            debug!(bus = %self.name(), event_type, "Event buffered");
        }

        self.dispatch(event_type, &snapshot)
    }

    /// Publish an event and keep it for late subscribers.
    ///
    /// Shorthand for `emit(event_type, payload, true)`.
    ///
    /// # Errors
    ///
    /// Same as [`EventBus::emit`].
    pub fn emit_buffered<T>(&self, event_type: &str, payload: &T) -> BusResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.emit(event_type, payload, true)
    }

    /// Register a listener for `event_type`.
    ///
    /// With `use_buffer` set and a buffered snapshot present, the callback is
    /// invoked with it immediately, before it is registered. Returns the
    /// handle to pass to [`EventBus::off`].
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ListenerFailure`] if the replay fails. The
    /// callback is not registered in that case.
    pub fn on<F>(&self, event_type: &str, callback: F, use_buffer: bool) -> BusResult<Handle>
    where
        F: Fn(&Snapshot) -> ListenerResult + Send + Sync + 'static,
    {
        self.subscribe(event_type, Arc::new(callback), use_buffer)
    }

    /// Register an already shared [`Listener`].
    ///
    /// # Errors
    ///
    /// Same as [`EventBus::on`].
    pub fn subscribe(
        &self,
        event_type: &str,
        listener: Listener,
        use_buffer: bool,
    ) -> BusResult<Handle> {
        if let Some(snapshot) = self.replay_source(event_type, use_buffer) {
            trace!(bus = %self.name(), event_type, "Replaying buffered event");
            self.invoke(event_type, listener.as_ref(), &snapshot)?;
        }

        let handle = self
            .write()
            .listeners
            .entry(event_type.to_owned())
            .or_default()
            .insert(listener);

        debug!(bus = %self.name(), event_type, %handle, "Listener registered");
        Ok(handle)
    }

    /// Unregister the listener behind `handle`.
    ///
    /// Unknown event types and stale or out-of-range handles are ignored.
    /// Returns `true` if a live listener was removed.
    pub fn off(&self, event_type: &str, handle: Handle) -> bool {
        let (removed, reset) = {
            let mut state = self.write();
            let Some(arena) = state.listeners.get_mut(event_type) else {
                return false;
            };
            let removed = arena.remove(handle);
            (removed, arena.slot_count() == 0)
        };

        // Dropped here, outside the lock, in case the listener's captures
        // call back into the bus on drop.
        let found = removed.is_some();
        drop(removed);

        if found {
            debug!(bus = %self.name(), event_type, %handle, "Listener unregistered");
        }
        if reset {
            trace!(bus = %self.name(), event_type, "Listener slots reset");
        }
        found
    }

    /// Register a listener that fires at most once.
    ///
    /// With `use_buffer` set and a buffered snapshot present, the replay
    /// counts as the single invocation and nothing is registered. Otherwise
    /// the listener unregisters itself right after its first invocation.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ListenerFailure`] if the replay fails.
    pub fn one<F>(&self, event_type: &str, callback: F, use_buffer: bool) -> BusResult<()>
    where
        F: Fn(&Snapshot) -> ListenerResult + Send + Sync + 'static,
    {
        if let Some(snapshot) = self.replay_source(event_type, use_buffer) {
            trace!(bus = %self.name(), event_type, "Replaying buffered event to one-shot listener");
            return self.invoke(event_type, &callback, &snapshot);
        }

        // The wrapper learns its own handle inside the same write lock that
        // inserts it, so any emitter that can see the slot can also see the
        // handle.
        let own_handle = Arc::new(OnceLock::<Handle>::new());
        let fired = AtomicBool::new(false);
        let bus = self.downgrade();
        let owned_type = event_type.to_owned();

        let wrapper = {
            let own_handle = Arc::clone(&own_handle);
            move |snapshot: &Snapshot| {
                if fired.swap(true, Ordering::SeqCst) {
                    return Ok(());
                }
                let result = callback(snapshot);
                if let (Some(bus), Some(handle)) = (bus.upgrade(), own_handle.get()) {
                    bus.off(&owned_type, *handle);
                }
                result
            }
        };

        let handle = {
            let mut state = self.write();
            let handle = state
                .listeners
                .entry(event_type.to_owned())
                .or_default()
                .insert(Arc::new(wrapper));
            if own_handle.set(handle).is_err() {
                warn!(bus = %self.name(), event_type, %handle, "One-shot handle already set");
            }
            handle
        };

        debug!(bus = %self.name(), event_type, %handle, "One-shot listener registered");
        Ok(())
    }

    /// Drop the buffered snapshot for `event_type`.
    ///
    /// Returns the snapshot that was buffered, if any.
    pub fn clear_buffer(&self, event_type: &str) -> Option<Snapshot> {
        let removed = self.write().buffer.remove(event_type);
        if removed.is_some() {
            debug!(bus = %self.name(), event_type, "Event buffer cleared");
        }
        removed
    }

    /// The buffered snapshot for `event_type`, if any.
    #[must_use]
    pub fn buffered(&self, event_type: &str) -> Option<Snapshot> {
        self.read().buffer.get(event_type).cloned()
    }

    /// Install a listener set as an extra delivery target.
    ///
    /// Replaces any previously mounted set; the sets are not merged.
    pub fn mount(&self, set: ListenerSet) {
        let event_types = set.len();
        let previous = self.write().mounted.replace(set);
        debug!(
            bus = %self.name(),
            event_types,
            replaced = previous.is_some(),
            "Listener set mounted"
        );
    }

    /// Remove the mounted listener set and hand it back.
    pub fn unmount(&self) -> Option<ListenerSet> {
        let previous = self.write().mounted.take();
        debug!(bus = %self.name(), was_mounted = previous.is_some(), "Listener set unmounted");
        previous
    }

    /// Whether a listener set is currently mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.read().mounted.is_some()
    }

    /// Number of live listeners registered for `event_type` through
    /// [`EventBus::on`] or [`EventBus::one`].
    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.read()
            .listeners
            .get(event_type)
            .map_or(0, SlotArena::live_count)
    }

    fn replay_source(&self, event_type: &str, use_buffer: bool) -> Option<Snapshot> {
        if use_buffer {
            self.buffered(event_type)
        } else {
            None
        }
    }

    fn dispatch(&self, event_type: &str, snapshot: &Snapshot) -> BusResult<()> {
        let pending = self
            .read()
            .listeners
            .get(event_type)
            .map(SlotArena::live_entries)
            .unwrap_or_default();

        trace!(
            bus = %self.name(),
            event_type,
            listener_count = pending.len(),
            "Dispatching event"
        );

        for (index, listener) in pending {
            // Skip listeners removed by an earlier listener in this pass.
            let live = self
                .read()
                .listeners
                .get(event_type)
                .is_some_and(|arena| arena.holds(index, &listener));
            if !live {
                continue;
            }
            self.invoke(event_type, listener.as_ref(), snapshot)?;
        }

        let mounted = self
            .read()
            .mounted
            .as_ref()
            .and_then(|set| set.get(event_type))
            .cloned()
            .unwrap_or_default();

        for listener in &mounted {
            self.invoke(event_type, listener.as_ref(), snapshot)?;
        }

        Ok(())
    }

    fn invoke(
        &self,
        event_type: &str,
        listener: &(dyn Fn(&Snapshot) -> ListenerResult + Send + Sync),
        snapshot: &Snapshot,
    ) -> BusResult<()> {
        listener(snapshot).map_err(|source| {
            warn!(
                bus = %self.name(),
                event_type,
                error = %source,
                "Listener failed, aborting dispatch"
            );
            BusError::ListenerFailure {
                event_type: event_type.to_owned(),
                source,
            }
        })
    }

    // A panicking listener never holds the lock, so a poisoned lock still
    // guards consistent state.
    fn read(&self) -> RwLockReadGuard<'_, BusState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BusState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("EventBus")
            .field("name", &self.inner.config.name)
            .field("event_types", &state.listeners.len())
            .field("buffered", &state.buffer.len())
            .field("mounted", &state.mounted.is_some())
            .finish()
    }
}
