//! Listener types and the per-type slot arena.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ListenerResult;
use crate::snapshot::Snapshot;

/// A registered callback.
///
/// Listeners are shared so that dispatch can keep a listener alive while it
/// runs even if it unregisters itself.
pub type Listener = Arc<dyn Fn(&Snapshot) -> ListenerResult + Send + Sync>;

/// An externally owned batch of listeners, keyed by event type.
pub type ListenerSet = HashMap<String, Vec<Listener>>;

/// Wrap a closure as a [`Listener`], e.g. to build a [`ListenerSet`].
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&Snapshot) -> ListenerResult + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Registration handle returned by `on`.
///
/// Equal to the 1-based slot position of the listener within its event type.
/// Only meaningful for the event type and bus that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    /// Build a handle from its raw slot number.
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw 1-based slot number.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    fn index(self) -> Option<usize> {
        self.0.checked_sub(1)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered listener slots for a single event type.
///
/// Removed listeners leave a tombstone (`None`) so the handles of the others
/// keep pointing at the right slot. Slots are never reused while any live
/// listener remains; once the last one is removed the arena is reset and
/// numbering starts over at 1.
#[derive(Default)]
pub(crate) struct SlotArena {
    slots: Vec<Option<Listener>>,
    live: usize,
}

impl SlotArena {
    /// Append a listener and return its handle.
    pub(crate) fn insert(&mut self, listener: Listener) -> Handle {
        self.slots.push(Some(listener));
        self.live = self.live.saturating_add(1);
        Handle(self.slots.len())
    }

    /// Tombstone the slot behind `handle`.
    ///
    /// The removed listener is handed back so the caller can drop it after
    /// releasing any lock it holds.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<Listener> {
        let removed = handle
            .index()
            .and_then(|index| self.slots.get_mut(index))
            .and_then(Option::take);

        if removed.is_some() {
            self.live = self.live.saturating_sub(1);
        }
        if self.live == 0 {
            self.slots = Vec::new();
        }

        removed
    }

    /// Live listeners with their slot positions, in registration order.
    pub(crate) fn live_entries(&self) -> Vec<(usize, Listener)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|l| (index, Arc::clone(l))))
            .collect()
    }

    /// Whether `listener` still occupies slot `index`.
    pub(crate) fn holds(&self, index: usize, listener: &Listener) -> bool {
        matches!(self.slots.get(index), Some(Some(current)) if Arc::ptr_eq(current, listener))
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
