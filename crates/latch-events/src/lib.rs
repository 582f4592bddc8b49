//! Latch Events - a synchronous, in-process event bus with buffered replay.
//!
//! This crate provides:
//! - [`EventBus`], a publish/subscribe bus keyed by string event types
//! - Buffered emissions that late subscribers can replay on registration
//! - One-shot listeners
//! - A mountable [`ListenerSet`] that an owner can swap in and out wholesale
//!
//! # Architecture
//!
//! Every emission is copied into an immutable [`Snapshot`] and delivered
//! synchronously, on the caller's stack, to each live listener of that type in
//! registration order, then to the mounted set. A listener's error stops the
//! dispatch and is returned from `emit`.
//!
//! Listeners are identified by a [`Handle`], their 1-based slot within the
//! event type. Removing a listener leaves a tombstone, so other handles stay
//! valid; once every listener of a type is gone, numbering restarts at 1.
//!
//! # Example
//!
//! ```rust
//! use latch_events::EventBus;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), latch_events::BusError> {
//! let bus = EventBus::new();
//!
//! // Fired before anyone listens, but kept in the buffer.
//! bus.emit("authorize", &json!({"user": "ada"}), true)?;
//!
//! // A late subscriber asks for the buffered value and gets it immediately.
//! let handle = bus.on(
//!     "authorize",
//!     |event| {
//!         assert_eq!(event["user"], "ada");
//!         Ok(())
//!     },
//!     true,
//! )?;
//!
//! bus.off("authorize", handle);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod config;
mod error;
mod registry;
mod snapshot;

pub use bus::{EventBus, GLOBAL_BUS_NAME, WeakEventBus, create_bus, global_bus};
pub use config::{BusConfig, DEFAULT_BUS_NAME};
pub use error::{BusError, BusResult, ConfigError, ConfigResult, ListenerError, ListenerResult};
pub use registry::{Handle, Listener, ListenerSet, listener};
pub use snapshot::Snapshot;
