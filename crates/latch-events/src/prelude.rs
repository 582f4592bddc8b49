//! Prelude module - commonly used types for convenient import.
//!
//! Use `use latch_events::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use latch_events::prelude::*;
//!
//! # fn main() -> BusResult<()> {
//! let bus = EventBus::new();
//! bus.one("ready", |_| Ok(()), false)?;
//! bus.emit("ready", &(), false)?;
//! # Ok(())
//! # }
//! ```

// Event bus
pub use crate::{EventBus, WeakEventBus, create_bus, global_bus};

// Listeners and snapshots
pub use crate::{Handle, Listener, ListenerSet, Snapshot, listener};

// Configuration
pub use crate::BusConfig;

// Errors
pub use crate::{BusError, BusResult, ConfigError, ConfigResult, ListenerError, ListenerResult};
