//! Latch Test - Shared test utilities for the Latch event bus.
//!
//! This crate provides recording listeners, payload fixtures and test
//! harness helpers used as a dev-dependency by the Latch crates.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! latch-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! use latch_events::EventBus;
//! use latch_test::{Recorder, test_login};
//!
//! #[test]
//! fn test_delivery() {
//!     let bus = EventBus::new();
//!     let recorder = Recorder::new();
//!
//!     bus.on("login", recorder.callback("audit"), false).unwrap();
//!     bus.emit("login", &test_login(), false).unwrap();
//!
//!     assert_eq!(recorder.labels(), vec!["audit"]);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
