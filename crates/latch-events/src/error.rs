//! Error types for bus and configuration operations.

use thiserror::Error;

/// Error a listener returns to abort the current dispatch.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by every listener.
pub type ListenerResult = Result<(), ListenerError>;

/// Errors that can occur while emitting, subscribing or decoding snapshots.
#[derive(Debug, Error)]
pub enum BusError {
    /// The payload could not be turned into a snapshot.
    ///
    /// Nothing was buffered and no listener was invoked.
    #[error("payload for event '{event_type}' cannot be snapshotted: {source}")]
    UnserializablePayload {
        /// The event type being emitted
        event_type: String,
        /// The serialization failure
        #[source]
        source: serde_json::Error,
    },

    /// A listener returned an error.
    ///
    /// Dispatch stopped at the failing listener; the remaining listeners for
    /// that emission, including the mounted set, were not invoked.
    #[error("listener for event '{event_type}' failed: {source}")]
    ListenerFailure {
        /// The event type being delivered
        event_type: String,
        /// The error returned by the listener
        #[source]
        source: ListenerError,
    },

    /// A snapshot could not be decoded into the requested type.
    #[error("snapshot decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// Errors that can occur while loading a [`BusConfig`](crate::BusConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ReadError {
        /// Path of the file
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The config document is not valid TOML for a bus config.
    #[error("failed to parse config {path}: {source}")]
    ParseError {
        /// Path of the file, or `<inline>` for string input
        path: String,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A field holds a value the bus cannot accept.
    #[error("invalid config field {field}: {message}")]
    ValidationError {
        /// Dotted field name
        field: String,
        /// What is wrong with it
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
