//! Bus configuration and TOML loading.
//!
//! A config file is a flat TOML document:
//!
//! ```toml
//! name = "ui"
//! preregistered_types = ["authorize"]
//! log_payloads = false
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Name used by buses built without an explicit config.
pub const DEFAULT_BUS_NAME: &str = "default";

/// Configuration for a single [`EventBus`](crate::EventBus).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    /// Name reported in log fields.
    pub name: String,
    /// Event types whose listener slots exist from construction.
    pub preregistered_types: Vec<String>,
    /// Include payload JSON in trace-level emission logs.
    pub log_payloads: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_BUS_NAME.to_string(),
            preregistered_types: Vec::new(),
            log_payloads: false,
        }
    }
}

impl BusConfig {
    /// Create a config with the given bus name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Pre-register an event type.
    #[must_use]
    pub fn with_preregistered(mut self, event_type: impl Into<String>) -> Self {
        self.preregistered_types.push(event_type.into());
        self
    }

    /// Enable or disable payload logging.
    #[must_use]
    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// Parse and validate a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed TOML or unknown
    /// fields, and [`ConfigError::ValidationError`] if validation fails.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        parse(content, "<inline>")
    }

    /// Read, parse and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read, plus
    /// everything [`BusConfig::from_toml_str`] can return.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = parse(&content, &path.display().to_string())?;
        debug!(path = %path.display(), bus = %config.name, "loaded bus config");
        Ok(config)
    }

    /// Check the config for values the bus cannot use.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::ValidationError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "name".to_owned(),
                message: "bus name must not be empty".to_owned(),
            });
        }

        let mut seen = HashSet::new();
        for event_type in &self.preregistered_types {
            if event_type.is_empty() {
                return Err(ConfigError::ValidationError {
                    field: "preregistered_types".to_owned(),
                    message: "event type must not be empty".to_owned(),
                });
            }
            if !seen.insert(event_type.as_str()) {
                return Err(ConfigError::ValidationError {
                    field: "preregistered_types".to_owned(),
                    message: format!("event type '{event_type}' is listed more than once"),
                });
            }
        }

        Ok(())
    }
}

fn parse(content: &str, path: &str) -> ConfigResult<BusConfig> {
    let config: BusConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_owned(),
        source: e,
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BusConfig::default();
        assert_eq!(config.name, DEFAULT_BUS_NAME);
        assert!(config.preregistered_types.is_empty());
        assert!(!config.log_payloads);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = BusConfig::from_toml_str("").unwrap();
        assert_eq!(config, BusConfig::default());
    }

    #[test]
    fn test_parse_full_document() {
        let config = BusConfig::from_toml_str(
            r#"
            name = "ui"
            preregistered_types = ["authorize", "session.ready"]
            log_payloads = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            BusConfig::new("ui")
                .with_preregistered("authorize")
                .with_preregistered("session.ready")
                .with_payload_logging(true)
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = BusConfig::from_toml_str("capacity = 10").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { ref path, .. } if path == "<inline>"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = BusConfig::from_toml_str(r#"name = "   ""#).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let err = BusConfig::new("dup")
            .with_preregistered("authorize")
            .with_preregistered("authorize")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_empty_type_rejected() {
        let err = BusConfig::new("x").with_preregistered("").validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "preregistered_types")
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"from-file\"").unwrap();
        file.flush().unwrap();

        let config = BusConfig::load(file.path()).unwrap();
        assert_eq!(config.name, "from-file");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BusConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
