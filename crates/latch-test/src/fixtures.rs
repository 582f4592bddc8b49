//! Payload fixtures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A typed payload with nested data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEvent {
    /// User name.
    pub user: String,
    /// Session token.
    pub token: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

/// Create a login payload with default values.
#[must_use]
pub fn test_login() -> LoginEvent {
    test_login_for("ada")
}

/// Create a login payload for a specific user.
#[must_use]
pub fn test_login_for(user: impl Into<String>) -> LoginEvent {
    LoginEvent {
        user: user.into(),
        token: "tok-123".to_string(),
        scopes: vec!["read".to_string(), "write".to_string()],
    }
}

/// Create an untyped JSON payload.
#[must_use]
pub fn test_json_payload() -> Value {
    json!({
        "id": 7,
        "tags": ["a", "b"],
        "nested": {"depth": 2, "ok": true}
    })
}

/// A payload that cannot be snapshotted: its map keys are not strings.
#[must_use]
pub fn unserializable_payload() -> HashMap<(u8, u8), &'static str> {
    let mut map = HashMap::new();
    map.insert((0, 0), "origin");
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_fixture() {
        let login = test_login();
        assert_eq!(login.user, "ada");
        assert_eq!(login.scopes.len(), 2);
    }

    #[test]
    fn test_login_for_fixture() {
        assert_eq!(test_login_for("grace").user, "grace");
    }

    #[test]
    fn test_unserializable_fixture() {
        assert!(serde_json::to_value(unserializable_payload()).is_err());
    }
}
