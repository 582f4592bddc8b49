//! Immutable payload snapshots handed to listeners.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BusError, BusResult};

/// A frozen, structurally copied event payload.
///
/// Created once per emission by serializing the payload into a JSON value.
/// The copy is detached from the caller's value, so later mutation of the
/// original is never observed. Clones share the same underlying value and
/// only shared access is exposed:
///
/// ```compile_fail
/// let bus = latch_events::EventBus::new();
/// bus.emit_buffered("t", &serde_json::json!({ "id": 1 })).unwrap();
/// let snapshot = bus.buffered("t").unwrap();
/// let value: &mut serde_json::Value = &mut *snapshot;
/// ```
#[derive(Clone, PartialEq)]
pub struct Snapshot(Arc<Value>);

impl Snapshot {
    /// Capture a payload.
    pub(crate) fn capture<T>(payload: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(payload).map(|value| Self(Arc::new(value)))
    }

    /// The snapshot as a JSON value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Decode the snapshot into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Decode`] if the snapshot does not have the shape
    /// `T` expects.
    pub fn decode<'a, T>(&'a self) -> BusResult<T>
    where
        T: Deserialize<'a>,
    {
        T::deserialize(self.0.as_ref()).map_err(BusError::Decode)
    }

    /// Whether two snapshots come from the same emission.
    #[must_use]
    pub fn same_emission(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Snapshot {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl PartialEq<Value> for Snapshot {
    fn eq(&self, other: &Value) -> bool {
        self.0.as_ref() == other
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Snapshot").field(self.0.as_ref()).finish()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0.as_ref(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Login {
        user: String,
        scopes: Vec<String>,
    }

    #[test]
    fn test_capture_is_detached_from_original() {
        let mut original = Login {
            user: "ada".to_string(),
            scopes: vec!["read".to_string()],
        };
        let snapshot = Snapshot::capture(&original).unwrap();

        original.user = "mallory".to_string();
        original.scopes.push("admin".to_string());

        assert_eq!(snapshot, json!({"user": "ada", "scopes": ["read"]}));
    }

    #[test]
    fn test_decode_round_trips_typed_payload() {
        let snapshot = Snapshot::capture(&Login {
            user: "ada".to_string(),
            scopes: vec![],
        })
        .unwrap();

        let decoded: Login = snapshot.decode().unwrap();
        assert_eq!(decoded.user, "ada");
        assert!(decoded.scopes.is_empty());
    }

    #[test]
    fn test_decode_borrows_strings() {
        let snapshot = Snapshot::capture("borrowed").unwrap();
        let text: &str = snapshot.decode().unwrap();
        assert_eq!(text, "borrowed");
    }

    #[test]
    fn test_decode_wrong_shape() {
        let snapshot = Snapshot::capture(&42).unwrap();
        let result: BusResult<Login> = snapshot.decode();
        assert!(matches!(result, Err(BusError::Decode(_))));
    }

    #[test]
    fn test_non_string_map_keys_rejected() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "bytes as key");
        assert!(Snapshot::capture(&map).is_err());
    }

    #[test]
    fn test_clones_share_emission() {
        let a = Snapshot::capture(&json!({"n": 1})).unwrap();
        let b = a.clone();
        let c = Snapshot::capture(&json!({"n": 1})).unwrap();

        assert!(a.same_emission(&b));
        assert!(!a.same_emission(&c));
        assert_eq!(a, c);
        assert_eq!(a["n"], 1);
        assert_eq!(a.to_string(), r#"{"n":1}"#);
    }
}
