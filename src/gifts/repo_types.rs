use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A gift document. Only `id` has meaning to the service; every other field
/// is stored and returned untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gift(pub Map<String, Value>);

impl Gift {
    /// Wraps a JSON value, rejecting anything but an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// Returns the gift's id, assigning a fresh one if it has none.
    pub fn ensure_id(&mut self) -> String {
        if let Some(id) = self.id() {
            return id.to_string();
        }
        let id = Uuid::new_v4().to_string();
        self.0.insert("id".into(), Value::String(id.clone()));
        id
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn number_field(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }
}
