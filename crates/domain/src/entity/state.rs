//! Typed state values held in an entity's property bag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named properties of an entity, ordered by key.
pub type StateMap = BTreeMap<String, StateValue>;

/// A single heterogeneous state value.
///
/// Equality is semantic for numbers: `Int(21)` equals `Float(21.0)`, so a
/// history diff does not report a change when only the representation moved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Nested structure, used for derived fields such as a pending schedule.
    Json(serde_json::Value),
}

impl StateValue {
    /// Numeric view of `Int` and `Float` values.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl PartialEq for StateValue {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for StateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<StateValue>> From<Option<T>> for StateValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for StateValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            serde_json::Value::String(s) => Self::String(s),
            other => Self::Json(other),
        }
    }
}

impl From<&StateValue> for serde_json::Value {
    fn from(value: &StateValue) -> Self {
        match value {
            StateValue::Null => Self::Null,
            StateValue::Bool(b) => Self::Bool(*b),
            StateValue::Int(i) => Self::from(*i),
            StateValue::Float(f) => serde_json::Number::from_f64(*f).map_or(Self::Null, Self::Number),
            StateValue::String(s) => Self::String(s.clone()),
            StateValue::Json(v) => v.clone(),
        }
    }
}

/// Render a state map as a JSON object.
#[must_use]
pub fn state_to_json(state: &StateMap) -> serde_json::Value {
    serde_json::Value::Object(
        state
            .iter()
            .map(|(key, value)| (key.clone(), serde_json::Value::from(value)))
            .collect(),
    )
}

/// Build a [`StateMap`] from `(key, value)` pairs.
///
/// ```
/// use homesim_domain::entity::{state_map, StateValue};
///
/// let patch = state_map([("power", true.into()), ("brightness", 80.into())]);
/// assert_eq!(patch.get("brightness"), Some(&StateValue::Int(80)));
/// ```
#[must_use]
pub fn state_map<K, I>(entries: I) -> StateMap
where
    K: Into<String>,
    I: IntoIterator<Item = (K, StateValue)>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value))
        .collect()
}
