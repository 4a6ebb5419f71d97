//! RPC Value Model
//!
//! This module provides `RpcValue`, a tagged sum over every JSON shape that
//! can travel as a JSON-RPC argument or result. Conversions to and from
//! `serde_json::Value` are total: every JSON value maps to exactly one
//! variant and back without loss.
//!
//! The only wire-level caveat is the integer/double split: JSON does not
//! distinguish `3` from `3.0` beyond the presence of a decimal point or
//! exponent, so a whole-valued double may come back as `Integer`.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use serde_json::{Map, Number, Value};

/// A JSON-RPC argument or result value
///
/// Structural equality via `PartialEq`; `Dict` key order is not preserved.
///
/// # Examples
///
/// ```rust
/// use wirerpc::protocol::RpcValue;
/// use serde_json::json;
///
/// let value = RpcValue::from(json!({"op": "add", "args": [1, 2]}));
/// assert_eq!(value.get("op").and_then(RpcValue::as_str), Some("add"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RpcValue {
    /// JSON null, or absent params
    None,
    /// JSON boolean
    Bool(bool),
    /// JSON number without decimal point or exponent
    Integer(i64),
    /// JSON number carrying a decimal point or exponent
    Double(f64),
    /// JSON string
    String(String),
    /// JSON array
    List(Vec<RpcValue>),
    /// JSON object
    Dict(HashMap<String, RpcValue>),
}

impl RpcValue {
    /// Borrow the inner integer, if this is an `Integer`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RpcValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow the inner float, widening `Integer` as needed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RpcValue::Double(d) => Some(*d),
            RpcValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Borrow the inner boolean, if this is a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RpcValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the inner string, if this is a `String`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RpcValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the inner list, if this is a `List`
    pub fn as_list(&self) -> Option<&[RpcValue]> {
        match self {
            RpcValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key, if this is a `Dict`
    pub fn get(&self, key: &str) -> Option<&RpcValue> {
        match self {
            RpcValue::Dict(map) => map.get(key),
            _ => None,
        }
    }

    /// True for the `None` variant
    pub fn is_none(&self) -> bool {
        matches!(self, RpcValue::None)
    }
}

impl From<Value> for RpcValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RpcValue::None,
            Value::Bool(b) => RpcValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RpcValue::Integer(i),
                // Out-of-range integers degrade to double as well
                None => RpcValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => RpcValue::String(s),
            Value::Array(items) => RpcValue::List(items.into_iter().map(RpcValue::from).collect()),
            Value::Object(map) => RpcValue::Dict(
                map.into_iter()
                    .map(|(k, v)| (k, RpcValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Option<Value>> for RpcValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(RpcValue::None, RpcValue::from)
    }
}

impl From<RpcValue> for Value {
    fn from(value: RpcValue) -> Self {
        match value {
            RpcValue::None => Value::Null,
            RpcValue::Bool(b) => Value::Bool(b),
            RpcValue::Integer(n) => Value::Number(Number::from(n)),
            RpcValue::Double(d) => Number::from_f64(d).map_or(Value::Null, Value::Number),
            RpcValue::String(s) => Value::String(s),
            RpcValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            RpcValue::Dict(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<i64> for RpcValue {
    fn from(n: i64) -> Self {
        RpcValue::Integer(n)
    }
}

impl From<f64> for RpcValue {
    fn from(d: f64) -> Self {
        RpcValue::Double(d)
    }
}

impl From<bool> for RpcValue {
    fn from(b: bool) -> Self {
        RpcValue::Bool(b)
    }
}

impl From<&str> for RpcValue {
    fn from(s: &str) -> Self {
        RpcValue::String(s.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(s: String) -> Self {
        RpcValue::String(s)
    }
}

impl From<Vec<RpcValue>> for RpcValue {
    fn from(items: Vec<RpcValue>) -> Self {
        RpcValue::List(items)
    }
}
