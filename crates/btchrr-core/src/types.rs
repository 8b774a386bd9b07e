//! Core types for btchrr

use serde::{Deserialize, Serialize};

/// A bind value passed to the executor alongside a batched statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// UTF-8 string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// JSON value, bound as its serialized text
    Json(serde_json::Value),
}

impl Value {
    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Scalars map onto their natural variant; arrays and objects stay JSON.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int64(i),
                None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Json(other),
        }
    }
}

/// An item supplied by the caller: one logical row.
///
/// The batching engine never looks inside an item. Only the executor call
/// flattens a group's items, in order, into the statement's bind values.
pub trait BindItem {
    /// Append this item's bind values to `out`
    fn bind_values(&self, out: &mut Vec<Value>);
}

impl BindItem for Value {
    fn bind_values(&self, out: &mut Vec<Value>) {
        out.push(self.clone());
    }
}

impl BindItem for Vec<Value> {
    fn bind_values(&self, out: &mut Vec<Value>) {
        out.extend(self.iter().cloned());
    }
}

impl<const N: usize> BindItem for [Value; N] {
    fn bind_values(&self, out: &mut Vec<Value>) {
        out.extend(self.iter().cloned());
    }
}

/// Flatten a group of items into one parameter list
pub fn flatten_bind_values<T: BindItem>(items: &[T]) -> Vec<Value> {
    let mut out = Vec::new();
    for item in items {
        item.bind_values(&mut out);
    }
    out
}

/// Outcome of executing one batched statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Rows affected by the statement
    pub affected_rows: u64,
    /// Identifier of the last inserted row, if the database reports one
    pub last_insert_id: Option<i64>,
}

impl ExecutionOutcome {
    pub fn new(affected_rows: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            affected_rows,
            last_insert_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_json_scalars() {
        assert_eq!(Value::from(serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from(serde_json::json!(true)), Value::Bool(true));
        assert_eq!(Value::from(serde_json::json!(42)), Value::Int64(42));
        assert_eq!(Value::from(serde_json::json!(1.5)), Value::Float64(1.5));
        assert_eq!(
            Value::from(serde_json::json!("alice")),
            Value::String("alice".into())
        );
    }

    #[test]
    fn test_value_from_json_compound_stays_json() {
        let v = serde_json::json!({"a": [1, 2]});
        assert_eq!(Value::from(v.clone()), Value::Json(v));
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }

    #[test]
    fn test_flatten_preserves_item_order() {
        let items = vec![
            vec![Value::from(1), Value::from("a")],
            vec![Value::from(2), Value::from("b")],
        ];

        let flat = flatten_bind_values(&items);

        assert_eq!(
            flat,
            vec![
                Value::Int64(1),
                Value::String("a".into()),
                Value::Int64(2),
                Value::String("b".into()),
            ]
        );
    }

    #[test]
    fn test_flatten_scalar_items() {
        let items = [Value::from(7), Value::Null];
        assert_eq!(flatten_bind_values(&items), vec![Value::Int64(7), Value::Null]);
    }

    #[test]
    fn test_flatten_array_items() {
        let items = [[Value::from(1), Value::from(2)], [Value::from(3), Value::from(4)]];
        assert_eq!(flatten_bind_values(&items).len(), 4);
    }
}
