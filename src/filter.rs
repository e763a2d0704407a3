//! Field predicates used by entry and listing definitions.
//!
//! ```toml
//! filter = [
//!     { field = "title", op = "contains", value = "Rabbit" },
//!     { field = "featured", op = "exists" },
//! ]
//! ```
//!
//! A list of filters passes only when every filter passes. A filter that
//! names a field the entry does not have is an error, except for `exists`.

use crate::config::OrderBy;
use crate::error::RenderError;
use crate::types::Entry;
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Equals,
    NotEquals,
    /// Substring match on strings, membership on arrays.
    Contains,
    Exists,
    /// Field value is one of the listed values.
    In,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: Option<Value>,
}

impl FieldFilter {
    pub fn new(field: &str, op: FilterOp, value: Option<Value>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value,
        }
    }

    /// Check the filter is well-formed. Returns a human-readable problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.field.is_empty() {
            return Err("filter field must not be empty".into());
        }
        match (self.op, &self.value) {
            (FilterOp::Exists, _) => Ok(()),
            (FilterOp::In, Some(Value::Array(_))) => Ok(()),
            (FilterOp::In, _) => Err(format!(
                "filter on '{}': op 'in' needs an array value",
                self.field
            )),
            (_, None) => Err(format!("filter on '{}' needs a value", self.field)),
            _ => Ok(()),
        }
    }

    pub fn matches(&self, entry: &Entry) -> Result<bool, RenderError> {
        if self.op == FilterOp::Exists {
            return Ok(entry.field(&self.field).is_some_and(|v| !v.is_null()));
        }
        let actual = entry
            .field(&self.field)
            .ok_or_else(|| RenderError::missing_field(&entry.id, &self.field))?;
        let expected = self.value.as_ref().unwrap_or(&NULL);

        Ok(match self.op {
            FilterOp::Equals => values_equal(actual, expected),
            FilterOp::NotEquals => !values_equal(actual, expected),
            FilterOp::Contains => match (actual, expected) {
                (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
                (Value::Array(items), needle) => items.iter().any(|i| values_equal(i, needle)),
                _ => false,
            },
            FilterOp::In => match expected {
                Value::Array(options) => options.iter().any(|o| values_equal(actual, o)),
                _ => false,
            },
            FilterOp::Exists => unreachable!("handled above"),
        })
    }
}

static NULL: Value = Value::Null;

/// Evaluate every filter against `entry`; all must pass.
pub fn matches_all(filters: &[FieldFilter], entry: &Entry) -> Result<bool, RenderError> {
    for filter in filters {
        if !filter.matches(entry)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// JSON equality that treats `5` and `5.0` as the same number, since TOML and
/// the CMS disagree on integer vs float for the same literal.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total order over field values for `order_by`. Values of different JSON
/// types order by type: null, bool, number, string, array, object.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Sort `items` by the `order_by` field of the entry `entry_of` returns.
/// Stable; every entry must have the field.
pub(crate) fn sort_by_field<T>(
    items: &mut [T],
    order_by: &OrderBy,
    entry_of: impl Fn(&T) -> Option<&Entry>,
) -> Result<(), RenderError> {
    for item in items.iter() {
        if let Some(entry) = entry_of(item)
            && entry.field(&order_by.field).is_none()
        {
            return Err(RenderError::missing_field(&entry.id, &order_by.field));
        }
    }
    items.sort_by(|a, b| {
        let ka = entry_of(a).and_then(|e| e.field(&order_by.field));
        let kb = entry_of(b).and_then(|e| e.field(&order_by.field));
        let ord = match (ka, kb) {
            (Some(x), Some(y)) => compare_values(x, y),
            _ => Ordering::Equal,
        };
        if order_by.descending { ord.reverse() } else { ord }
    });
    Ok(())
}
