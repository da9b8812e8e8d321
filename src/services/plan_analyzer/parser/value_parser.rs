//! Lenient value coercion for plan document fields
//!
//! `EXPLAIN` output produced by different client libraries is not uniform: numbers can arrive
//! as JSON numbers or numeric strings, list fields as arrays or comma separated strings. Missing
//! or unparsable numerics degrade to zero instead of failing the whole document.

use crate::utils::StringExt;
use serde_json::Value;

/// Value parser for plan document fields
pub struct ValueParser;

impl ValueParser {
    /// Coerce to `f64`, zero when absent or unparsable
    pub fn as_f64(value: Option<&Value>) -> f64 {
        match value {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            Some(Value::Bool(b)) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            },
            _ => 0.0,
        }
    }

    /// Coerce to `i64`, rounding fractional values, zero when absent or unparsable
    pub fn as_i64(value: Option<&Value>) -> i64 {
        match value {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => {
                let s = s.trim();
                if s.contains('.') {
                    s.parse::<f64>().map(|f| f.round() as i64).unwrap_or(0)
                } else {
                    s.parse::<i64>().unwrap_or(0)
                }
            },
            _ => 0,
        }
    }

    /// Coerce to a trimmed, non-empty string
    pub fn as_string(value: Option<&Value>) -> Option<String> {
        match value? {
            Value::Null => None,
            Value::String(s) => s.clean(),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Coerce to a list of strings; accepts arrays and comma separated strings
    pub fn as_string_list(value: Option<&Value>) -> Vec<String> {
        match value {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| Self::as_string(Some(item)))
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}
