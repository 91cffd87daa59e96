//! Value coercion
//!
//! Best-effort conversion of query/form strings and decoded JSON values into
//! handler types. Conversions never fail outward: [`convert`] hands back the
//! target's zero value together with `ok = false`, and callers keep the value
//! either way.

use super::types::Typed;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Number, Value};

/// Separator used when a key or header carries several values
pub const MULTI_VALUE_SEPARATOR: char = ';';

/// Coerce `value` into `T`, falling back to `T::zero()`.
///
/// An absent value is a failed conversion.
pub fn convert<T: Typed>(value: Option<&Value>) -> (T, bool) {
    match value.and_then(T::from_value) {
        Some(converted) => (converted, true),
        None => (T::zero(), false),
    }
}

/// Deserialize a whole request body into `T`, falling back to `T::zero()`.
pub fn convert_body<T: Typed>(body: &[u8]) -> (T, bool) {
    match T::from_body(body) {
        Some(converted) => (converted, true),
        None => (T::zero(), false),
    }
}

/// Render a value as the plain text used for scalar response bodies
pub fn to_display_string(value: &Value) -> String {
    to_string_value(value).unwrap_or_default()
}

pub fn to_string_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| whole_float(n, I64_MIN_F64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

pub fn to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| whole_float(n, 0.0)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    }
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}

/// JSON number for a finite float, its text form (`NaN`, `inf`) otherwise
pub fn float_value(f: f64) -> Value {
    Number::from_f64(f).map_or_else(|| Value::String(f.to_string()), Value::Number)
}

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") || s == "1" {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") || s == "0" {
                Some(false)
            } else {
                None
            }
        }
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
const I64_MIN_F64: f64 = i64::MIN as f64;

/// A JSON float with no fractional part, inside `[min, 2^63)` or `[0, 2^64)`
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn whole_float<T: TryFrom<i128>>(n: &Number, min: f64) -> Option<T> {
    let f = n.as_f64()?;
    if !f.is_finite() || f.fract() != 0.0 || f < min || f >= u64::MAX as f64 {
        return None;
    }
    T::try_from(f as i128).ok()
}

pub fn structured_from_value<T: DeserializeOwned>(value: &Value) -> Option<T> {
    match value {
        Value::Null => None,
        // A JSON document smuggled through a query or form field
        Value::String(text) => serde_json::from_str(text).ok(),
        _ => T::deserialize(value).ok(),
    }
}

pub fn structured_from_body<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Request body does not match the declared DTO");
            None
        }
    }
}

pub fn structured_to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to serialize return value");
        Value::Null
    })
}
