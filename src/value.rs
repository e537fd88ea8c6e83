//! JavaScript-compatible value semantics
//!
//! Params arrive from form posts and JSON payloads produced by JavaScript
//! clients, so coercion and comparison follow the rules those clients use:
//! truthiness, `Number()`, `String()` and `===`. Everything here is a pure
//! function over [`serde_json::Value`].

use serde_json::{Map, Value};

/// A flat record of named values (baseline, params, projected output)
pub type Record = Map<String, Value>;

/// JavaScript truthiness
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// JavaScript strict equality (`===`)
///
/// Numbers compare by numeric value, so `17` equals `17.0`. Arrays and
/// objects compare by identity in JavaScript; two values handled here are
/// never the same allocation, so they are never equal.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        _ => false,
    }
}

/// `Number(value)`. `None` stands for `NaN`.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_numeric_text(s)?,
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [only] => parse_numeric_text(&join_text(only))?,
            _ => return None,
        },
        Value::Object(_) => return None,
    };
    if n.is_nan() {
        None
    } else {
        Some(n)
    }
}

/// Convert a finite number to a JSON value, preferring the integer form.
///
/// Non-finite numbers have no JSON form and come back as `None`.
pub fn number_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        return Some(Value::from(n as i64));
    }
    serde_json::Number::from_f64(n).map(Value::Number)
}

/// `String(value)`
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_f64() {
                n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())
            } else {
                n.to_string()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(join_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Format a number the way JavaScript prints it: integral values carry no
/// fractional part, and magnitudes from `1e21` up or below `1e-6` use
/// exponent form (`1e+21`, `1.5e-7`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = n.abs();
    if n != 0.0 && (magnitude >= 1e21 || magnitude < 1e-6) {
        let text = format!("{:e}", n);
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        };
    }

    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// `Buffer.from(value)` rendered as an array of byte values.
///
/// Strings become their UTF-8 bytes, array elements are wrapped into
/// `0..=255`. Any other shape has no byte form and yields `null`.
pub fn to_bytes(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::Array(s.bytes().map(Value::from).collect()),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| {
                    let n = to_number(item).unwrap_or(0.0);
                    let byte = if n.is_finite() {
                        (n.trunc() as i64).rem_euclid(256)
                    } else {
                        0
                    };
                    Value::from(byte)
                })
                .collect(),
        ),
        _ => Value::Null,
    }
}

/// Element text inside `Array.prototype.join`: `null` renders empty.
fn join_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => to_text(other),
    }
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    // Rust's float parser also accepts "inf" and "nan"; JavaScript does not.
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
