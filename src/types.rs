//! Field types and their coercion functions

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::value;

/// Declared type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Whole numbers (coerced with JavaScript `Number`)
    Integer,
    /// Raw bytes
    Binary,
    /// Floating-point numbers (coerced with JavaScript `Number`)
    Float,
    /// True/false
    Boolean,
    /// Text
    String,
    /// Decimal numbers carried as text to avoid float rounding
    Decimal,
}

impl FieldType {
    /// All field types, in declaration order
    pub const ALL: [FieldType; 6] = [
        FieldType::Integer,
        FieldType::Binary,
        FieldType::Float,
        FieldType::Boolean,
        FieldType::String,
        FieldType::Decimal,
    ];

    /// Get the type name used in schema files
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Binary => "binary",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::String => "string",
            FieldType::Decimal => "decimal",
        }
    }

    /// Coerce a raw param into this type.
    ///
    /// Coercion is best-effort and never fails. `None` is the "not a
    /// number" outcome of numeric coercion; it compares unequal to every
    /// baseline value and is recorded as `null`.
    pub fn coerce(&self, raw: &Value) -> Option<Value> {
        match self {
            FieldType::Integer | FieldType::Float => {
                value::to_number(raw).and_then(value::number_value)
            }
            FieldType::String | FieldType::Decimal => Some(if value::is_truthy(raw) {
                Value::String(value::to_text(raw))
            } else {
                Value::Null
            }),
            FieldType::Boolean => Some(Value::Bool(value::is_truthy(raw))),
            FieldType::Binary => Some(value::to_bytes(raw)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown field type '{}'", s))
    }
}
