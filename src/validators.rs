//! Field validator predicates
//!
//! Each family is a closed enum. Validators are passed to the changeset as
//! ordered `(validator, threshold)` pairs; their keys parse from the names
//! clients use (`"greaterThanOrEqualTo"`, `"min"`) so rule files can refer
//! to them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::value::format_number;

/// Message appended by [`validate_required`](crate::Changeset::validate_required)
pub const BLANK_MESSAGE: &str = "can't be blank";

/// Default message appended by [`validate_format`](crate::Changeset::validate_format)
pub const INVALID_FORMAT_MESSAGE: &str = "has invalid format";

/// Whether a value counts as missing for required-presence checks.
///
/// Only absent, `null` and `""` are blank; `0` and `false` are present.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

// =============================================================================
// Number validators
// =============================================================================

/// Numeric comparison against a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberValidator {
    LessThan,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
}

impl NumberValidator {
    pub const ALL: [NumberValidator; 4] = [
        NumberValidator::LessThan,
        NumberValidator::GreaterThan,
        NumberValidator::GreaterThanOrEqualTo,
        NumberValidator::LessThanOrEqualTo,
    ];

    /// Key used in rule files
    pub fn key(&self) -> &'static str {
        match self {
            NumberValidator::LessThan => "lessThan",
            NumberValidator::GreaterThan => "greaterThan",
            NumberValidator::GreaterThanOrEqualTo => "greaterThanOrEqualTo",
            NumberValidator::LessThanOrEqualTo => "lessThanOrEqualTo",
        }
    }

    /// Words used in the error message
    pub fn phrase(&self) -> &'static str {
        match self {
            NumberValidator::LessThan => "less than",
            NumberValidator::GreaterThan => "greater than",
            NumberValidator::GreaterThanOrEqualTo => "greater than or equal to",
            NumberValidator::LessThanOrEqualTo => "less than or equal to",
        }
    }

    /// Returns true when `value` passes
    pub fn check(&self, value: f64, expected: f64) -> bool {
        match self {
            NumberValidator::LessThan => value < expected,
            NumberValidator::GreaterThan => value > expected,
            NumberValidator::GreaterThanOrEqualTo => value >= expected,
            NumberValidator::LessThanOrEqualTo => value <= expected,
        }
    }

    /// Failure message, e.g. `must be greater than or equal to 18`
    pub fn message(&self, expected: f64) -> String {
        format!("must be {} {}", self.phrase(), format_number(expected))
    }
}

impl fmt::Display for NumberValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for NumberValidator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NumberValidator::ALL
            .into_iter()
            .find(|v| v.key() == s)
            .ok_or_else(|| format!("unknown number validator '{}'", s))
    }
}

// =============================================================================
// Length validators
// =============================================================================

/// String length comparison, measured in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthValidator {
    Min,
    Max,
    Is,
}

impl LengthValidator {
    pub const ALL: [LengthValidator; 3] =
        [LengthValidator::Min, LengthValidator::Max, LengthValidator::Is];

    pub fn key(&self) -> &'static str {
        match self {
            LengthValidator::Min => "min",
            LengthValidator::Max => "max",
            LengthValidator::Is => "is",
        }
    }

    /// Returns true when `value` passes
    pub fn check(&self, value: &str, length: usize) -> bool {
        let actual = value.chars().count();
        match self {
            LengthValidator::Min => actual >= length,
            LengthValidator::Max => actual <= length,
            LengthValidator::Is => actual == length,
        }
    }

    /// Failure message, e.g. `length is invalid, expected: min: 3`
    pub fn message(&self, length: usize) -> String {
        format!("length is invalid, expected: {}: {}", self.key(), length)
    }
}

impl fmt::Display for LengthValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LengthValidator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LengthValidator::ALL
            .into_iter()
            .find(|v| v.key() == s)
            .ok_or_else(|| format!("unknown length validator '{}'", s))
    }
}
