//! The changeset: casting, change tracking and validation for one edit cycle
//!
//! A [`Changeset`] starts from a baseline record and a schema. Params are
//! cast into the schema's types and recorded only when they differ from the
//! baseline. Validators then read the effective values and append errors;
//! they never stop the chain. The final state is read through
//! [`is_valid`](Changeset::is_valid), [`errors`](Changeset::errors),
//! [`apply_changes`](Changeset::apply_changes) or a persistence projection.
//!
//! ```
//! use familiar_changeset::{Changeset, NumberValidator, SchemaBuilder};
//! use serde_json::json;
//!
//! let schema = SchemaBuilder::new().integer("age", None).build();
//! let params = json!({ "age": "17" });
//!
//! let changeset = Changeset::new(Default::default(), schema)
//!     .cast(params.as_object().unwrap(), &["age"])
//!     .unwrap()
//!     .validate_number("age", &[(NumberValidator::GreaterThanOrEqualTo, 18.0)]);
//!
//! assert!(!changeset.is_valid());
//! assert_eq!(changeset.errors()[0].message, "must be greater than or equal to 18");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::{ready, IntoFuture, Ready};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{ChangesetError, Result};
use crate::schema::Schema;
use crate::validators::{
    is_blank, LengthValidator, NumberValidator, BLANK_MESSAGE, INVALID_FORMAT_MESSAGE,
};
use crate::value::{is_truthy, strict_eq, Record};

/// A validation error attached to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Options for [`Changeset::cast_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastOptions {
    /// Strip surrounding whitespace from textual results
    pub trim_strings: bool,
}

impl Default for CastOptions {
    fn default() -> Self {
        Self { trim_strings: true }
    }
}

/// Pending changes and validation errors for one edit of a record
#[derive(Debug, Clone)]
pub struct Changeset {
    /// The record being edited. Never mutated.
    baseline: Record,
    schema: Arc<Schema>,
    /// Only fields that differ from the baseline, or were put explicitly
    changes: Record,
    /// Append-only, in call order
    errors: Vec<FieldError>,
}

impl Changeset {
    /// Create a changeset over `baseline`
    pub fn new(baseline: Record, schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            baseline,
            schema: schema.into(),
            changes: Record::new(),
            errors: Vec::new(),
        }
    }

    /// Create a changeset from a baseline that must be a JSON object
    pub fn from_value(baseline: Value, schema: impl Into<Arc<Schema>>) -> Result<Self> {
        match baseline {
            Value::Object(record) => Ok(Self::new(record, schema)),
            Value::Null => Ok(Self::new(Record::new(), schema)),
            other => Err(ChangesetError::InvalidRecord {
                what: "baseline".to_string(),
                found: json_type_name(&other).to_string(),
            }),
        }
    }

    pub fn baseline(&self) -> &Record {
        &self.baseline
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn changes(&self) -> &Record {
        &self.changes
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// True when no error has been recorded
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    // =========================================================================
    // Casting
    // =========================================================================

    /// Cast permitted params with default options (strings trimmed)
    pub fn cast<P: AsRef<str>>(self, params: &Record, permitted: &[P]) -> Result<Self> {
        self.cast_with(params, permitted, CastOptions::default())
    }

    /// Cast permitted params into the schema's types.
    ///
    /// Params that are not permitted are ignored. A permitted param that the
    /// schema does not declare aborts the whole cast with
    /// [`ChangesetError::UnknownField`]; nothing from this call is recorded.
    pub fn cast_with<P: AsRef<str>>(
        mut self,
        params: &Record,
        permitted: &[P],
        options: CastOptions,
    ) -> Result<Self> {
        let mut cast = Vec::new();

        for (field, raw) in params {
            if !permitted.iter().any(|p| p.as_ref() == field) {
                trace!(field = %field, "skipping param that is not permitted");
                continue;
            }

            let field_type = self
                .schema
                .field_type(field)
                .ok_or_else(|| ChangesetError::unknown_field(field.as_str()))?;

            let mut casted = field_type.coerce(raw);
            if options.trim_strings {
                if let Some(Value::String(text)) = &mut casted {
                    let trimmed = text.trim();
                    if trimmed.len() != text.len() {
                        *text = trimmed.to_string();
                    }
                }
            }

            let unchanged = match (&casted, self.baseline.get(field)) {
                (Some(value), Some(current)) => strict_eq(value, current),
                _ => false,
            };
            if unchanged {
                trace!(field = %field, "cast value equals baseline");
                continue;
            }

            // Falsy results (empty string, 0, false, NaN) are stored as null.
            let stored = casted.filter(is_truthy).unwrap_or(Value::Null);
            cast.push((field.clone(), stored));
        }

        debug!(
            fields = ?cast.iter().map(|(f, _)| f.as_str()).collect::<Vec<_>>(),
            "recorded cast changes"
        );
        self.changes.extend(cast);
        Ok(self)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Every listed field must have a non-blank effective value
    pub fn validate_required<F: AsRef<str>>(mut self, fields: &[F]) -> Self {
        for field in fields {
            let field = field.as_ref();
            if is_blank(self.get_field(field)) {
                self.push_error(field, BLANK_MESSAGE);
            }
        }
        self
    }

    /// Compare a numeric effective value against each threshold.
    ///
    /// Skipped when the effective value is not a number.
    pub fn validate_number(mut self, field: &str, checks: &[(NumberValidator, f64)]) -> Self {
        let Some(value) = self.get_field(field).and_then(Value::as_f64) else {
            return self;
        };
        for (validator, expected) in checks {
            if !validator.check(value, *expected) {
                self.push_error(field, validator.message(*expected));
            }
        }
        self
    }

    /// Compare the length of a textual effective value.
    ///
    /// Skipped when the effective value is not a string.
    pub fn validate_length(mut self, field: &str, checks: &[(LengthValidator, usize)]) -> Self {
        let Some(Value::String(value)) = self.get_field(field) else {
            return self;
        };
        let failed: Vec<String> = checks
            .iter()
            .filter(|(validator, length)| !validator.check(value, *length))
            .map(|(validator, length)| validator.message(*length))
            .collect();
        for message in failed {
            self.push_error(field, message);
        }
        self
    }

    /// A textual effective value must match `pattern` somewhere.
    ///
    /// Skipped when the effective value is not a string.
    pub fn validate_format(
        mut self,
        field: &str,
        pattern: &Regex,
        message: Option<&str>,
    ) -> Self {
        let Some(Value::String(value)) = self.get_field(field) else {
            return self;
        };
        if !pattern.is_match(value) {
            self.push_error(field, message.unwrap_or(INVALID_FORMAT_MESSAGE));
        }
        self
    }

    // =========================================================================
    // Direct mutation
    // =========================================================================

    /// Append an error without running a validator
    pub fn add_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.push_error(field, message);
        self
    }

    /// Record a change unconditionally, even when it equals the baseline
    pub fn put_change(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.changes.insert(field.into(), value.into());
        self
    }

    /// Hand the changeset to `f` and return whatever it returns
    pub fn tap<R>(self, f: impl FnOnce(Self) -> R) -> R {
        f(self)
    }

    fn push_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let error = FieldError::new(field, message);
        debug!(field = %error.field, message = %error.message, "validation error");
        self.errors.push(error);
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// True when the field has a pending change
    pub fn is_changed(&self, field: &str) -> bool {
        self.changes.contains_key(field)
    }

    /// The pending change for a field, without falling back to the baseline
    pub fn get_change(&self, field: &str) -> Option<&Value> {
        self.changes.get(field)
    }

    /// The effective value: pending change, else baseline
    pub fn get_field(&self, field: &str) -> Option<&Value> {
        self.get_change(field).or_else(|| self.baseline.get(field))
    }

    /// The baseline with all pending changes applied
    pub fn apply_changes(&self) -> Record {
        let mut record = self.baseline.clone();
        for (field, value) in &self.changes {
            record.insert(field.clone(), value.clone());
        }
        record
    }

    /// Error messages grouped by field, in the order they were added
    pub fn transform_errors(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in &self.errors {
            grouped
                .entry(error.field.clone())
                .or_default()
                .push(error.message.clone());
        }
        grouped
    }
}

/// Lets a changeset finish an async pipeline: `changeset.await` resolves
/// immediately to the changeset itself.
impl IntoFuture for Changeset {
    type Output = Changeset;
    type IntoFuture = Ready<Changeset>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
