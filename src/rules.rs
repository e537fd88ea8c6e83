//! Declarative validation rules
//!
//! Rules describe a validation chain as data so it can live next to a
//! schema file. Validator keys are the client-facing names
//! (`greaterThanOrEqualTo`, `min`, ...). Unknown keys are logged and skipped.
//!
//! ## Example rule file (rules.toml):
//! ```toml
//! [[rules]]
//! required = ["name", "email"]
//!
//! [[rules]]
//! number = { field = "age", checks = { greaterThanOrEqualTo = 18 } }
//!
//! [[rules]]
//! length = { field = "name", checks = { min = 2, max = 64 } }
//!
//! [[rules]]
//! format = { field = "email", pattern = "^[^@]+@[^@]+$", message = "must be an email" }
//! ```
//!
//! Checks inside one rule run in key order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use crate::changeset::Changeset;
use crate::error::{ChangesetError, Result};
use crate::validators::{LengthValidator, NumberValidator};

/// A single validation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    /// Fields that must not be blank
    Required(Vec<String>),
    /// Numeric thresholds keyed by validator name
    Number {
        field: String,
        checks: BTreeMap<String, f64>,
    },
    /// Length bounds keyed by `min`, `max` or `is`
    Length {
        field: String,
        checks: BTreeMap<String, usize>,
    },
    /// Regex the value must match
    Format {
        field: String,
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl Rule {
    /// Run this rule against a changeset
    pub fn apply(&self, changeset: Changeset) -> Result<Changeset> {
        let changeset = match self {
            Rule::Required(fields) => changeset.validate_required(fields.as_slice()),
            Rule::Number { field, checks } => {
                let checks: Vec<(NumberValidator, f64)> = known_checks(field, checks);
                changeset.validate_number(field, &checks)
            }
            Rule::Length { field, checks } => {
                let checks: Vec<(LengthValidator, usize)> = known_checks(field, checks);
                changeset.validate_length(field, &checks)
            }
            Rule::Format {
                field,
                pattern,
                message,
            } => {
                let regex = Regex::new(pattern).map_err(|source| ChangesetError::InvalidPattern {
                    field: field.clone(),
                    source,
                })?;
                changeset.validate_format(field, &regex, message.as_deref())
            }
        };
        Ok(changeset)
    }
}

fn known_checks<V, T>(field: &str, checks: &BTreeMap<String, T>) -> Vec<(V, T)>
where
    V: std::str::FromStr<Err = String>,
    T: Copy,
{
    checks
        .iter()
        .filter_map(|(key, threshold)| match key.parse::<V>() {
            Ok(validator) => Some((validator, *threshold)),
            Err(reason) => {
                warn!(field = %field, %reason, "skipping unknown validator");
                None
            }
        })
        .collect()
}

/// An ordered list of rules, usually loaded from a file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a rule file, choosing the format from the extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(ChangesetError::UnsupportedFormat(format!(
                "{} (extension {:?})",
                path.display(),
                other
            ))),
        }
    }
}

impl Changeset {
    /// Apply every rule in order. Errors accumulate; only a malformed
    /// format pattern stops the chain.
    pub fn apply_rules(self, rules: &RuleSet) -> Result<Self> {
        rules.rules.iter().try_fold(self, |changeset, rule| rule.apply(changeset))
    }
}
