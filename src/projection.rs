//! Persistence projection
//!
//! Turns the pending changes of a [`Changeset`] into the parameter shape a
//! storage write expects:
//!
//! - only changes are projected, never the baseline
//! - virtual fields are dropped
//! - `null` is replaced by the field's declared default; a field with no
//!   default is left out, so the write does not touch it
//! - fields the [`RelationPolicy`] recognises as foreign keys become
//!   `{ <relation>: { "connect": { "id": <value> } } }`, or are dropped
//!   when `null`
//!
//! Fields put on the changeset without a schema entry are projected as
//! plain, non-virtual fields without a default.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::changeset::Changeset;
use crate::value::Record;

/// Decides which fields are relation keys and what the relation is called
pub trait RelationPolicy {
    /// The relation a field connects, or `None` for a plain column
    fn relation_for(&self, field: &str) -> Option<String>;
}

/// Foreign keys are named `<relation><suffix>`, e.g. `authorId`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySuffix {
    suffix: String,
}

impl ForeignKeySuffix {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for ForeignKeySuffix {
    fn default() -> Self {
        Self::new("Id")
    }
}

impl RelationPolicy for ForeignKeySuffix {
    fn relation_for(&self, field: &str) -> Option<String> {
        if self.suffix.is_empty() {
            return None;
        }
        field
            .strip_suffix(self.suffix.as_str())
            .filter(|relation| !relation.is_empty())
            .map(String::from)
    }
}

/// No field is a relation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRelations;

impl RelationPolicy for NoRelations {
    fn relation_for(&self, _field: &str) -> Option<String> {
        None
    }
}

impl<F> RelationPolicy for F
where
    F: Fn(&str) -> Option<String>,
{
    fn relation_for(&self, field: &str) -> Option<String> {
        self(field)
    }
}

/// Casing applied to non-relation keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyCase {
    /// Keep the declared field name
    #[default]
    Preserve,
    /// Rename to `lower_snake_case`
    Snake,
}

impl KeyCase {
    pub fn apply(&self, field: &str) -> String {
        match self {
            KeyCase::Preserve => field.to_string(),
            KeyCase::Snake => to_snake_case(field),
        }
    }
}

impl Changeset {
    /// Project changes with the `<relation>Id` foreign-key convention
    pub fn to_persistence_params(&self) -> Record {
        self.project(&ForeignKeySuffix::default(), KeyCase::Preserve)
    }

    /// Project changes with a custom relation policy
    pub fn to_persistence_params_with(&self, policy: &dyn RelationPolicy) -> Record {
        self.project(policy, KeyCase::Preserve)
    }

    /// Like [`to_persistence_params`](Self::to_persistence_params), with
    /// plain keys renamed to `lower_snake_case`
    pub fn to_snake_case_params(&self) -> Record {
        self.project(&ForeignKeySuffix::default(), KeyCase::Snake)
    }

    /// Snake-case projection with a custom relation policy
    pub fn to_snake_case_params_with(&self, policy: &dyn RelationPolicy) -> Record {
        self.project(policy, KeyCase::Snake)
    }

    /// Project changes into persistence params
    pub fn project(&self, policy: &dyn RelationPolicy, key_case: KeyCase) -> Record {
        let mut params = Record::new();

        for (field, value) in self.changes() {
            let options = self.schema().options(field);
            if options.map_or(false, |o| o.is_virtual) {
                continue;
            }

            if let Some(relation) = policy.relation_for(field) {
                if !value.is_null() {
                    params.insert(relation, json!({ "connect": { "id": value } }));
                }
                continue;
            }

            let value = if value.is_null() {
                match options.and_then(|o| o.default.clone()) {
                    Some(default) => default,
                    None => continue,
                }
            } else {
                value.clone()
            };
            params.insert(key_case.apply(field), value);
        }

        params
    }
}

/// Convert camelCase, PascalCase, kebab-case or spaced names to snake_case
///
/// Capitals are recognised in any script. Digits stay attached to the word
/// before them (`field1`, `v2Name` -> `v2_name`).
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let boundary = match i.checked_sub(1).map(|p| chars[p]) {
                Some(prev) if prev.is_lowercase() || prev.is_numeric() => true,
                // Last capital of an acronym followed by a word: "HTMLParser"
                Some(prev) if prev.is_uppercase() => {
                    chars.get(i + 1).map_or(false, |next| next.is_lowercase())
                }
                _ => false,
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(c);
        }
    }

    result
}
