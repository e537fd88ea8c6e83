//! Schema types and structures

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ChangesetError, Result};
use crate::types::FieldType;

/// Per-field options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Value substituted for `null` in persistence projection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Virtual fields are cast and validated but never persisted
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
}

impl FieldOptions {
    /// Options with a default value
    pub fn with_default(default: impl Into<Value>) -> Self {
        Self {
            default: Some(default.into()),
            is_virtual: false,
        }
    }

    /// Options for a virtual field
    pub fn virtual_field() -> Self {
        Self {
            default: None,
            is_virtual: true,
        }
    }
}

/// A single field definition: declared type plus options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(flatten)]
    pub options: FieldOptions,
}

impl SchemaField {
    pub fn new(field_type: FieldType, options: FieldOptions) -> Self {
        Self { field_type, options }
    }
}

/// Mapping from field name to field definition.
///
/// Read-only once built; changesets share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: BTreeMap<String, SchemaField>,
}

impl Schema {
    /// Get a field definition by name
    pub fn get(&self, name: &str) -> Option<&SchemaField> {
        self.fields.get(name)
    }

    /// Get the declared type of a field
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).map(|f| f.field_type)
    }

    /// Get the options of a field
    pub fn options(&self, name: &str) -> Option<&FieldOptions> {
        self.fields.get(name).map(|f| &f.options)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of all fields that are persisted (not virtual)
    pub fn persisted_fields(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, f)| !f.options.is_virtual)
            .map(|(name, _)| name)
            .collect()
    }

    /// Parse a schema from JSON
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a schema from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a schema file, choosing the format from the extension
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

impl FromIterator<(String, SchemaField)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, SchemaField)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Fluent builder with one method per field type
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: BTreeMap<String, SchemaField>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish the schema
    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
        }
    }

    /// Add a field of any type. A later definition replaces an earlier one.
    pub fn field(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        options: Option<FieldOptions>,
    ) -> Self {
        self.fields.insert(
            name.into(),
            SchemaField::new(field_type, options.unwrap_or_default()),
        );
        self
    }

    pub fn integer(self, name: impl Into<String>, options: Option<FieldOptions>) -> Self {
        self.field(name, FieldType::Integer, options)
    }

    pub fn float(self, name: impl Into<String>, options: Option<FieldOptions>) -> Self {
        self.field(name, FieldType::Float, options)
    }

    pub fn string(self, name: impl Into<String>, options: Option<FieldOptions>) -> Self {
        self.field(name, FieldType::String, options)
    }

    pub fn boolean(self, name: impl Into<String>, options: Option<FieldOptions>) -> Self {
        self.field(name, FieldType::Boolean, options)
    }

    pub fn binary(self, name: impl Into<String>, options: Option<FieldOptions>) -> Self {
        self.field(name, FieldType::Binary, options)
    }

    pub fn decimal(self, name: impl Into<String>, options: Option<FieldOptions>) -> Self {
        self.field(name, FieldType::Decimal, options)
    }
}
