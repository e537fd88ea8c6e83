//! Familiar Changeset
//!
//! Schema-driven casting and validation for untyped input (form posts, API
//! payloads) on its way to the persistence layer.
//!
//! ## Features
//!
//! - **Declarative Schemas**: named fields with a type, a default and a virtual flag
//! - **Change Tracking**: only values that differ from the stored record are recorded
//! - **Accumulating Validation**: validators never short-circuit; errors group by field
//! - **Persistence Projection**: changes reshaped for a storage write, with pluggable relation naming
//! - **Rule Files**: validation chains declared in JSON or TOML next to the schema
//!
//! ## Flow
//!
//! ```text
//! params + permitted ──cast──▶ changes ──validate_*──▶ errors
//!                                 │
//!                                 ├── apply_changes()          full record
//!                                 └── to_persistence_params()  storage write
//! ```

pub mod changeset;
pub mod config;
pub mod error;
pub mod projection;
pub mod rules;
pub mod schema;
pub mod types;
pub mod validators;
pub mod value;

pub use changeset::{CastOptions, Changeset, FieldError};
pub use config::ChangesetConfig;
pub use error::{ChangesetError, Result};
pub use projection::{ForeignKeySuffix, KeyCase, NoRelations, RelationPolicy};
pub use rules::{Rule, RuleSet};
pub use schema::{FieldOptions, Schema, SchemaBuilder, SchemaField};
pub use types::FieldType;
pub use validators::{LengthValidator, NumberValidator};
pub use value::Record;
