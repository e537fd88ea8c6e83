//! Configuration management for changesets
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (changeset.toml)
//! - Environment variables (CHANGESET_*)
//!
//! ## Example config file (changeset.toml):
//! ```toml
//! [cast]
//! trim_strings = true
//!
//! [projection]
//! relation_suffix = "Id"
//! key_case = "snake"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::changeset::CastOptions;
use crate::error::Result;
use crate::projection::{ForeignKeySuffix, KeyCase};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangesetConfig {
    /// Cast settings
    #[serde(default)]
    pub cast: CastConfig,

    /// Projection settings
    #[serde(default)]
    pub projection: ProjectionConfig,
}

/// Cast configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastConfig {
    /// Strip surrounding whitespace from textual cast results
    #[serde(default = "default_true")]
    pub trim_strings: bool,
}

/// Projection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Suffix marking foreign-key fields; empty disables relations
    #[serde(default = "default_relation_suffix")]
    pub relation_suffix: String,

    /// Casing of non-relation keys
    #[serde(default)]
    pub key_case: KeyCase,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_relation_suffix() -> String {
    "Id".to_string()
}

impl Default for CastConfig {
    fn default() -> Self {
        Self { trim_strings: true }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            relation_suffix: default_relation_suffix(),
            key_case: KeyCase::default(),
        }
    }
}

impl ChangesetConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["changeset.toml", ".changeset.toml", "config/changeset.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "changeset") {
            let xdg_config = config_dir.config_dir().join("changeset.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CHANGESET_CAST__TRIM_STRINGS=false
        builder = builder.add_source(
            Environment::with_prefix("CHANGESET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Cast options described by this configuration
    pub fn cast_options(&self) -> CastOptions {
        CastOptions {
            trim_strings: self.cast.trim_strings,
        }
    }

    /// Relation policy described by this configuration
    pub fn relation_policy(&self) -> ForeignKeySuffix {
        ForeignKeySuffix::new(self.projection.relation_suffix.clone())
    }

    /// Key casing described by this configuration
    pub fn key_case(&self) -> KeyCase {
        self.projection.key_case
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::RelationPolicy;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ChangesetConfig::default();
        assert!(config.cast.trim_strings);
        assert_eq!(config.projection.relation_suffix, "Id");
        assert_eq!(config.key_case(), KeyCase::Preserve);
        assert_eq!(config.cast_options(), CastOptions::default());
    }

    #[test]
    fn test_serialize_config() {
        let config = ChangesetConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[cast]"));
        assert!(toml_str.contains("[projection]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[cast]\ntrim_strings = false\n\n[projection]\nrelation_suffix = \"_id\"\nkey_case = \"snake\"\n",
        )
        .unwrap();

        let config = ChangesetConfig::load_from(path.to_str()).unwrap();
        assert!(!config.cast_options().trim_strings);
        assert_eq!(config.key_case(), KeyCase::Snake);
        assert_eq!(
            config.relation_policy().relation_for("author_id"),
            Some("author".to_string())
        );
    }

    #[test]
    fn test_env_overrides() {
        // Values agree with test_load_from_file, which may run concurrently.
        std::env::set_var("CHANGESET_CAST__TRIM_STRINGS", "false");
        std::env::set_var("CHANGESET_PROJECTION__KEY_CASE", "snake");

        let config = ChangesetConfig::load();

        std::env::remove_var("CHANGESET_CAST__TRIM_STRINGS");
        std::env::remove_var("CHANGESET_PROJECTION__KEY_CASE");

        let config = config.unwrap();
        assert!(!config.cast.trim_strings);
        assert_eq!(config.key_case(), KeyCase::Snake);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = ChangesetConfig::default();
        config.projection.key_case = KeyCase::Snake;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded: ChangesetConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);
    }
}
