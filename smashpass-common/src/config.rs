//! Configuration loading and path resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file at the default location is not an error; the
//! compiled defaults are used instead.

use crate::csv_codec::{ImportOptions, KeyScheme, RosterPolicy};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SMASHPASS_CONFIG";

/// Environment variable naming a catalog JSON file
pub const CATALOG_ENV_VAR: &str = "SMASHPASS_CATALOG";

/// Default name offered when exporting
pub const DEFAULT_EXPORT_NAME: &str = "pokemons.csv";

/// Logging section of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing level directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Contents of `config.toml`
///
/// Every field is optional in the file.
///
/// ```toml
/// characters = ["Alex", "Amun"]
/// key_scheme = "position"
/// roster_policy = "positional"
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmashPassConfig {
    /// Catalog JSON to use instead of the bundled one
    pub catalog_path: Option<PathBuf>,
    /// Fixed roster created at startup, in declaration order
    pub characters: Vec<String>,
    pub key_scheme: KeyScheme,
    pub roster_policy: RosterPolicy,
    /// Start with an empty catalog instead of exiting when it cannot be loaded
    pub allow_empty_catalog: bool,
    pub image_timeout_secs: u64,
    pub default_export_name: String,
    pub logging: LoggingConfig,
}

impl Default for SmashPassConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            characters: Vec::new(),
            key_scheme: KeyScheme::default(),
            roster_policy: RosterPolicy::default(),
            allow_empty_catalog: false,
            image_timeout_secs: 30,
            default_export_name: DEFAULT_EXPORT_NAME.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SmashPassConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            key_scheme: self.key_scheme,
            roster_policy: self.roster_policy,
        }
    }
}

/// Platform config file location (`<config_dir>/smashpass/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("smashpass").join("config.toml"))
}

/// Load configuration following the priority order
///
/// An explicitly named file (argument or `SMASHPASS_CONFIG`) must exist. The
/// platform default location is optional.
pub fn load_config(cli_arg: Option<&Path>) -> Result<SmashPassConfig> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return SmashPassConfig::load(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return SmashPassConfig::load(Path::new(&path));
    }

    // Priority 3: TOML config file at the platform location
    if let Some(path) = default_config_path() {
        if path.exists() {
            return SmashPassConfig::load(&path);
        }
        debug!(path = %path.display(), "No config file at default location");
    }

    // Priority 4: Compiled defaults
    info!("No config file found, using defaults");
    Ok(SmashPassConfig::default())
}

/// Catalog file to load, `None` meaning the bundled catalog
pub fn resolve_catalog_path(cli_arg: Option<&Path>, config: &SmashPassConfig) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CATALOG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    config.catalog_path.clone()
}

/// Startup roster: command-line names replace the configured list entirely
pub fn resolve_roster(cli_names: &[String], config: &SmashPassConfig) -> Vec<String> {
    if cli_names.is_empty() {
        config.characters.clone()
    } else {
        cli_names.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SmashPassConfig::default();
        assert!(config.characters.is_empty());
        assert_eq!(config.key_scheme, KeyScheme::Position);
        assert_eq!(config.roster_policy, RosterPolicy::Positional);
        assert_eq!(config.image_timeout_secs, 30);
        assert_eq!(config.default_export_name, "pokemons.csv");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(SmashPassConfig::from_toml_str("").unwrap(), SmashPassConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = SmashPassConfig::from_toml_str(
            r#"
            characters = ["Alex", "Amun"]
            key_scheme = "entity_name"
            roster_policy = "adopt_header"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.characters, vec!["Alex", "Amun"]);
        assert_eq!(config.key_scheme, KeyScheme::EntityName);
        assert_eq!(config.roster_policy, RosterPolicy::AdoptHeader);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.image_timeout_secs, 30);
    }

    #[test]
    fn test_bad_enum_value_is_config_error() {
        let err = SmashPassConfig::from_toml_str(r#"key_scheme = "sideways""#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_cli_roster_wins() {
        let config = SmashPassConfig {
            characters: vec!["Alex".to_string()],
            ..Default::default()
        };
        assert_eq!(resolve_roster(&[], &config), vec!["Alex"]);
        assert_eq!(resolve_roster(&["Amun".to_string()], &config), vec!["Amun"]);
    }
}
