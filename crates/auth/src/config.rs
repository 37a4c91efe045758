//! Configuration document the privilege registry is reconciled against.
//!
//! Only the `[security.privileges]` table matters here. It maps a privilege key
//! (spelled as the privilege value, e.g. `listComments`) to whatever the
//! operator assigns to it, usually the roles allowed to use it:
//!
//! ```toml
//! [security.privileges]
//! listComments = "anonymous, regularUser, powerUser, moderator, administrator"
//! banUsers = ["moderator", "administrator"]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "SZURU_CONFIG";

/// Path used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "data/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration document. Sections other than `security` are owned
/// by other parts of the application and ignored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Privilege key → assigned value (role list, boolean, ...).
    #[serde(default)]
    pub privileges: BTreeMap<String, toml::Value>,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            privileges = config.security.privileges.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Load from the path in `SZURU_CONFIG`, or [`DEFAULT_CONFIG_PATH`].
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| {
            tracing::warn!("{CONFIG_PATH_ENV} not set; using {DEFAULT_CONFIG_PATH}");
            DEFAULT_CONFIG_PATH.to_string()
        });
        Self::load(path)
    }
}

impl SecurityConfig {
    /// The key set of the privilege section.
    pub fn privilege_keys(&self) -> BTreeSet<String> {
        self.privileges.keys().cloned().collect()
    }

    /// Roles assigned to a privilege key.
    ///
    /// Strings are comma-separated role lists; arrays contribute their string
    /// elements. Any other value, or a missing key, yields no roles.
    pub fn roles_for(&self, key: &str) -> Vec<String> {
        match self.privileges.get(key) {
            Some(toml::Value::String(roles)) => roles
                .split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect(),
            Some(toml::Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str())
                .map(|role| role.trim().to_string())
                .filter(|role| !role.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [database]
        dsn = "sqlite:booru.db"

        [security.privileges]
        listComments = "anonymous, regularUser , ,moderator"
        banUsers = ["moderator", "administrator"]
        register = true
    "#;

    #[test]
    fn reads_privilege_keys_and_ignores_other_sections() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        let keys: Vec<_> = config.security.privilege_keys().into_iter().collect();
        assert_eq!(keys, ["banUsers", "listComments", "register"]);
    }

    #[test]
    fn roles_from_string_and_array() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(
            config.security.roles_for("listComments"),
            ["anonymous", "regularUser", "moderator"]
        );
        assert_eq!(
            config.security.roles_for("banUsers"),
            ["moderator", "administrator"]
        );
        assert!(config.security.roles_for("register").is_empty());
        assert!(config.security.roles_for("missing").is_empty());
    }

    #[test]
    fn missing_security_section_is_empty() {
        let config = Config::from_toml_str("[database]\ndsn = \"x\"\n").unwrap();
        assert!(config.security.privileges.is_empty());
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = Config::from_toml_str("[security.privileges\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/nonexistent/szuru/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/szuru/config.toml"));
    }
}
