//! Configuration loading for the mdconf CLI.
//!
//! Credentials are resolved in priority order:
//! 1. Command-line flags (or their environment variable fallbacks)
//! 2. An `mdconf.toml` file, discovered by walking up from the current
//!    directory or given explicitly with `--config`

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration file name.
const CONFIG_FILENAME: &str = "mdconf.toml";

/// Settings supplied on the command line that override file values.
#[derive(Debug, Default)]
pub(crate) struct CliSettings {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub org_name: Option<String>,
}

/// Fully resolved Confluence credentials.
#[derive(Debug)]
pub(crate) struct Credentials {
    pub username: String,
    pub api_key: String,
    pub org_name: String,
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub confluence: ConfluenceSettings,
}

/// Confluence credential settings from `mdconf.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ConfluenceSettings {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub org_name: Option<String>,
}

impl Config {
    /// Load configuration, applying CLI settings on top of any file values.
    ///
    /// An explicit `config_path` must exist; without one, a missing
    /// `mdconf.toml` is not an error and credentials come from the CLI
    /// settings alone.
    pub(crate) fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Self::load_from_file(path)?
            }
            None => match Self::discover_config() {
                Some(path) => Self::load_from_file(&path)?,
                None => Self::default(),
            },
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Walk up from the current directory looking for `mdconf.toml`.
    fn discover_config() -> Option<PathBuf> {
        Self::discover_config_from(std::env::current_dir().ok()?)
    }

    fn discover_config_from(start: PathBuf) -> Option<PathBuf> {
        let mut current = start;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(username) = &settings.username {
            self.confluence.username = Some(username.clone());
        }
        if let Some(api_key) = &settings.api_key {
            self.confluence.api_key = Some(api_key.clone());
        }
        if let Some(org_name) = &settings.org_name {
            self.confluence.org_name = Some(org_name.clone());
        }
    }

    /// Require all three credentials to be present and non-empty.
    pub(crate) fn require_credentials(&self) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            username: require_non_empty(self.confluence.username.as_deref(), "username")?,
            api_key: require_non_empty(self.confluence.api_key.as_deref(), "api key")?,
            org_name: require_non_empty(self.confluence.org_name.as_deref(), "organization name")?,
        })
    }
}

fn require_non_empty(value: Option<&str>, name: &str) -> Result<String, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(ConfigError::Validation(format!(
            "Confluence {name} is required (set it via CLI flag, environment variable, or {CONFIG_FILENAME})"
        ))),
    }
}

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("{0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[confluence]
username = "docs@example.com"
api_key = "secret"
org_name = "example"
"#,
        );

        let config = Config::load(Some(file.path()), None).unwrap();
        assert_eq!(
            config.confluence.username.as_deref(),
            Some("docs@example.com")
        );
        assert_eq!(config.confluence.api_key.as_deref(), Some("secret"));
        assert_eq!(config.confluence.org_name.as_deref(), Some("example"));
    }

    #[test]
    fn test_cli_settings_override_file() {
        let file = write_config(
            r#"
[confluence]
username = "docs@example.com"
api_key = "secret"
org_name = "example"
"#,
        );

        let settings = CliSettings {
            username: Some("other@example.com".to_string()),
            api_key: None,
            org_name: None,
        };
        let config = Config::load(Some(file.path()), Some(&settings)).unwrap();
        assert_eq!(
            config.confluence.username.as_deref(),
            Some("other@example.com")
        );
        assert_eq!(config.confluence.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_discovery_walks_parent_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(CONFIG_FILENAME), "[confluence]\n").unwrap();
        let nested = root.path().join("docs").join("guides");
        std::fs::create_dir_all(&nested).unwrap();

        let found = Config::discover_config_from(nested).unwrap();
        assert_eq!(found, root.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn test_discovery_prefers_nearest_config() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(CONFIG_FILENAME), "[confluence]\n").unwrap();
        let nested = root.path().join("docs");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "[confluence]\n").unwrap();

        let found = Config::discover_config_from(nested.clone()).unwrap();
        assert_eq!(found, nested.join(CONFIG_FILENAME));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let result = Config::load(Some(Path::new("/nonexistent/mdconf.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("not valid toml [[[");
        let result = Config::load(Some(file.path()), None);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_require_credentials_missing_key() {
        let config = Config {
            confluence: ConfluenceSettings {
                username: Some("docs@example.com".to_string()),
                api_key: None,
                org_name: Some("example".to_string()),
            },
        };

        let err = config.require_credentials().unwrap_err();
        assert!(err.to_string().contains("api key"));
    }

    #[test]
    fn test_require_credentials_rejects_empty() {
        let config = Config {
            confluence: ConfluenceSettings {
                username: Some("  ".to_string()),
                api_key: Some("secret".to_string()),
                org_name: Some("example".to_string()),
            },
        };

        let err = config.require_credentials().unwrap_err();
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_require_credentials_complete() {
        let config = Config {
            confluence: ConfluenceSettings {
                username: Some("docs@example.com".to_string()),
                api_key: Some("secret".to_string()),
                org_name: Some("example".to_string()),
            },
        };

        let creds = config.require_credentials().unwrap();
        assert_eq!(creds.username, "docs@example.com");
        assert_eq!(creds.api_key, "secret");
        assert_eq!(creds.org_name, "example");
    }
}
