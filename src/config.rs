use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use cloakroom_core::identity::{DEFAULT_DISPLAY_NAME, DEFAULT_EMAIL_PREFIX};
use cloakroom_core::DEFAULT_BASE_URL;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the catalog service
    pub api_base_url: ConfigValue<String>,
    /// Path to the SQLite closet cache
    pub database_path: ConfigValue<PathBuf>,
    /// Directory holding the session file
    pub data_dir: ConfigValue<PathBuf>,
    /// Full name sent when a new owner identity is created
    pub display_name: ConfigValue<String>,
    /// Local part prefix of synthesized owner emails
    pub email_prefix: ConfigValue<String>,
    /// Per-request timeout; none means the HTTP client default
    pub request_timeout_secs: ConfigValue<Option<u64>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api_base_url: Option<String>,
    database_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    display_name: Option<String>,
    email_prefix: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let default_data_dir = Self::default_data_dir();

        // Start with defaults
        let mut api_base_url =
            ConfigValue::new(DEFAULT_BASE_URL.to_string(), ConfigSource::Default);
        let mut database_path =
            ConfigValue::new(default_data_dir.join("closet.db"), ConfigSource::Default);
        let mut data_dir = ConfigValue::new(default_data_dir, ConfigSource::Default);
        let mut display_name =
            ConfigValue::new(DEFAULT_DISPLAY_NAME.to_string(), ConfigSource::Default);
        let mut email_prefix =
            ConfigValue::new(DEFAULT_EMAIL_PREFIX.to_string(), ConfigSource::Default);
        let mut request_timeout_secs = ConfigValue::new(None, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.api_base_url {
                api_base_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(db_path) = file_config.database_path {
                database_path = ConfigValue::new(resolve(&path, db_path), ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                data_dir = ConfigValue::new(resolve(&path, dir), ConfigSource::File);
            }
            if let Some(name) = file_config.display_name {
                display_name = ConfigValue::new(name, ConfigSource::File);
            }
            if let Some(prefix) = file_config.email_prefix {
                email_prefix = ConfigValue::new(prefix, ConfigSource::File);
            }
            if let Some(secs) = file_config.request_timeout_secs {
                request_timeout_secs = ConfigValue::new(Some(secs), ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(url) = std::env::var("CLOAKROOM_API_URL") {
            api_base_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(db_path) = std::env::var("CLOAKROOM_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(dir) = std::env::var("CLOAKROOM_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(name) = std::env::var("CLOAKROOM_DISPLAY_NAME") {
            display_name = ConfigValue::new(name, ConfigSource::Environment);
        }
        if let Ok(raw) = std::env::var("CLOAKROOM_REQUEST_TIMEOUT") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue("CLOAKROOM_REQUEST_TIMEOUT".to_string(), raw.clone())
            })?;
            request_timeout_secs = ConfigValue::new(Some(secs), ConfigSource::Environment);
        }

        Ok(Self {
            api_base_url,
            database_path,
            data_dir,
            display_name,
            email_prefix,
            request_timeout_secs,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/cloakroom/
    /// - macOS: ~/Library/Application Support/cloakroom/
    /// - Windows: %APPDATA%/cloakroom/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cloakroom")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/cloakroom/
    /// - macOS: ~/Library/Application Support/cloakroom/
    /// - Windows: %APPDATA%/cloakroom/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cloakroom")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }

    /// Contents written by `config init`.
    pub fn template() -> String {
        format!(
            "# Cloakroom configuration\n\
             api_base_url: {}\n\
             # database_path: closet.db\n\
             # data_dir: /path/to/data\n\
             display_name: {}\n\
             email_prefix: {}\n\
             # request_timeout_secs: 30\n",
            DEFAULT_BASE_URL, DEFAULT_DISPLAY_NAME, DEFAULT_EMAIL_PREFIX
        )
    }
}

/// Resolve relative paths against the config file's directory
fn resolve(config_path: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&path))
            .unwrap_or(path)
    } else {
        path
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config
            .database_path
            .value
            .to_string_lossy()
            .contains("closet.db"));
        assert_eq!(config.database_path.source, ConfigSource::Default);
        assert_eq!(config.api_base_url.value, "http://127.0.0.1:8000");
        assert_eq!(config.display_name.value, "Cloakroom CLI User");
        assert_eq!(config.email_prefix.value, "cli");
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "api_base_url: https://closet.example.com").unwrap();
        writeln!(file, "database_path: /custom/path/closet.sqlite").unwrap();
        writeln!(file, "display_name: Test Person").unwrap();
        writeln!(file, "request_timeout_secs: 15").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.api_base_url.value, "https://closet.example.com");
        assert_eq!(config.api_base_url.source, ConfigSource::File);
        assert_eq!(
            config.database_path.value,
            PathBuf::from("/custom/path/closet.sqlite")
        );
        assert_eq!(config.display_name.value, "Test Person");
        assert_eq!(config.request_timeout_secs.value, Some(15));
        assert_eq!(config.email_prefix.source, ConfigSource::Default);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: closet.db").unwrap();
        writeln!(file, "data_dir: state").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.database_path.value, temp_dir.path().join("closet.db"));
        assert_eq!(config.data_dir.value, temp_dir.path().join("state"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "api_base_url: http://fromfile").unwrap();

        std::env::set_var("CLOAKROOM_API_URL", "http://fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.api_base_url.value, "http://fromenv");
        assert_eq!(config.api_base_url.source, ConfigSource::Environment);

        std::env::remove_var("CLOAKROOM_API_URL");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_template_parses() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, Config::template()).unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.api_base_url.source, ConfigSource::File);
        assert_eq!(config.email_prefix.value, "cli");
    }
}
