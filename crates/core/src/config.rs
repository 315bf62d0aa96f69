//! Configuration management for the Portaria assistant.
//!
//! Configuration is layered, later sources winning:
//! 1. Built-in defaults
//! 2. YAML config file (`PORTARIA_CONFIG` or `./.portaria/config.yaml`)
//! 3. Environment variables
//! 4. Command-line flags (see [`AppConfig::with_overrides`])

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Default backend base URL (the RAG API listens on Flask's default port).
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default config file location, relative to the current directory.
pub const DEFAULT_CONFIG_PATH: &str = ".portaria/config.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the RAG backend (`/ask`, `/search`, `/document/{id}`)
    pub api_url: String,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Legacy document store used by direct `_find` queries
    pub legacy: Option<LegacyStoreConfig>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log line format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Connection settings for the legacy document store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyStoreConfig {
    pub url: String,
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// On-disk configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    api: Option<ApiSection>,
    legacy: Option<LegacyStoreConfig>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiSection {
    url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    format: Option<LogFormat>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            config_file: None,
            legacy: None,
            log_level: None,
            log_format: LogFormat::Pretty,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment.
    ///
    /// Environment variables:
    /// - `PORTARIA_CONFIG`: Path to config file
    /// - `PORTARIA_API_URL`: Backend base URL
    /// - `COUCHDB_URL`, `COUCHDB_DATABASE`, `COUCHDB_USERNAME`, `COUCHDB_PASSWORD`:
    ///   legacy document store
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use portaria_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Backend: {}", config.api_url);
    /// ```
    pub fn load() -> AppResult<Self> {
        let config_file = std::env::var_os("PORTARIA_CONFIG").map(PathBuf::from);
        Self::load_from(config_file, |key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit config path and environment lookup.
    ///
    /// An explicitly named config file must exist; the default location is optional.
    pub fn load_from<F>(config_file: Option<PathBuf>, env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config.config_file = Some(path.clone());
                Some(path)
            }
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                default.exists().then_some(default)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        config.apply_env(env);
        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(url) = file.api.and_then(|api| api.url) {
            result.api_url = url;
        }

        if let Some(legacy) = file.legacy {
            result.legacy = Some(legacy);
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Environment variables override the config file.
    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env("PORTARIA_API_URL") {
            self.api_url = url;
        }

        if let Some(url) = env("COUCHDB_URL") {
            let legacy = self.legacy.get_or_insert_with(LegacyStoreConfig::default);
            legacy.url = url;
        }

        if let Some(legacy) = self.legacy.as_mut() {
            if let Some(database) = env("COUCHDB_DATABASE") {
                legacy.database = database;
            }
            if let Some(username) = env("COUCHDB_USERNAME") {
                legacy.username = Some(username);
            }
            if let Some(password) = env("COUCHDB_PASSWORD") {
                legacy.password = Some(password);
            }
        }

        if let Some(level) = env("RUST_LOG") {
            self.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        log_level: Option<String>,
        log_format: Option<LogFormat>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate the backend URL and, when configured, the legacy store block.
    pub fn validate(&self) -> AppResult<()> {
        validate_http_url("api_url", &self.api_url)?;

        if let Some(legacy) = &self.legacy {
            validate_http_url("legacy.url", &legacy.url)?;
            if legacy.database.trim().is_empty() {
                return Err(AppError::Config(
                    "Legacy store configured without a database name".to_string(),
                ));
            }
            if legacy.username.is_some() != legacy.password.is_some() {
                return Err(AppError::Config(
                    "Legacy store credentials need both username and password".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> AppResult<()> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| AppError::Config(format!("Invalid {} {:?}: {}", field, value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::Config(format!(
            "Unsupported scheme for {}: {}",
            field, scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.legacy.is_none());
        assert!(!config.verbose);
        assert!(!config.no_color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api:\n  url: http://files.example:8000\nlogging:\n  level: warn\n  format: json\n  color: false"
        )
        .unwrap();

        let config = AppConfig::load_from(
            Some(file.path().to_path_buf()),
            env_from(&[("PORTARIA_API_URL", "http://env.example:9000")]),
        )
        .unwrap();

        assert_eq!(config.api_url, "http://env.example:9000");
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.no_color);
    }

    #[test]
    fn test_legacy_store_from_env() {
        let config = AppConfig::load_from(
            None,
            env_from(&[
                ("COUCHDB_URL", "http://couch:5984"),
                ("COUCHDB_DATABASE", "portarias"),
                ("COUCHDB_USERNAME", "admin"),
                ("COUCHDB_PASSWORD", "secret"),
            ]),
        )
        .unwrap();

        let legacy = config.legacy.clone().unwrap();
        assert_eq!(legacy.url, "http://couch:5984");
        assert_eq!(legacy.database, "portarias");
        assert_eq!(legacy.username.as_deref(), Some("admin"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let result = AppConfig::load_from(
            Some(PathBuf::from("/definitely/not/here.yaml")),
            env_from(&[]),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some("https://api.example".to_string()),
            None,
            Some(LogFormat::Json),
            true,
            false,
        );

        assert_eq!(config.api_url, "https://api.example");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = AppConfig::default();
        config.api_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_incomplete_legacy_store() {
        let mut config = AppConfig::default();
        config.legacy = Some(LegacyStoreConfig {
            url: "http://couch:5984".to_string(),
            database: String::new(),
            username: None,
            password: None,
        });
        assert!(config.validate().is_err());
    }
}
