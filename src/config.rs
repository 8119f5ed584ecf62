//! Configuration management for the Reactor uploader
//!
//! Everything works without a configuration file. A TOML file can tune the
//! HTTP client, replace the scope candidate lists, change the poll interval,
//! and point an environment at different endpoints.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::ClientConfig;
use crate::constants::{auth, files, http, poll};
use crate::environment::{Environment, EnvironmentConfig};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Authentication settings
    pub auth: AuthConfigToml,
    /// Status polling settings
    pub poll: PollConfigToml,
    /// Per-environment endpoint overrides, keyed by lowercase environment name
    pub environments: HashMap<String, EnvironmentOverrides>,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
        }
    }
}

/// Scope candidates tried when exchanging service credentials for a token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfigToml {
    /// Metascopes for JWT integrations, preferred first
    pub metascopes: Vec<String>,
    /// Scopes for OAuth server-to-server credentials, preferred first
    pub oauth_scopes: Vec<String>,
}

impl Default for AuthConfigToml {
    fn default() -> Self {
        Self {
            metascopes: auth::DEFAULT_METASCOPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            oauth_scopes: vec![auth::DEFAULT_OAUTH_SCOPE.to_string()],
        }
    }
}

/// TOML-friendly polling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollConfigToml {
    /// Wait between status checks in milliseconds
    pub interval_ms: u64,
}

impl Default for PollConfigToml {
    fn default() -> Self {
        Self {
            interval_ms: poll::INTERVAL.as_millis() as u64,
        }
    }
}

/// Endpoint overrides for one environment; unset fields keep the built-in value
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EnvironmentOverrides {
    pub extension_packages: Option<String>,
    pub jwt_exchange: Option<String>,
    pub oauth_token: Option<String>,
    pub audience_prefix: Option<String>,
    pub metascope_prefix: Option<String>,
    pub private_key_env_var: Option<String>,
    pub client_secret_env_var: Option<String>,
    /// Empty string disables the availability filter
    pub lookup_availability: Option<String>,
}

impl AppConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. Config file (explicit path, else first found in standard locations)
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        let config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No config file found in standard locations, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        if let Some(path) = Self::get_default_config_path() {
            search_paths.push(path);
        }

        search_paths.into_iter().find(|path| {
            let found = path.exists();
            if found {
                debug!("Found config file: {}", path.display());
            }
            found
        })
    }

    /// Get the default config file path for the current user
    fn get_default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(files::CONFIG_DIR_NAME)
                .join(files::CONFIG_FILE_NAME)
        })
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Reject values the uploader cannot run with
    fn validate(&self) -> ConfigResult<()> {
        if self.client.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.auth.metascopes.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.metascopes".to_string(),
                value: "[]".to_string(),
                reason: "At least one metascope is required".to_string(),
            });
        }

        if self.auth.oauth_scopes.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.oauth_scopes".to_string(),
                value: "[]".to_string(),
                reason: "At least one scope is required".to_string(),
            });
        }

        Ok(())
    }

    /// Settings for `environment` with any configured overrides applied
    pub fn environment_config(&self, environment: Environment) -> EnvironmentConfig {
        let mut config = environment.config();
        let Some(overrides) = self.environments.get(environment.as_str()) else {
            return config;
        };

        let apply = |target: &mut String, value: &Option<String>| {
            if let Some(value) = value {
                *target = value.clone();
            }
        };

        apply(&mut config.extension_packages, &overrides.extension_packages);
        apply(&mut config.jwt_exchange, &overrides.jwt_exchange);
        apply(&mut config.oauth_token, &overrides.oauth_token);
        apply(&mut config.audience_prefix, &overrides.audience_prefix);
        apply(&mut config.metascope_prefix, &overrides.metascope_prefix);
        apply(&mut config.private_key_env_var, &overrides.private_key_env_var);
        apply(
            &mut config.client_secret_env_var,
            &overrides.client_secret_env_var,
        );

        if let Some(availability) = &overrides.lookup_availability {
            config.lookup_availability = if availability.is_empty() {
                None
            } else {
                Some(availability.clone())
            };
        }

        config
    }

    /// Wait between status checks
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(
            config.auth.metascopes,
            vec![
                "ent_reactor_extension_developer_sdk".to_string(),
                "ent_reactor_admin_sdk".to_string()
            ]
        );
        assert_eq!(config.poll_interval(), poll::INTERVAL);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_config_loading_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let test_config = r#"
[auth]
metascopes = ["ent_custom_sdk"]

[poll]
interval_ms = 250

[environments.qe]
extension_packages = "http://localhost:9000/extension_packages"
lookup_availability = ""
"#;
        tokio::fs::write(&config_path, test_config).await.unwrap();

        let config = AppConfig::load(Some(config_path)).await.unwrap();

        assert_eq!(config.auth.metascopes, vec!["ent_custom_sdk".to_string()]);
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        // Unspecified sections keep their defaults
        assert_eq!(config.auth.oauth_scopes.len(), 1);
        assert_eq!(
            config.client.request_timeout_secs,
            http::DEFAULT_TIMEOUT.as_secs()
        );

        let qe = config.environment_config(Environment::Qe);
        assert_eq!(
            qe.extension_packages,
            "http://localhost:9000/extension_packages"
        );
        assert_eq!(qe.lookup_availability, None);
        // Other fields are untouched
        assert_eq!(qe.jwt_exchange, Environment::Qe.config().jwt_exchange);

        // Environments without overrides keep built-in settings
        assert_eq!(
            config.environment_config(Environment::Production),
            Environment::Production.config()
        );
    }

    #[tokio::test]
    async fn test_config_rejects_empty_metascopes() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        tokio::fs::write(&config_path, "[auth]\nmetascopes = []\n")
            .await
            .unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[tokio::test]
    async fn test_config_rejects_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        tokio::fs::write(&config_path, "[poll\ninterval_ms = ")
            .await
            .unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }
}
