//! Client configuration.
//!
//! Sources, lowest precedence first: the `Default` impl (through
//! `#[serde(default)]`), an optional TOML file, then `FARMHAND_*`
//! environment variables. Nested keys use a double underscore, e.g.
//! `FARMHAND_ROUTES__SIGN_IN`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use farmhand_application::{AuthRoutes, PollPolicy};

use crate::persistence::FileTokenStore;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FARMHAND";

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "farmhand.toml";

/// Errors loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or merged.
    #[error("config error: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value is present but unusable.
    #[error("invalid {key}: {message}")]
    Invalid {
        /// Offending key
        key: &'static str,
        /// Why it was rejected
        message: String,
    },
}

/// Settings for the console client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root every request path is appended to.
    pub base_url: String,
    /// Per-request deadline in seconds.
    pub request_timeout_secs: u64,
    /// Token file; `<data dir>/farmhand/tokens.json` when unset.
    pub token_file: Option<PathBuf>,
    /// Delay between task polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Task polls before giving up.
    pub poll_max_attempts: u32,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Auth endpoint paths.
    pub routes: AuthRoutes,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 30,
            token_file: None,
            poll_interval_ms: 2000,
            poll_max_attempts: 60,
            log_filter: "info".to_string(),
            routes: AuthRoutes::default(),
        }
    }
}

impl ClientConfig {
    /// Loads the configuration.
    ///
    /// With `path` the file must exist; without it `farmhand.toml` in the
    /// working directory is used if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: Option<&Path>, environment: Environment) -> Result<Self, ConfigError> {
        let mut builder = match path {
            Some(path) => Config::builder().add_source(File::from(path).format(FileFormat::Toml)),
            None => Config::builder().add_source(
                File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
            ),
        };

        builder = builder.add_source(
            environment
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.base_url).map_err(|e| ConfigError::Invalid {
            key: "base_url",
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "base_url",
                message: format!("expected http or https, got {}", url.scheme()),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        for (key, route) in [
            ("routes.sign_in", &self.routes.sign_in),
            ("routes.sign_up", &self.routes.sign_up),
            ("routes.refresh", &self.routes.refresh),
            ("routes.sign_out", &self.routes.sign_out),
            ("routes.current_user", &self.routes.current_user),
        ] {
            if !route.starts_with('/') {
                return Err(ConfigError::Invalid {
                    key,
                    message: format!("{route} must start with /"),
                });
            }
        }
        Ok(())
    }

    /// Returns the request deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the task poll policy.
    #[must_use]
    pub const fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.poll_max_attempts,
        }
    }

    /// Returns the token file path, falling back to the platform data dir
    /// and then to the working directory.
    #[must_use]
    pub fn token_file(&self) -> PathBuf {
        self.token_file
            .clone()
            .or_else(FileTokenStore::default_path)
            .unwrap_or_else(|| PathBuf::from(".farmhand-tokens.json"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        let config = ClientConfig::load_from(None, env(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll_policy(), PollPolicy::default());
        assert!(ClientConfig::load_from(Some(missing.as_path()), env(&[])).is_err());
    }

    #[test]
    fn test_file_then_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("farmhand.toml");
        std::fs::write(
            &path,
            "base_url = \"https://farm.example.com/api\"\n\
             poll_interval_ms = 500\n\
             [routes]\n\
             refresh = \"/auth/token/refresh\"\n",
        )
        .unwrap();

        let config = ClientConfig::load_from(
            Some(path.as_path()),
            env(&[
                ("FARMHAND_REQUEST_TIMEOUT_SECS", "5"),
                ("FARMHAND_ROUTES__SIGN_IN", "/auth/login"),
            ]),
        )
        .unwrap();

        assert_eq!(config.base_url, "https://farm.example.com/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.poll_policy().interval, Duration::from_millis(500));
        assert_eq!(config.routes.refresh, "/auth/token/refresh");
        assert_eq!(config.routes.sign_in, "/auth/login");
        assert_eq!(config.routes.sign_up, "/auth/sign-up");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let error = ClientConfig::load_from(None, env(&[("FARMHAND_BASE_URL", "ftp://farm")]))
            .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { key: "base_url", .. }));
    }

    #[test]
    fn test_rejects_relative_route() {
        let config = ClientConfig {
            routes: AuthRoutes {
                refresh: "auth/refresh".to_string(),
                ..AuthRoutes::default()
            },
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "routes.refresh", .. })
        ));
    }

    #[test]
    fn test_explicit_token_file_wins() {
        let config = ClientConfig {
            token_file: Some(PathBuf::from("/tmp/t.json")),
            ..ClientConfig::default()
        };
        assert_eq!(config.token_file(), PathBuf::from("/tmp/t.json"));
    }
}
