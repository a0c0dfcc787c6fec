//! Configuration loader
//!
//! Merges configuration sources in order (later overrides earlier):
//! defaults, a TOML file when present, then `OBSV__`-prefixed environment
//! variables with `__` separating nested keys (e.g. `OBSV__SERVER__PORT`).

use crate::auth::service::parse_expiry;
use crate::config::AppConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use obsv_domain::constants::JWT_SECRET_MIN_LENGTH;
use obsv_domain::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable prefix for configuration keys
const CONFIG_ENV_PREFIX: &str = "OBSV__";

/// Configuration loader service
#[derive(Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load and validate configuration from all sources
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                info!(path = %config_path.display(), "loaded configuration file");
            }
        }

        figment = figment.merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"));

        let config: AppConfig = figment
            .extract()
            .map_err(|e| Error::config(format!("Failed to extract configuration: {e}")))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Reject configurations that cannot safely serve traffic
    fn validate(config: &AppConfig) -> Result<()> {
        if config.auth.jwt_secret.len() < JWT_SECRET_MIN_LENGTH {
            return Err(Error::config(format!(
                "auth.jwt_secret must be at least {JWT_SECRET_MIN_LENGTH} characters \
                 (set OBSV__AUTH__JWT_SECRET)"
            )));
        }

        // A malformed expiry is a deployment mistake, caught at startup.
        parse_expiry(&config.auth.jwt_expiry)?;

        for (name, class) in [
            ("auth", &config.rate_limit.auth),
            ("projects", &config.rate_limit.projects),
            ("agents", &config.rate_limit.agents),
            ("telemetry", &config.rate_limit.telemetry),
        ] {
            if class.max_requests == 0 || class.window_secs == 0 {
                return Err(Error::config(format!(
                    "rate_limit.{name} must have a non-zero window and quota"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "a-test-secret-of-sufficient-length!!".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(ConfigLoader::validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_secret_rejected() {
        let config = AppConfig::default();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = valid_config();
        config.auth.jwt_secret = "too-short".to_string();
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_bad_expiry_rejected() {
        let mut config = valid_config();
        config.auth.jwt_expiry = "2 weeks".to_string();
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_zero_quota_rejected() {
        let mut config = valid_config();
        config.rate_limit.agents.max_requests = 0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_load_applies_defaults() {
        // No file, no env: extraction succeeds but validation trips on the
        // empty secret, proving defaults flow through the figment stack.
        let result = ConfigLoader::new().load();
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
