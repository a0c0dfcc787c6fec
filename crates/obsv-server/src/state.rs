//! Application state wiring
//!
//! Every store is constructor-built here and injected through Rocket's
//! managed state: no module-level singletons, so tests spin up isolated
//! instances with their own configuration.

use crate::agents::AgentRegistry;
use obsv_domain::error::Result;
use obsv_infrastructure::auth::password::hash_password;
use obsv_infrastructure::auth::{AuthService, AuthServiceConfig, TokenRevocationStore};
use obsv_infrastructure::config::AppConfig;
use obsv_infrastructure::rate_limit::{IpKeyStrategy, RateLimiterRegistry};
use obsv_infrastructure::task::SweeperHandle;
use std::collections::HashMap;
use std::sync::Arc;

/// A dashboard user with stored credentials and grants
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Stable user id
    pub id: String,
    /// Bcrypt password hash
    pub password_hash: String,
    /// Granted permissions
    pub permissions: Vec<String>,
    /// Projects the user may act on
    pub project_ids: Vec<String>,
}

/// In-memory username -> user mapping
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, UserRecord>,
}

impl UserDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with the development admin account
    /// (`admin` / `admin123`); the hash is computed at boot so it always
    /// matches the documented credential.
    pub fn seeded() -> Result<Self> {
        let mut directory = Self::new();
        directory.insert(
            "admin",
            UserRecord {
                id: "admin".to_string(),
                password_hash: hash_password("admin123")?,
                permissions: vec![
                    "admin".to_string(),
                    "read".to_string(),
                    "write".to_string(),
                ],
                project_ids: Vec::new(),
            },
        );
        Ok(directory)
    }

    /// Insert or replace a user
    pub fn insert(&mut self, username: &str, record: UserRecord) {
        self.users.insert(username.to_string(), record);
    }

    /// Look up a user by username
    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }
}

/// Shared application state managed by Rocket
pub struct AppState {
    /// Token mint/verify service
    pub auth: AuthService,
    /// Revocation store (shared with the auth service)
    pub revocations: Arc<TokenRevocationStore>,
    /// Per-class rate limiters
    pub limits: RateLimiterRegistry,
    /// Client key derivation policy
    pub key_strategy: IpKeyStrategy,
    /// Credential directory
    pub users: UserDirectory,
    /// Agent collection behind the status/command endpoints
    pub agents: AgentRegistry,
}

impl AppState {
    /// Build the full state graph from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let revocations = Arc::new(TokenRevocationStore::new());
        let auth = AuthService::new(
            AuthServiceConfig {
                jwt_secret: config.auth.jwt_secret.clone(),
                jwt_expiry: config.auth.jwt_expiry.clone(),
            },
            Arc::clone(&revocations),
        )?;

        Ok(Self {
            auth,
            revocations,
            limits: RateLimiterRegistry::new(&config.rate_limit),
            key_strategy: IpKeyStrategy {
                trust_proxy_headers: config.rate_limit.trust_proxy_headers,
            },
            users: UserDirectory::seeded()?,
            agents: AgentRegistry::seeded(),
        })
    }

    /// Spawn the background sweepers for every expiring store
    pub fn spawn_sweepers(&self) -> Vec<SweeperHandle> {
        let mut handles = self.limits.spawn_sweepers();
        handles.push(self.revocations.spawn_sweeper());
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsv_infrastructure::auth::password::verify_password;

    #[test]
    fn test_seeded_admin_credentials() {
        let directory = UserDirectory::seeded().expect("seed");
        let admin = directory.get("admin").expect("admin exists");
        assert!(verify_password("admin123", &admin.password_hash).expect("verify"));
        assert_eq!(admin.permissions, vec!["admin", "read", "write"]);
    }

    #[test]
    fn test_state_rejects_bad_config() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "a-test-secret-of-sufficient-length!!".to_string();
        config.auth.jwt_expiry = "never".to_string();
        assert!(AppState::from_config(&config).is_err());
    }
}
