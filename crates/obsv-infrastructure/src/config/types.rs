//! Configuration types

use obsv_domain::constants::{
    JWT_DEFAULT_EXPIRY, RATE_LIMIT_AGENTS_MAX_REQUESTS, RATE_LIMIT_AGENTS_WINDOW_SECS,
    RATE_LIMIT_AUTH_MAX_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECS, RATE_LIMIT_PROJECTS_MAX_REQUESTS,
    RATE_LIMIT_PROJECTS_WINDOW_SECS, RATE_LIMIT_TELEMETRY_MAX_REQUESTS,
    RATE_LIMIT_TELEMETRY_WINDOW_SECS,
};
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerSettings,
    /// Authentication settings
    pub auth: AuthSettings,
    /// Rate limiting settings
    pub rate_limit: RateLimitSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

/// Authentication settings
///
/// The JWT secret is empty by default and **must** be configured; the
/// loader rejects configurations with a missing or short secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC signing secret (min 32 chars). Configure via
    /// `OBSV__AUTH__JWT_SECRET` or `auth.jwt_secret` in the config file.
    pub jwt_secret: String,
    /// Token lifetime as `<int><unit>`, unit in {s, m, h, d}
    pub jwt_expiry: String,
    /// Secret for session-cookie signing
    pub session_secret: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiry: JWT_DEFAULT_EXPIRY.to_string(),
            session_secret: String::new(),
        }
    }
}

/// Window and quota for one endpoint class
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassSettings {
    /// Window duration in seconds
    pub window_secs: u64,
    /// Maximum requests per window
    pub max_requests: u32,
}

/// Rate limiting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Whether proxy-supplied client-IP headers may be believed
    pub trust_proxy_headers: bool,
    /// Login/token endpoints
    pub auth: ClassSettings,
    /// Project endpoints
    pub projects: ClassSettings,
    /// Agent endpoints
    pub agents: ClassSettings,
    /// Telemetry endpoints
    pub telemetry: ClassSettings,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            trust_proxy_headers: false,
            auth: ClassSettings {
                window_secs: RATE_LIMIT_AUTH_WINDOW_SECS,
                max_requests: RATE_LIMIT_AUTH_MAX_REQUESTS,
            },
            projects: ClassSettings {
                window_secs: RATE_LIMIT_PROJECTS_WINDOW_SECS,
                max_requests: RATE_LIMIT_PROJECTS_MAX_REQUESTS,
            },
            agents: ClassSettings {
                window_secs: RATE_LIMIT_AGENTS_WINDOW_SECS,
                max_requests: RATE_LIMIT_AGENTS_MAX_REQUESTS,
            },
            telemetry: ClassSettings {
                window_secs: RATE_LIMIT_TELEMETRY_WINDOW_SECS,
                max_requests: RATE_LIMIT_TELEMETRY_MAX_REQUESTS,
            },
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level filter (e.g. "info", "obsv_server=debug")
    pub level: String,
    /// Emit JSON-structured log lines
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
