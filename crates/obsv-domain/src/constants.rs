//! Shared constants for the Observatory control plane

/// Bcrypt cost factor for password hashing
pub const BCRYPT_COST: u32 = 12;

/// Default JWT expiry as a duration string (`<int><unit>`, unit in s/m/h/d)
pub const JWT_DEFAULT_EXPIRY: &str = "24h";

/// Minimum accepted JWT secret length
pub const JWT_SECRET_MIN_LENGTH: usize = 32;

/// Name of the session cookie carrying the auth token
pub const AUTH_COOKIE_NAME: &str = "auth-token";

/// Interval between revocation store sweeps, in seconds
pub const REVOCATION_SWEEP_INTERVAL_SECS: u64 = 300;

/// Interval between rate limiter sweeps, in seconds
pub const RATE_LIMIT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Maximum number of keys retained by a rate limiter store
pub const RATE_LIMIT_MAX_STORE_SIZE: usize = 10_000;

/// Fraction of oldest entries evicted when the store overflows (percent)
pub const RATE_LIMIT_EVICTION_PERCENT: usize = 10;

/// Default window and quota for the auth endpoint class (15 min / 10 requests)
pub const RATE_LIMIT_AUTH_WINDOW_SECS: u64 = 900;
/// Maximum auth requests per window
pub const RATE_LIMIT_AUTH_MAX_REQUESTS: u32 = 10;

/// Default window and quota for the projects endpoint class
pub const RATE_LIMIT_PROJECTS_WINDOW_SECS: u64 = 60;
/// Maximum project requests per window
pub const RATE_LIMIT_PROJECTS_MAX_REQUESTS: u32 = 100;

/// Default window and quota for the agents endpoint class
pub const RATE_LIMIT_AGENTS_WINDOW_SECS: u64 = 60;
/// Maximum agent requests per window
pub const RATE_LIMIT_AGENTS_MAX_REQUESTS: u32 = 60;

/// Default window and quota for the telemetry endpoint class
pub const RATE_LIMIT_TELEMETRY_WINDOW_SECS: u64 = 60;
/// Maximum telemetry requests per window
pub const RATE_LIMIT_TELEMETRY_MAX_REQUESTS: u32 = 300;

/// Minimum accepted project slug length
pub const PROJECT_SLUG_MIN_LENGTH: usize = 3;

/// Maximum accepted project slug length
pub const PROJECT_SLUG_MAX_LENGTH: usize = 64;
