//! Configuration
//!
//! Typed settings merged from defaults, an optional TOML file, and
//! `OBSV__`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    AppConfig, AuthSettings, ClassSettings, LoggingSettings, RateLimitSettings, ServerSettings,
};
