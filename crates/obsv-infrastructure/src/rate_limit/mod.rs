//! Fixed-window rate limiting
//!
//! A bounded per-key counter with background sweeping, a pluggable
//! client-key derivation strategy, and a registry of preconfigured limiters
//! per API endpoint class.

pub mod core;
pub mod key;
pub mod registry;

pub use core::{Quota, RateLimitConfig, RateLimiter};
pub use key::{ClientHint, ClientKeyStrategy, IpKeyStrategy};
pub use registry::{ApiClass, RateLimiterRegistry};
