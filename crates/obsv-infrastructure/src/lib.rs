//! Infrastructure layer for the Observatory control plane
//!
//! Cross-cutting technical concerns: password hashing, JWT issuance and
//! verification, token revocation, fixed-window rate limiting, configuration
//! loading, and structured logging with audit redaction.

pub mod auth;
pub mod config;
pub mod logging;
pub mod rate_limit;
pub mod redact;
pub mod task;
pub mod time;
