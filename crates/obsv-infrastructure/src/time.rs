//! Clock helpers
//!
//! Stores that depend on wall-clock time take an explicit `now` in their
//! `*_at` variants so tests can advance logical time; these helpers feed
//! the non-`_at` entry points.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in whole seconds
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current unix time in milliseconds
pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
