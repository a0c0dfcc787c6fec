//! Structured logging with tracing
//!
//! Centralized subscriber setup plus an audit helper that runs every event
//! payload through redaction before it reaches a sink.

use crate::config::LoggingSettings;
use crate::redact::redacted;
use obsv_domain::error::{Error, Result};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with the provided configuration
///
/// `OBSV_LOG` overrides the configured level filter. Returns an error if a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingSettings) -> Result<()> {
    let filter =
        EnvFilter::try_from_env("OBSV_LOG").unwrap_or_else(|_| EnvFilter::new(&config.level));

    // json/plain layer types differ, so the branches cannot share a binding
    if config.json_format {
        let stdout = fmt::layer().json().with_target(true);
        Registry::default()
            .with(filter)
            .with(stdout)
            .try_init()
            .map_err(|e| Error::config(format!("Failed to initialize logging: {e}")))?;
    } else {
        let stdout = fmt::layer().with_target(true);
        Registry::default()
            .with(filter)
            .with(stdout)
            .try_init()
            .map_err(|e| Error::config(format!("Failed to initialize logging: {e}")))?;
    }

    Ok(())
}

/// Emit an audit event with a redacted payload
///
/// The payload is sanitized recursively before emission, so callers may pass
/// request/response fragments without worrying about credential leakage.
pub fn audit(event: &str, payload: &Value) {
    let sanitized = redacted(payload);
    info!(event, payload = %sanitized, "audit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audit_payload_is_redacted_not_original() {
        // audit() must never log the raw payload; the sanitizer contract is
        // covered in redact.rs, here we pin the composition.
        let payload = json!({"user": "admin", "password": "admin123"});
        let sanitized = redacted(&payload);
        assert_eq!(sanitized["password"], "[REDACTED]");
        audit("login attempt", &payload);
        // Original payload untouched by the call.
        assert_eq!(payload["password"], "admin123");
    }
}
