//! Audit log redaction
//!
//! Security-sensitive fields must never reach a log sink unredacted.
//! Redaction walks JSON trees recursively, matching field names
//! case-insensitively; emails and phone numbers are partially masked so
//! log lines stay correlatable without exposing the value.

use serde_json::Value;

/// The replacement text for fully redacted values
const REDACTED: &str = "[REDACTED]";

/// Field names whose values are fully redacted (matched case-insensitively,
/// by substring, so `authToken` and `api_key` are both caught)
const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "apikey",
    "api_key",
    "authorization",
    "cookie",
    "session",
    "secret",
];

/// Redact sensitive fields in place, recursively through objects and arrays
pub fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                if is_sensitive_field(&key_lower) {
                    *entry = Value::String(REDACTED.to_string());
                } else if key_lower.contains("email") {
                    if let Value::String(s) = entry {
                        *entry = Value::String(redact_email(s));
                    } else {
                        redact_value(entry);
                    }
                } else if key_lower.contains("phone") {
                    if let Value::String(s) = entry {
                        *entry = Value::String(redact_phone(s));
                    } else {
                        redact_value(entry);
                    }
                } else {
                    redact_value(entry);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_value(item);
            }
        }
        _ => {}
    }
}

/// Redact a value tree, returning the sanitized copy
pub fn redacted(value: &Value) -> Value {
    let mut copy = value.clone();
    redact_value(&mut copy);
    copy
}

/// Whether a lowercased field name is fully sensitive
fn is_sensitive_field(key_lower: &str) -> bool {
    SENSITIVE_FIELDS.iter().any(|f| key_lower.contains(f))
}

/// Partially mask an email: `xx***@domain`
fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let prefix: String = local.chars().take(2).collect();
            format!("{prefix}***@{domain}")
        }
        None => REDACTED.to_string(),
    }
}

/// Mask all but the last four digits of a phone number
fn redact_phone(phone: &str) -> String {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let mut seen = 0;
    phone
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if digits - seen >= 4 { '*' } else { c }
            } else {
                c
            }
        })
        .collect()
}
