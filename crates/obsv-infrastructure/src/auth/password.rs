//! Password hashing and strength policy
//!
//! Bcrypt with a fixed cost factor for credential storage. Strength
//! validation is a separate concern from hashing and reports every failing
//! rule, not just the first.

use obsv_domain::Result;
use obsv_domain::constants::BCRYPT_COST;
use obsv_domain::error::Error;

/// Special characters accepted by the strength policy
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Hash a password with bcrypt (cost 12)
///
/// No length or charset validation happens here; callers run
/// [`PasswordPolicy::validate`] separately.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| Error::internal_with_source("Password hashing failed", e))
}

/// Verify a password against a bcrypt hash
///
/// A malformed hash is an error, not a `false`: verification failures must
/// be loud so a corrupted credential store is never mistaken for a wrong
/// password.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| Error::internal_with_source("Password verification failed", e))
}

/// Outcome of a strength check, listing every failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthReport {
    /// True when no rule failed
    pub is_valid: bool,
    /// Human-readable description of each failing rule
    pub errors: Vec<String>,
}

/// Password strength requirements
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Minimum password length
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordPolicy {
    /// Validate a password, accumulating all rule failures
    pub fn validate(&self, password: &str) -> StrengthReport {
        let mut errors = Vec::new();

        if password.chars().count() < self.min_length {
            errors.push(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }

        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push("Password must contain an uppercase letter".to_string());
        }

        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push("Password must contain a lowercase letter".to_string());
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain a number".to_string());
        }

        if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            errors.push("Password must contain a special character".to_string());
        }

        StrengthReport {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}
