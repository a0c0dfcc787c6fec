//! JWT claims structure and access predicates

use crate::time::now_unix_secs;
use serde::{Deserialize, Serialize};

/// JWT claims carried by an Observatory auth token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID); serialized as `userId` on the wire
    #[serde(rename = "userId")]
    pub sub: String,
    /// Projects the token is scoped to
    #[serde(default, rename = "projectIds")]
    pub project_ids: Vec<String>,
    /// Granted permissions (e.g. "admin", "read", "write")
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Issued at timestamp (epoch seconds)
    pub iat: u64,
    /// Expiration timestamp (epoch seconds)
    pub exp: u64,
    /// Unique token id enabling individual revocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Create new claims expiring `expiry_secs` from now
    pub fn new(
        user_id: String,
        project_ids: Vec<String>,
        permissions: Vec<String>,
        jti: String,
        expiry_secs: u64,
    ) -> Self {
        let now = now_unix_secs();
        Self {
            sub: user_id,
            project_ids,
            permissions,
            iat: now,
            exp: now + expiry_secs,
            jti: Some(jti),
        }
    }

    /// True iff the permission set contains `name`
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p == name)
    }

    /// True if the token grants access to `project_id`
    ///
    /// Admin tokens bypass project scoping entirely.
    pub fn has_project_access(&self, project_id: &str) -> bool {
        self.has_permission("admin") || self.project_ids.iter().any(|p| p == project_id)
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        self.exp < now_unix_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: &[&str], projects: &[&str]) -> Claims {
        Claims::new(
            "user-1".to_string(),
            projects.iter().map(ToString::to_string).collect(),
            permissions.iter().map(ToString::to_string).collect(),
            "jti-1".to_string(),
            3600,
        )
    }

    #[test]
    fn test_permission_predicate() {
        let c = claims(&["read", "write"], &[]);
        assert!(c.has_permission("read"));
        assert!(!c.has_permission("admin"));
    }

    #[test]
    fn test_admin_bypasses_project_scoping() {
        let c = claims(&["admin"], &[]);
        assert!(c.has_project_access("any-project"));
        assert!(c.has_project_access("another-one"));
    }

    #[test]
    fn test_non_admin_requires_listed_project() {
        let c = claims(&["read"], &["proj-a"]);
        assert!(c.has_project_access("proj-a"));
        assert!(!c.has_project_access("proj-b"));
    }

    #[test]
    fn test_fresh_claims_not_expired() {
        assert!(!claims(&[], &[]).is_expired());
    }
}
