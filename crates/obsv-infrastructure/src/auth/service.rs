//! Token issuance and verification
//!
//! HMAC-SHA256 JWTs signed with a configured secret. Every minted token
//! carries a fresh v4 jti so it can be individually revoked before its
//! natural expiry; verification consults the revocation store whenever a
//! jti is present.

use super::claims::Claims;
use super::revocation::TokenRevocationStore;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use obsv_domain::constants::JWT_DEFAULT_EXPIRY;
use obsv_domain::error::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// HMAC signing secret
    pub jwt_secret: String,
    /// Token lifetime as `<int><unit>` with unit in {s, m, h, d}
    pub jwt_expiry: String,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiry: JWT_DEFAULT_EXPIRY.to_string(),
        }
    }
}

/// JWT mint/verify service with revocation awareness
pub struct AuthService {
    config: AuthServiceConfig,
    expiry_secs: u64,
    revocations: Arc<TokenRevocationStore>,
}

impl AuthService {
    /// Create a new service
    ///
    /// Fails if the expiry duration string is malformed: that is a fatal
    /// configuration error, not something to surface per-request.
    pub fn new(config: AuthServiceConfig, revocations: Arc<TokenRevocationStore>) -> Result<Self> {
        let expiry_secs = parse_expiry(&config.jwt_expiry)?;
        Ok(Self {
            config,
            expiry_secs,
            revocations,
        })
    }

    /// Mint a signed token for a user
    pub fn generate_token(
        &self,
        user_id: &str,
        project_ids: Vec<String>,
        permissions: Vec<String>,
    ) -> Result<(String, Claims)> {
        let claims = Claims::new(
            user_id.to_string(),
            project_ids,
            permissions,
            uuid::Uuid::new_v4().to_string(),
            self.expiry_secs,
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| Error::internal_with_source("Token generation failed", e))?;

        Ok((token, claims))
    }

    /// Verify a token's signature, expiry, shape, and revocation state
    ///
    /// All failure modes collapse into a generic authentication error;
    /// the specific cause goes to the debug log, never to the client.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!(error = %e, "token verification failed");
            Error::authentication("Invalid authentication token")
        })?;

        let claims = data.claims;

        if let Some(jti) = &claims.jti {
            if self.revocations.is_revoked(jti) {
                debug!(token_id = %jti, "token is revoked");
                return Err(Error::authentication("Invalid authentication token"));
            }
        }

        Ok(claims)
    }

    /// Revoke a verified token until its natural expiry
    ///
    /// Tokens minted without a jti cannot be individually revoked.
    pub fn revoke_token(&self, claims: &Claims) -> Result<()> {
        let jti = claims
            .jti
            .as_deref()
            .ok_or_else(|| Error::validation("Token has no revocable id"))?;
        self.revocations.revoke(jti, claims.exp);
        Ok(())
    }

    /// Configured token lifetime in seconds
    pub fn expiry_secs(&self) -> u64 {
        self.expiry_secs
    }
}

/// Parse a duration string of the form `<integer><unit>`, unit in {s,m,h,d}
pub fn parse_expiry(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    // Split on char boundaries: the unit may be any (multi-byte) character
    // and must still come back as a clean Config error.
    let Some((unit_idx, unit)) = raw.char_indices().last() else {
        return Err(Error::config(format!("Invalid JWT expiry duration: {raw:?}")));
    };
    let value: u64 = raw[..unit_idx]
        .parse()
        .map_err(|_| Error::config(format!("Invalid JWT expiry duration: {raw:?}")))?;

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86_400,
        _ => {
            return Err(Error::config(format!(
                "Invalid JWT expiry unit in {raw:?} (expected s, m, h, or d)"
            )));
        }
    };

    Ok(value * multiplier)
}
