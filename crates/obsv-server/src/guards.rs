//! Request guards: rate limiting and authentication
//!
//! Guard order in a route's signature is enforcement order, so handlers
//! list the rate-limit guard before the auth guard: a blocked client gets
//! its 429 without touching token verification.

use crate::state::AppState;
use obsv_domain::constants::AUTH_COOKIE_NAME;
use obsv_infrastructure::auth::Claims;
use obsv_infrastructure::rate_limit::{ApiClass, ClientHint, ClientKeyStrategy};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

/// Authentication failure reported by the auth guards
#[derive(Debug)]
pub enum AuthError {
    /// No bearer header and no auth cookie
    MissingToken,
    /// Signature, shape, expiry, or revocation check failed
    InvalidToken,
}

/// Required-mode authentication: the request must carry a verified,
/// non-revoked token. Handlers receive the claims.
pub struct Authenticated(pub Claims);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Authenticated {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(state) = request.rocket().state::<AppState>() else {
            return Outcome::Error((Status::InternalServerError, AuthError::InvalidToken));
        };

        let Some(token) = extract_token(request) else {
            return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
        };

        match state.auth.verify_token(&token) {
            Ok(claims) => Outcome::Success(Authenticated(claims)),
            Err(_) => Outcome::Error((Status::Unauthorized, AuthError::InvalidToken)),
        }
    }
}

/// Optional-mode authentication: never fails; carries claims when a valid
/// token was presented and nothing otherwise.
pub struct MaybeAuthenticated(pub Option<Claims>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for MaybeAuthenticated {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let claims = request
            .rocket()
            .state::<AppState>()
            .and_then(|state| extract_token(request).and_then(|t| state.auth.verify_token(&t).ok()));
        Outcome::Success(MaybeAuthenticated(claims))
    }
}

/// Bearer header first, then the auth cookie
fn extract_token(request: &Request<'_>) -> Option<String> {
    if let Some(header) = request.headers().get_one("Authorization") {
        if let Some(token) = header.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    request
        .cookies()
        .get(AUTH_COOKIE_NAME)
        .map(|c| c.value().to_string())
}

/// Request-local record of the rate limit decision, read by the header
/// fairing and the 429 catcher.
#[derive(Debug, Clone, Default)]
pub struct RateLimitTrace {
    /// Endpoint class the request was counted under
    pub class: Option<ApiClass>,
    /// Derived client key
    pub key: Option<String>,
    /// Window maximum
    pub limit: u32,
    /// Requests left after this one
    pub remaining: u32,
    /// Window reset (epoch milliseconds)
    pub reset_at_ms: u64,
    /// Set only when the request was blocked
    pub retry_after_secs: Option<u64>,
}

/// Run the fixed-window check for `class`, stashing the decision in the
/// request-local cache either way.
fn enforce(request: &Request<'_>, class: ApiClass) -> request::Outcome<(), ()> {
    let Some(state) = request.rocket().state::<AppState>() else {
        return Outcome::Error((Status::InternalServerError, ()));
    };

    let hint = client_hint(request);
    let key = state.key_strategy.client_key(&hint);
    let limiter = state.limits.limiter(class);

    match limiter.check(&key) {
        Ok(quota) => {
            request.local_cache(|| RateLimitTrace {
                class: Some(class),
                key: Some(key),
                limit: quota.limit,
                remaining: quota.remaining,
                reset_at_ms: quota.reset_at_ms,
                retry_after_secs: None,
            });
            Outcome::Success(())
        }
        Err(retry_after) => {
            // Round up: a block must always advertise a positive wait.
            let secs = retry_after.as_secs().max(1);
            request.local_cache(|| RateLimitTrace {
                class: Some(class),
                key: Some(key),
                limit: limiter.config().max_requests,
                remaining: 0,
                reset_at_ms: 0,
                retry_after_secs: Some(secs),
            });
            Outcome::Error((Status::TooManyRequests, ()))
        }
    }
}

/// Fill the framework-neutral hint from the inbound request
fn client_hint(request: &Request<'_>) -> ClientHint {
    let header = |name: &str| request.headers().get_one(name).map(str::to_string);
    ClientHint {
        forwarded_for: header("X-Forwarded-For"),
        real_ip: header("X-Real-IP"),
        cf_connecting_ip: header("CF-Connecting-IP"),
        remote_addr: request.remote().map(|addr| addr.ip()),
    }
}

macro_rules! rate_limit_guard {
    ($name:ident, $class:expr, $doc:literal) => {
        #[doc = $doc]
        pub struct $name;

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = ();

            async fn from_request(
                request: &'r Request<'_>,
            ) -> request::Outcome<Self, Self::Error> {
                match enforce(request, $class) {
                    Outcome::Success(()) => Outcome::Success($name),
                    Outcome::Error(e) => Outcome::Error(e),
                    Outcome::Forward(f) => Outcome::Forward(f),
                }
            }
        }
    };
}

rate_limit_guard!(AuthRateLimit, ApiClass::Auth, "Rate limit guard for the auth endpoint class");
rate_limit_guard!(
    ProjectsRateLimit,
    ApiClass::Projects,
    "Rate limit guard for the projects endpoint class"
);
rate_limit_guard!(
    AgentsRateLimit,
    ApiClass::Agents,
    "Rate limit guard for the agents endpoint class"
);
