//! Response fairings

use crate::guards::RateLimitTrace;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Request, Response};

/// Attaches rate limit headers to every response that went through a
/// rate-limit guard, and applies post-hoc outcome bookkeeping for limiters
/// configured to refund successful or failed requests.
pub struct RateLimitHeaders;

#[rocket::async_trait]
impl Fairing for RateLimitHeaders {
    fn info(&self) -> Info {
        Info {
            name: "Rate Limit Headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let trace: &RateLimitTrace = request.local_cache(RateLimitTrace::default);
        let Some(class) = trace.class else {
            return;
        };

        response.set_header(Header::new("X-RateLimit-Limit", trace.limit.to_string()));
        response.set_header(Header::new(
            "X-RateLimit-Remaining",
            trace.remaining.to_string(),
        ));

        if let Some(retry_after) = trace.retry_after_secs {
            response.set_header(Header::new("Retry-After", retry_after.to_string()));
            response.set_header(Header::new(
                "X-RateLimit-Reset",
                (Utc::now() + chrono::Duration::seconds(retry_after as i64)).to_rfc3339(),
            ));
        } else if let Some(reset) = DateTime::<Utc>::from_timestamp_millis(trace.reset_at_ms as i64)
        {
            response.set_header(Header::new("X-RateLimit-Reset", reset.to_rfc3339()));
        }

        // Outcome bookkeeping only matters for limiters with skip flags;
        // for the rest record_outcome is a no-op.
        if let (Some(state), Some(key)) = (request.rocket().state::<AppState>(), &trace.key) {
            if trace.retry_after_secs.is_none() {
                let success = response.status().code < 400;
                state.limits.limiter(class).record_outcome(key, success);
            }
        }
    }
}
