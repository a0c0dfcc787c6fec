//! JSON error catchers
//!
//! Guard failures and framework-level errors land here; catcher bodies stay
//! generic so nothing about token verification internals leaks to clients.

use crate::guards::RateLimitTrace;
use rocket::Request;
use rocket::serde::json::Json;
use serde_json::{Value, json};

#[rocket::catch(400)]
pub fn bad_request() -> Json<Value> {
    Json(json!({ "error": "Invalid request" }))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<Value> {
    Json(json!({ "error": "Authentication required" }))
}

#[rocket::catch(403)]
pub fn forbidden() -> Json<Value> {
    Json(json!({ "error": "Insufficient permissions" }))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<Value> {
    Json(json!({ "error": "Not found" }))
}

#[rocket::catch(429)]
pub fn too_many_requests(request: &Request<'_>) -> Json<Value> {
    let trace: &RateLimitTrace = request.local_cache(RateLimitTrace::default);
    let retry_after = trace.retry_after_secs.unwrap_or(1);
    Json(json!({ "error": "Too many requests", "retryAfter": retry_after }))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<Value> {
    Json(json!({ "error": "Internal server error" }))
}
