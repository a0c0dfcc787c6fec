//! Health probe
//!
//! Exempt from rate limiting and reachable without credentials (optional
//! auth mode): a valid token only enriches the response.

use crate::guards::MaybeAuthenticated;
use rocket::serde::json::Json;
use serde_json::{Value, json};

#[rocket::get("/api/health")]
pub fn health(auth: MaybeAuthenticated) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "authenticated": auth.0.is_some(),
    }))
}
