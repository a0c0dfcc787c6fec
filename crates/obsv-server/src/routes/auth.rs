//! Login and logout
//!
//! Login validates the body, checks credentials against the user directory,
//! and mints a JWT delivered both in the JSON body and as an HttpOnly
//! cookie. Credential failures always return the same generic message so
//! the endpoint cannot be used to enumerate usernames.

use crate::guards::{AuthRateLimit, Authenticated};
use crate::response::ApiError;
use crate::state::AppState;
use obsv_domain::constants::AUTH_COOKIE_NAME;
use obsv_domain::error::Error;
use obsv_infrastructure::auth::password::verify_password;
use obsv_infrastructure::logging::audit;
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    id: String,
    permissions: Vec<String>,
    #[serde(rename = "projectIds")]
    project_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    token: String,
    user: UserInfo,
}

#[rocket::post("/api/auth/login", format = "json", data = "<body>")]
pub async fn login(
    _rate: AuthRateLimit,
    body: Result<Json<LoginRequest>, rocket::serde::json::Error<'_>>,
    cookies: &CookieJar<'_>,
    state: &State<AppState>,
) -> Result<Json<LoginResponse>, ApiError> {
    // A body that fails to parse is a plain validation failure, not a 422.
    let body = body
        .map_err(|_| Error::validation("Invalid request body"))?
        .into_inner();

    if body.username.trim().is_empty() {
        return Err(Error::validation_field("Username is required", "username").into());
    }
    if body.password.is_empty() {
        return Err(Error::validation_field("Password is required", "password").into());
    }

    let user = match state.users.get(&body.username) {
        Some(user) if verify_password(&body.password, &user.password_hash)? => user,
        _ => {
            audit(
                "login rejected",
                &json!({ "username": body.username, "password": body.password }),
            );
            return Err(Error::authentication("Invalid credentials").into());
        }
    };

    let (token, _claims) = state.auth.generate_token(
        &user.id,
        user.project_ids.clone(),
        user.permissions.clone(),
    )?;

    audit("login succeeded", &json!({ "username": body.username }));

    cookies.add(
        Cookie::build((AUTH_COOKIE_NAME, token.clone()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(rocket::time::Duration::seconds(
                state.auth.expiry_secs() as i64
            )),
    );

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: user.id.clone(),
            permissions: user.permissions.clone(),
            project_ids: user.project_ids.clone(),
        },
    }))
}

#[rocket::post("/api/auth/logout")]
pub async fn logout(
    _rate: AuthRateLimit,
    auth: Authenticated,
    cookies: &CookieJar<'_>,
    state: &State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.auth.revoke_token(&auth.0)?;
    cookies.remove(Cookie::build(AUTH_COOKIE_NAME).path("/"));
    audit("logout", &json!({ "user": auth.0.sub }));
    Ok(Json(json!({ "success": true })))
}
