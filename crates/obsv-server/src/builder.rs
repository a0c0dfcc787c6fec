//! Rocket assembly
//!
//! A single composition point shared by `main` and the integration tests:
//! managed state, routes, response fairing, and catchers.

use crate::catchers;
use crate::fairings::RateLimitHeaders;
use crate::routes::{agents, auth, health};
use crate::state::AppState;
use rocket::{Build, Rocket};

/// Build the Rocket instance with all routes, fairings, and catchers
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .attach(RateLimitHeaders)
        .mount(
            "/",
            rocket::routes![
                health::health,
                auth::login,
                auth::logout,
                agents::status,
                agents::command,
                agents::project_status,
                agents::project_command,
            ],
        )
        .register(
            "/",
            rocket::catchers![
                catchers::bad_request,
                catchers::unauthorized,
                catchers::forbidden,
                catchers::not_found,
                catchers::too_many_requests,
                catchers::internal_error,
            ],
        )
}
