//! HTTP gate for the Observatory control plane
//!
//! Every inbound request flows rate limiter -> auth guard -> handler.
//! Rate limiting and authentication are Rocket request guards backed by the
//! infrastructure stores; quota headers ride on a response fairing; error
//! bodies come from JSON catchers.

pub mod agents;
pub mod builder;
pub mod catchers;
pub mod fairings;
pub mod guards;
pub mod response;
pub mod routes;
pub mod state;

pub use builder::build_rocket;
pub use state::AppState;
