//! HTTP route handlers

pub mod agents;
pub mod auth;
pub mod health;
