//! Domain layer for the Observatory control plane
//!
//! Core types shared by the infrastructure, server, and client crates:
//! the error taxonomy, the agent control model, and validated identifiers.
//! This crate performs no I/O.

pub mod agent;
pub mod constants;
pub mod error;
pub mod project;

pub use agent::{
    AgentCommand, AgentControl, AgentKind, AgentStatus, CommandOutcome, CommandRecord,
};
pub use error::{Error, Result};
pub use project::ProjectId;
