//! Client-side agent control
//!
//! A local, periodically-refreshed view of agent states with optimistic
//! command execution. The server transport sits behind the
//! [`StatusTransport`] port so the manager logic is testable without a
//! network.

pub mod manager;
pub mod transport;

pub use manager::{AgentControlManager, StatusEvent, Subscription};
pub use transport::{CommandAck, CommandRequest, HttpStatusTransport, StatusTransport};
