//! Authentication building blocks
//!
//! Password hashing and strength policy, JWT claims, the token revocation
//! store, and the token service that ties them together. The HTTP-facing
//! guards live in the server crate; everything here is transport-agnostic.

pub mod claims;
pub mod password;
pub mod revocation;
pub mod service;

pub use claims::Claims;
pub use password::{PasswordPolicy, StrengthReport, hash_password, verify_password};
pub use revocation::TokenRevocationStore;
pub use service::{AuthService, AuthServiceConfig};
