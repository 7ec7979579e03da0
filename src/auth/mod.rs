//! Authentication module
//!
//! Owns the OAuth token pair of a client and renews it against the
//! application's OAuth server.
//!
//! The `TokenManager` serializes renewals behind a write lock and replaces
//! both tokens together, so readers never observe a half-updated pair.

mod token_manager;
mod types;

pub use token_manager::TokenManager;
pub use types::{AppCredentials, TokenState};

#[cfg(test)]
mod tests;
