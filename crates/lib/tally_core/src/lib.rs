//! # tally_core
//!
//! Core domain logic for Tally: identity records, the ledger, tokens and
//! sessions. Nothing in here knows about HTTP.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
