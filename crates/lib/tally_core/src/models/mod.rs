//! Domain models shared across stores and the API layer.

pub mod auth;
pub mod ledger;
