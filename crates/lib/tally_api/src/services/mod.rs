//! Business logic behind the handlers.

pub mod auth;
pub mod cookies;
pub mod federated;
pub mod ledger;
