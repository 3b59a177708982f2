//! Request handlers.

pub mod accounts;
pub mod auth;
pub mod categories;
pub mod oauth;
pub mod profile;
