//! # tally_api
//!
//! HTTP API library for Tally.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, StatusCode};
use axum::routing::{get, post};
use axum::{Json, response::IntoResponse};
use tower_http::cors::{Any, CorsLayer};

use tally_core::auth::identity::IdentityVerifier;
use tally_core::auth::jwt::TokenService;
use tally_core::auth::session::SessionStore;
use tally_core::store::memory::MemoryStore;
use tally_core::store::{CredentialStore, LedgerStore};

use crate::config::ApiConfig;
use crate::handlers::{accounts, auth, categories, oauth, profile};
use crate::models::ErrorResponse;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity records.
    pub credentials: Arc<dyn CredentialStore>,
    /// Accounts and categories.
    pub ledger: Arc<dyn LedgerStore>,
    /// Access token issuance and verification.
    pub tokens: Arc<TokenService>,
    /// Federated-login sessions.
    pub sessions: Arc<SessionStore>,
    /// Identity-provider assertion checks.
    pub identity: Arc<dyn IdentityVerifier>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        credentials: Arc<dyn CredentialStore>,
        ledger: Arc<dyn LedgerStore>,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            credentials,
            ledger,
            tokens: Arc::new(TokenService::new(&config.token_config())),
            sessions: Arc::new(SessionStore::new(config.session_max_age())),
            identity,
            config,
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: ApiConfig, identity: Arc<dyn IdentityVerifier>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store, identity)
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            middleware::auth::ACCESS_TOKEN_HEADER,
            HeaderName::from_static("origin"),
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
        ]);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::POST_SIGNUP, post(auth::signup_handler))
        .route(routes::POST_SIGNIN, post(auth::signin_handler))
        .route(routes::POST_CHECKUSER, post(auth::check_user_handler))
        .route(routes::POST_CHECKTOKEN, post(auth::check_token_handler))
        .route(
            routes::AUTH_GOOGLE,
            post(oauth::google_login_handler).get(oauth::google_direct_access_handler),
        );

    // Protected routes (require auth)
    let protected = Router::new()
        .route(
            routes::GET_AUTH_CHECKSIGNEDIN,
            get(auth::check_signed_in_handler),
        )
        .route(
            routes::ACCOUNTS,
            get(accounts::list_accounts_handler)
                .post(accounts::create_account_handler)
                .put(accounts::update_account_handler)
                .delete(accounts::delete_account_handler),
        )
        .route(
            routes::CATEGORIES,
            get(categories::list_categories_handler).post(categories::create_category_handler),
        )
        .route(routes::GET_PROFILE, get(profile::profile_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_token,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not_found".into(),
            message: "404 Not found".into(),
        }),
    )
}
