//! Access gate: token extraction and verification for protected routes.
//!
//! A token is taken from the `x-access-token` header, or failing that from
//! the federated-login session cookie. Requests without a verifiable token
//! never reach the handler.

use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use tally_core::auth::AuthError;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::SESSION_COOKIE;

/// Header API clients put the raw access token in.
pub const ACCESS_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-access-token");

/// Identity of the caller, inserted into request extensions by [`require_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Find a candidate token: header first, then the session cookie.
fn extract_token(state: &AppState, request: &Request, jar: &CookieJar) -> Option<String> {
    if let Some(token) = request
        .headers()
        .get(&ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }
    let cookie = jar.get(SESSION_COOKIE)?;
    state
        .sessions
        .get(cookie.value())
        .map(|session| session.access_token)
}

/// Axum middleware: verifies the caller's token and injects
/// [`AuthenticatedUser`] into request extensions.
pub async fn require_token(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&state, &request, &jar).ok_or_else(|| {
        debug!(path = %request.uri().path(), "no token on protected route");
        AppError::from(AuthError::NoToken)
    })?;

    let user_id = state.tokens.verify(&token).map_err(|e| {
        debug!(path = %request.uri().path(), "token rejected: {e}");
        AppError::from(e)
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
