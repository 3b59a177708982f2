//! Federated (Google) sign-in handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::AppState;
use crate::error::AppError;
use crate::models::GoogleCredentialRequest;
use crate::services::cookies::session_cookie;
use crate::services::federated;

/// `POST /auth/google`: exchange a provider credential for a session cookie.
///
/// Always answers with a redirect: to the app on success, to the failure
/// page otherwise.
pub async fn google_login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<GoogleCredentialRequest>, JsonRejection>,
) -> Response {
    let credential = match body {
        Ok(Json(body)) => body.credential,
        Err(e) => {
            warn!("federated login body rejected: {e}");
            None
        }
    };

    match federated::federated_login(&state, credential.as_deref()).await {
        Ok(login) => {
            let cookie = session_cookie(
                &login.session_id,
                state.sessions.max_age(),
                state.config.secure_cookies,
            );
            (
                jar.add(cookie),
                Redirect::to(&state.config.success_redirect()),
            )
                .into_response()
        }
        Err(e) => {
            warn!("federated login failed: {e}");
            Redirect::to(&state.config.failure_redirect()).into_response()
        }
    }
}

/// `GET /auth/google`: the flow is POST-only.
pub async fn google_direct_access_handler() -> AppError {
    AppError::Forbidden("no direct access!".into())
}
