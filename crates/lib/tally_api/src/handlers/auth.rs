//! Local authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::models::{
    CheckTokenRequest, CheckTokenResponse, CheckUserRequest, CheckUserResponse,
    CredentialsRequest, SignInResponse, SignUpResponse,
};
use crate::services::auth;

/// `POST /signup`: register with email + password.
pub async fn signup_handler(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CredentialsRequest>,
) -> AppResult<Json<SignUpResponse>> {
    let resp = auth::sign_up(
        state.credentials.as_ref(),
        &state.tokens,
        &body.email,
        &body.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /signin`: authenticate with email + password.
pub async fn signin_handler(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CredentialsRequest>,
) -> AppResult<Json<SignInResponse>> {
    let resp = auth::sign_in(
        state.credentials.as_ref(),
        &state.tokens,
        &body.email,
        &body.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /checkuser`: is this email registered?
pub async fn check_user_handler(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CheckUserRequest>,
) -> AppResult<Json<CheckUserResponse>> {
    let resp = auth::check_user(state.credentials.as_ref(), &body.email).await?;
    Ok(Json(resp))
}

/// `POST /checktoken`: does this token still belong to this user?
///
/// Always answers 200; an unreadable body is just `matching: false`.
pub async fn check_token_handler(
    State(state): State<AppState>,
    body: Result<Json<CheckTokenRequest>, JsonRejection>,
) -> Json<CheckTokenResponse> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let matching = auth::check_token(
        state.credentials.as_ref(),
        &state.tokens,
        body.id.as_deref(),
        body.access_token.as_deref(),
    )
    .await;
    Json(CheckTokenResponse { matching })
}

/// `GET /auth/checksignedin`: 200 when the access gate let the caller through.
pub async fn check_signed_in_handler() -> StatusCode {
    StatusCode::OK
}
