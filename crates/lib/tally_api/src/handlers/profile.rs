//! Profile handler.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::ProfileResponse;
use crate::services::auth;

/// `GET /profile`: the authenticated user's own record.
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ProfileResponse>> {
    let resp = auth::profile(state.credentials.as_ref(), &user.user_id).await?;
    Ok(Json(resp))
}
