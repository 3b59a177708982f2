//! Account request handlers. Every operation is scoped to the caller.

use axum::extract::{Query, State};
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AccountQuery, AccountResponse, CreateAccountRequest, DeleteAccountRequest, MessageResponse,
    UpdateAccountRequest,
};
use crate::services::ledger;

/// `GET /accounts[?account_id=]`
pub async fn list_accounts_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<AccountQuery>,
) -> AppResult<Json<Vec<AccountResponse>>> {
    let accounts =
        ledger::list_accounts(state.ledger.as_ref(), &user.user_id, query.account_id).await?;
    Ok(Json(accounts))
}

/// `POST /accounts`
pub async fn create_account_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidJson(body): ValidJson<CreateAccountRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = ledger::create_account(
        state.ledger.as_ref(),
        &user.user_id,
        body,
        state.config.account_limit,
    )
    .await?;
    Ok(Json(resp))
}

/// `PUT /accounts`
pub async fn update_account_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidJson(body): ValidJson<UpdateAccountRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = ledger::update_account(state.ledger.as_ref(), &user.user_id, body).await?;
    Ok(Json(resp))
}

/// `DELETE /accounts`
pub async fn delete_account_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidJson(body): ValidJson<DeleteAccountRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp =
        ledger::delete_account(state.ledger.as_ref(), &user.user_id, body.account_id).await?;
    Ok(Json(resp))
}
