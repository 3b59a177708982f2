//! Category request handlers.

use axum::extract::{Query, State};
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CategoryQuery, CategoryResponse, CreateCategoryRequest, MessageResponse};
use crate::services::ledger;

/// `GET /categories[?category_id=]`
pub async fn list_categories_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<Vec<CategoryResponse>>> {
    let categories =
        ledger::list_categories(state.ledger.as_ref(), &user.user_id, query.category_id).await?;
    Ok(Json(categories))
}

/// `POST /categories`
pub async fn create_category_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidJson(body): ValidJson<CreateCategoryRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = ledger::create_category(state.ledger.as_ref(), &user.user_id, body).await?;
    Ok(Json(resp))
}
