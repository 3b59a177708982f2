//! Request extractors.

use axum::Json;
use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json<T>` whose rejections (missing content type, malformed JSON,
/// missing fields) render as a 400 [`AppError::Validation`] body.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);
