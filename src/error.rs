/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / 固定形の JSON error body `{ "error": ... }`)
 * - RepoError / extractor rejection を統一的に変換
 * - 内部の詳細 (DB エラー文言など) はログにのみ出し、レスポンスには含めない
 */
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    // Shared by the unknown-email and wrong-password branches of login.
    #[error("Invalid email or password")]
    InvalidCredentials,

    // Every Gate rejection collapses to this one value.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Internal server error")]
    Dependency,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Dependency => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::Conflict("Email already in use"),
            RepoError::Timeout => {
                tracing::error!("store call timed out");
                AppError::Dependency
            }
            RepoError::Db(e) => {
                tracing::error!(error = %e, "store call failed");
                AppError::Dependency
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        tracing::debug!(error = %e, "rejected request body");
        AppError::validation("Invalid request body")
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        tracing::debug!(error = %e, "rejected query string");
        AppError::validation("Invalid query parameters")
    }
}

// PathRejection carries no resource name; handlers that know it map it themselves.
impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        tracing::debug!(error = %e, "rejected path parameter");
        AppError::validation("Invalid ID")
    }
}
