/*
 * Responsibility
 * - /users 系 handler (作成は /auth/register のみ)
 * - Path は UserId extractor で UUID に変換して受け取る
 * - /users/me は Gate が載せた AuthCtx を参照する
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    api::{
        dto::users::{UpdateUserRequest, UserResponse},
        extractors::{AuthCtxExtractor, resource_id::UserId},
    },
    error::AppError,
    services::auth::auth_service::normalize_email,
    state::AppState,
};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .get(user_id.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(user.into()))
}

pub async fn me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<UserResponse>, AppError> {
    // The token may outlive the account.
    let user = state
        .users
        .get(ctx.user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    user_id: UserId,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(req) = body?;
    req.validate().map_err(AppError::validation)?;

    let name = req.name.as_deref().map(str::trim);
    let email = req.email.as_deref().map(normalize_email);

    let user = state
        .users
        .update(user_id.id, name, email.as_deref())
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<StatusCode, AppError> {
    if state.users.delete(user_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("User"))
    }
}
