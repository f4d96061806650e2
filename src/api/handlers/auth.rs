/*
 * Responsibility
 * - POST /auth/register, POST /auth/login
 * - Json を受け、DTO validation → AuthService 呼び出し → { token, user }
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

use crate::{
    api::dto::auth::{AuthResponse, LoginRequest, RegisterRequest},
    error::AppError,
    services::auth::auth_service::Session,
    state::AppState,
};

fn to_response(session: Session) -> AuthResponse {
    AuthResponse {
        token: session.token,
        user: session.principal.into(),
    }
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(req) = body?;
    req.validate().map_err(AppError::validation)?;

    let session = state
        .auth
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(session))))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(req) = body?;

    let session = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(to_response(session)))
}
