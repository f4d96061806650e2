//! Authorization Gate: Bearer token 検証 → AuthCtx を extensions に入れる
//!
//! - 保護対象の Router にだけ `apply` する (public 側には掛けない)
//! - 拒否理由はログにだけ残し、レスポンスは常に同じ 401 にする
//! - 検証に成功したリクエストだけが handler に到達する

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use thiserror::Error;
use uuid::Uuid;

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::jwt::{TokenService, VerificationError};
use crate::state::AppState;

/// Why the Gate turned a request away. Never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateRejection {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("unsupported authorization scheme")]
    UnsupportedScheme,
    #[error("token rejected: {0}")]
    Token(#[from] VerificationError),
    #[error("token subject is not a valid user id")]
    InvalidSubject,
}

/// Protect every route in `router`.
///
/// `route_layer` so that unmatched paths still fall through to 404 instead of 401.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

/// `Authorization: Bearer <token>` → verified identity.
///
/// The scheme is matched case-insensitively; the token must be non-empty.
pub fn authorize(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthCtx, GateRejection> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(GateRejection::MissingHeader)?
        .to_str()
        .map_err(|_| GateRejection::UnsupportedScheme)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(GateRejection::UnsupportedScheme)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(GateRejection::UnsupportedScheme);
    }

    let claims = tokens.verify(token)?;
    let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| GateRejection::InvalidSubject)?;

    Ok(AuthCtx::new(user_id, claims.email, claims.name))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_ctx = match authorize(req.headers(), state.auth.tokens()) {
        Ok(ctx) => ctx,
        Err(GateRejection::MissingHeader) => {
            tracing::debug!(path = %req.uri().path(), "no credentials on protected route");
            return Err(AppError::InvalidToken);
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %req.uri().path(), "access token rejected");
            return Err(AppError::InvalidToken);
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::{
        Json,
        body::to_bytes,
        http::{HeaderValue, StatusCode},
        routing::get,
    };
    use chrono::Utc;
    use tower::ServiceExt;

    use super::*;
    use crate::api::extractors::AuthCtxExtractor;
    use crate::repos::user_repo::Principal;
    use crate::services::auth::jwt::Claims;
    use crate::testing;

    fn principal() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_bearer_in_any_case() {
        let tokens = testing::token_service();
        let p = principal();
        let token = tokens.issue(&p).unwrap();

        for scheme in ["Bearer", "bearer", "BEARER"] {
            let ctx = authorize(&headers(&format!("{scheme} {token}")), &tokens).unwrap();
            assert_eq!(ctx.user_id, p.id);
            assert_eq!(ctx.email, "a@x.com");
            assert_eq!(ctx.name, "A");
        }
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        let tokens = testing::token_service();
        let token = tokens.issue(&principal()).unwrap();
        let other_scheme = format!("Token {token}");

        assert_eq!(
            authorize(&HeaderMap::new(), &tokens).unwrap_err(),
            GateRejection::MissingHeader
        );
        for value in [
            token.as_str(),
            "Bearer",
            "Bearer ",
            "Basic dXNlcjpwYXNz",
            other_scheme.as_str(),
        ] {
            assert_eq!(
                authorize(&headers(value), &tokens).unwrap_err(),
                GateRejection::UnsupportedScheme,
                "{value:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_tokens_with_reason() {
        let tokens = testing::token_service();
        let err = authorize(&headers("Bearer not-a-token"), &tokens).unwrap_err();
        assert_eq!(err, GateRejection::Token(VerificationError::Malformed));

        let expired = tokens
            .issue_at(&principal(), Utc::now().timestamp() - 8 * 24 * 60 * 60)
            .unwrap();
        let err = authorize(&headers(&format!("Bearer {expired}")), &tokens).unwrap_err();
        assert_eq!(err, GateRejection::Token(VerificationError::Expired));
    }

    #[test]
    fn rejects_subject_that_is_not_a_user_id() {
        let tokens = testing::token_service();
        let token = tokens
            .sign(&Claims {
                user_id: "not-a-uuid".into(),
                email: "a@x.com".into(),
                name: "A".into(),
                exp: Utc::now().timestamp() + 60,
            })
            .unwrap();

        let err = authorize(&headers(&format!("Bearer {token}")), &tokens).unwrap_err();
        assert_eq!(err, GateRejection::InvalidSubject);
    }

    async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<serde_json::Value> {
        Json(serde_json::json!({ "userId": ctx.user_id, "email": ctx.email }))
    }

    fn gated(state: AppState) -> Router {
        let protected = Router::new().route("/whoami", get(whoami));
        apply(protected, state.clone()).with_state(state)
    }

    #[tokio::test]
    async fn gate_admits_valid_token_and_exposes_identity() {
        let state = testing::test_state();
        let p = principal();
        let token = state.auth.tokens().issue(&p).unwrap();

        let response = gated(state)
            .oneshot(
                Request::get("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["userId"], p.id.to_string());
        assert_eq!(body["email"], "a@x.com");
    }

    #[tokio::test]
    async fn every_rejection_looks_the_same_to_the_client() {
        let state = testing::test_state();
        let foreign = testing::token_service_with("another-secret-entirely")
            .issue(&principal())
            .unwrap();

        let cases: Vec<Option<String>> = vec![
            None,
            Some("Basic abc".to_string()),
            Some("Bearer garbage".to_string()),
            Some(format!("Bearer {foreign}")),
        ];

        let mut bodies = Vec::new();
        for case in cases {
            let mut req = Request::get("/whoami");
            if let Some(value) = case {
                req = req.header(header::AUTHORIZATION, value);
            }
            let response = gated(state.clone())
                .oneshot(req.body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            bodies.push(to_bytes(response.into_body(), usize::MAX).await.unwrap());
        }

        assert!(bodies.windows(2).all(|w| w[0] == w[1]));
        let body: serde_json::Value = serde_json::from_slice(&bodies[0]).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Invalid or expired token"}));
    }
}
