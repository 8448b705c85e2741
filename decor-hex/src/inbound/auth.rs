//! Bearer-token guards.
//!
//! `require_identity` verifies the token with the configured identity
//! provider and stores the [`VerifiedIdentity`] in the request extensions.
//! `require_admin` must run after it and checks the caller's stored role.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use decor_types::{DecorRepository, IdentityError, VerifiedIdentity};

use super::handlers::{ApiError, AppState};

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn extract_bearer(auth_header: Option<&str>) -> Option<&str> {
    let token = auth_header?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Rejects requests without a valid identity token.
pub async fn require_identity<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(token) = extract_bearer(auth_header) else {
        return unauthorized_response();
    };

    match state.verifier.verify(token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(IdentityError::KeySet(e)) => {
            ApiError(IdentityError::KeySet(e).into()).into_response()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected identity token");
            unauthorized_response()
        }
    }
}

/// Rejects callers whose stored role is not `admin`.
pub async fn require_admin<R: DecorRepository>(
    State(state): State<Arc<AppState<R>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(email) = request
        .extensions()
        .get::<VerifiedIdentity>()
        .map(|identity| identity.email.clone())
    else {
        return unauthorized_response();
    };

    match state.service.is_admin(&email).await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            tracing::warn!(%email, "Admin route denied");
            forbidden_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "unauthorized access",
            "code": 401
        })),
    )
        .into_response()
}

fn forbidden_response() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({
            "error": "forbidden access",
            "code": 403
        })),
    )
        .into_response()
}
