use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use coinshop_infra::SessionVerifier;

use crate::app::errors::json_error;
use crate::context::AccountContext;

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionVerifier>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).map_err(unauthorized)?;

    let claims = state
        .sessions
        .verify(token)
        .map_err(|_e| unauthorized(StatusCode::UNAUTHORIZED))?;

    req.extensions_mut().insert(AccountContext::new(claims.sub));

    Ok(next.run(req).await)
}

fn unauthorized(status: StatusCode) -> Response {
    json_error(status, "unauthorized", "missing or invalid session token")
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
