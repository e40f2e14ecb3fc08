use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /api/auth`: log in, registering the username on first use.
pub async fn authenticate(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::AuthRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match services.auth.authenticate(&body.username, &body.password).await {
        Ok(token) => (
            StatusCode::OK,
            Json(dto::AuthResponse {
                token: token.into_string(),
            }),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
