use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AccountContext;

pub async fn send_coin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    payload: Result<Json<dto::SendCoinRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    if body.amount <= 0 {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "amount must be a positive integer",
        );
    }
    if body.to_user.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", "toUser is required");
    }

    match services
        .ledger
        .transfer(account.account_id(), &body.to_user, body.amount)
        .await
    {
        Ok(_) => (StatusCode::OK, Json(dto::StatusResponse::OK)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
