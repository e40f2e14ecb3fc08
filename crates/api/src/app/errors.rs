use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use coinshop_auth::AuthError;
use coinshop_ledger::LedgerError;

const INTERNAL_MESSAGE: &str = "internal server error";

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::InvalidInput(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_request", msg)
        }
        // Token was valid but the account is gone (e.g. in-memory store restarted).
        LedgerError::AccountNotFound(_) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "account no longer exists")
        }
        LedgerError::RecipientNotFound(name) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("user '{name}' not found"))
        }
        LedgerError::UnknownItem(item) => {
            json_error(StatusCode::BAD_REQUEST, "unknown_item", format!("unknown item '{item}'"))
        }
        e @ LedgerError::InsufficientFunds { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_funds", e.to_string())
        }
        LedgerError::Inconsistent(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ledger_inconsistency",
            "transfer could not be completed",
        ),
        LedgerError::Storage(msg) => {
            error!(error = %msg, "ledger storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", INTERNAL_MESSAGE)
        }
    }
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidInput(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_request", msg)
        }
        AuthError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid username or password")
        }
        AuthError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
        AuthError::Internal(msg) => {
            error!(error = %msg, "authentication backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", INTERNAL_MESSAGE)
        }
    }
}

pub fn rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text())
}

/// Error body. `errors` carries the message in the shape older clients read.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    let message = message.into();
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message,
            "errors": message,
        })),
    )
        .into_response()
}
