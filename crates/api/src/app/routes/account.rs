use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AccountContext;

pub async fn info(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
) -> axum::response::Response {
    match services.ledger.info(account.account_id()).await {
        Ok(info) => (StatusCode::OK, Json(dto::InfoResponse::from(info))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
