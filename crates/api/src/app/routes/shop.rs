use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AccountContext;

pub async fn buy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Path(item): Path<String>,
) -> axum::response::Response {
    match services.ledger.purchase(account.account_id(), &item).await {
        Ok(_) => (StatusCode::OK, Json(dto::StatusResponse::OK)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
