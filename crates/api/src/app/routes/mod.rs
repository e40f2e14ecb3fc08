use axum::{
    Router,
    routing::{get, post},
};

pub mod account;
pub mod auth;
pub mod coins;
pub mod shop;
pub mod system;

/// Endpoints reachable without a session token.
pub fn public_router() -> Router {
    Router::new().route("/api/auth", post(auth::authenticate))
}

/// Endpoints that require a bearer token (wrapped by the auth middleware).
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/info", get(account::info))
        .route("/api/sendCoin", post(coins::send_coin))
        .route("/api/buy/:item", get(shop::buy))
}
