use crate::infrastructure::state::AppState;
use crate::presentation::handlers::auth;
use axum::{Router, routing::post};

/// Auth routes - registration, login and token refresh
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh_token))
}
