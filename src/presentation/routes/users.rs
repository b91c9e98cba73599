use crate::infrastructure::state::AppState;
use crate::presentation::handlers::{applications, bookmarks, users};
use crate::presentation::middleware::auth::require_auth;
use axum::{
    Router, middleware,
    routing::{delete, post, put},
};

/// Routes acting on the authenticated user - all of them need a bearer token
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", put(users::update_profile))
        .route(
            "/applications",
            post(applications::apply).get(applications::list_applications),
        )
        .route("/applications/{id}", delete(applications::cancel_application))
        .route(
            "/bookmarks",
            post(bookmarks::toggle_bookmark).get(bookmarks::list_bookmarks),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
