use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// User routes mounted at `/users`.
///
/// ```text
/// POST   /                      -> create_user
/// GET    /{id}                  -> get_user
/// PUT    /{id}/status           -> set_user_status
/// GET    /{id}/allocations      -> user_allocations
/// GET    /{id}/notifications    -> user_notifications
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user))
        .route("/{id}", get(users::get_user))
        .route("/{id}/status", put(users::set_user_status))
        .route("/{id}/allocations", get(users::user_allocations))
        .route("/{id}/notifications", get(users::user_notifications))
}
