use axum::routing::post;
use axum::Router;

use crate::handlers::allocations;
use crate::state::AppState;

/// Group allocation routes mounted at `/groups`.
///
/// ```text
/// POST   /allocate    -> allocate_from_group
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/allocate", post(allocations::allocate_from_group))
}
