pub mod assets;
pub mod groups;
pub mod health;
pub mod users;
pub mod vendors;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /assets                                  search, register
/// /assets/tag/{tag}                        lookup by tag
/// /assets/{id}                             describe, update, delete
/// /assets/{id}/status                      administrative status override (PUT)
/// /assets/{id}/warranty-history            warranty audit trail
/// /assets/{id}/allocate                    allocate to a user (POST)
/// /assets/{id}/return                      return the active allocation (POST)
/// /assets/{id}/return-request              request a return (POST)
/// /assets/{id}/return-acknowledgement      holder acknowledges the request (POST)
/// /assets/{id}/allocation                  current allocation
/// /assets/{id}/allocations                 allocation history
///
/// /groups/allocate                         allocate any available member (POST)
///
/// /users                                   create
/// /users/{id}                              get
/// /users/{id}/status                       activate / deactivate (PUT)
/// /users/{id}/allocations                  allocations held by the user
/// /users/{id}/notifications                notifications addressed to the user
///
/// /vendors                                 list, create
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/assets", assets::router())
        .nest("/groups", groups::router())
        .nest("/users", users::router())
        .nest("/vendors", vendors::router())
}
