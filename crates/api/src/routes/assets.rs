use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{allocations, assets};
use crate::state::AppState;

/// Asset routes mounted at `/assets`.
///
/// ```text
/// GET    /                              -> search_assets
/// POST   /                              -> create_asset
/// GET    /tag/{tag}                     -> get_asset_by_tag
/// GET    /{id}                          -> get_asset
/// PUT    /{id}                          -> update_asset
/// DELETE /{id}                          -> delete_asset
/// PUT    /{id}/status                   -> set_asset_status
/// GET    /{id}/warranty-history         -> warranty_history
/// POST   /{id}/allocate                 -> allocate
/// POST   /{id}/return                   -> return_asset
/// POST   /{id}/return-request           -> request_return
/// POST   /{id}/return-acknowledgement   -> acknowledge_return
/// GET    /{id}/allocation               -> current_allocation
/// GET    /{id}/allocations              -> allocation_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::search_assets).post(assets::create_asset))
        .route("/tag/{tag}", get(assets::get_asset_by_tag))
        .route(
            "/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/{id}/status", put(assets::set_asset_status))
        .route("/{id}/warranty-history", get(assets::warranty_history))
        .route("/{id}/allocate", post(allocations::allocate))
        .route("/{id}/return", post(allocations::return_asset))
        .route("/{id}/return-request", post(allocations::request_return))
        .route(
            "/{id}/return-acknowledgement",
            post(allocations::acknowledge_return),
        )
        .route("/{id}/allocation", get(allocations::current_allocation))
        .route("/{id}/allocations", get(allocations::allocation_history))
}
