//! Route definitions for the page resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pages;
use crate::state::{AppState, AppStore};

/// Page routes mounted at `/pages`.
///
/// ```text
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id (live record)
/// PUT    /{id}                      -> update (draft-aware save)
/// GET    /{id}/current              -> get_current
/// GET    /{id}/current-live         -> get_current_live
/// GET    /{id}/children             -> list_children
/// GET    /{id}/layout               -> get_layout
/// GET    /{id}/versions             -> list_versions
/// GET    /{id}/versions/{number}    -> get_version
/// GET    /{id}/diff                 -> diff
/// ```
pub fn router<S: AppStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", post(pages::create::<S>))
        .route("/{id}", get(pages::get_by_id::<S>).put(pages::update::<S>))
        .route("/{id}/current", get(pages::get_current::<S>))
        .route("/{id}/current-live", get(pages::get_current_live::<S>))
        .route("/{id}/children", get(pages::list_children::<S>))
        .route("/{id}/layout", get(pages::get_layout::<S>))
        .route("/{id}/versions", get(pages::list_versions::<S>))
        .route("/{id}/versions/{number}", get(pages::get_version::<S>))
        .route("/{id}/diff", get(pages::diff::<S>))
}
