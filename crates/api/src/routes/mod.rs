pub mod health;
pub mod pages;
pub mod resolve;

use axum::Router;

use crate::state::{AppState, AppStore};

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /pages                                  create
/// /pages/{id}                             live record, save
/// /pages/{id}/current                     newest version projection
/// /pages/{id}/current-live                newest published projection
/// /pages/{id}/children                    children at their newest version
/// /pages/{id}/layout                      effective layout (?mode=)
/// /pages/{id}/versions                    history, newest first (?limit=)
/// /pages/{id}/versions/{number}           one version
/// /pages/{id}/diff                        structural diff (?v1=&v2=)
///
/// /resolve                                URL to page (?url=&mode=&clean=)
/// ```
pub fn api_routes<S: AppStore>() -> Router<AppState<S>> {
    Router::new()
        .nest("/pages", pages::router())
        .nest("/resolve", resolve::router())
}
