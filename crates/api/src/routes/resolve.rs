use axum::routing::get;
use axum::Router;

use crate::handlers::resolve;
use crate::state::{AppState, AppStore};

/// URL resolution mounted at `/resolve`.
///
/// ```text
/// GET    /?url=&mode=&clean=        -> resolve
/// ```
pub fn router<S: AppStore>() -> Router<AppState<S>> {
    Router::new().route("/", get(resolve::resolve::<S>))
}
