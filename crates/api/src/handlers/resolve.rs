//! URL resolution endpoint.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::current::ViewMode;
use folio_core::resolver::{MatchKind, ResolvedPage, UrlResolver};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::{AppState, AppStore};

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub url: String,
    #[serde(default)]
    pub mode: ViewMode,
    /// Overrides the configured URL cleaning for this request.
    pub clean: Option<bool>,
}

/// GET /api/v1/resolve?url=&mode=live|dev
///
/// An exact match answers 200. A tree-local not-found page answers 404 but
/// still carries the page so a renderer can show it.
pub async fn resolve<S: AppStore>(
    State(state): State<AppState<S>>,
    Query(params): Query<ResolveParams>,
) -> AppResult<(StatusCode, Json<DataResponse<ResolvedPage>>)> {
    let clean = params.clean.unwrap_or(state.config.clean_urls);
    let tree = state.store.load_tree().await?;

    let resolved = UrlResolver::new(&tree, &state.registry)
        .resolve(&params.url, params.mode, clean)
        .ok_or_else(|| AppError::NotFound(format!("No page found at {}", params.url)))?;

    let status = match resolved.kind {
        MatchKind::Exact => StatusCode::OK,
        MatchKind::NotFoundFallback => StatusCode::NOT_FOUND,
    };
    Ok((status, Json(DataResponse::new(resolved))))
}
