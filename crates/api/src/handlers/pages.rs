//! Handlers for the `/pages` resource.
//!
//! Writes go through the draft-aware [`SaveController`](folio_core::save::SaveController);
//! reads either return the live record or one of its projections.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::current::{current, current_children, current_live, layout_for, project, ViewMode};
use folio_core::differ::{diff_pages, PageDiff};
use folio_core::error::CoreError;
use folio_core::page::{Page, PagePart};
use folio_core::save::{SaveContext, SaveOutcome};
use folio_core::status::Status;
use folio_core::store::PageStore;
use folio_core::tree::PageTree;
use folio_core::types::DbId;
use folio_core::version::PageVersion;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::{AppState, AppStore};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartInput {
    pub name: String,
    pub filter_id: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl From<PartInput> for PagePart {
    fn from(input: PartInput) -> Self {
        Self {
            name: input.name,
            filter_id: input.filter_id,
            content: input.content,
        }
    }
}

/// Request body for `POST /pages`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePageRequest {
    pub parent_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub breadcrumb: Option<String>,
    pub class_name: Option<String>,
    pub status: Option<Status>,
    pub layout_id: Option<DbId>,
    pub virtual_page: Option<bool>,
    pub versioned: Option<bool>,
    #[serde(default)]
    pub parts: Vec<PartInput>,
    pub edited_by: Option<String>,
    pub edit_summary: Option<String>,
}

/// Request body for `PUT /pages/{id}`. Absent fields keep their current value.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePageRequest {
    /// The lock value the client loaded the page with.
    pub lock_version: i32,
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub breadcrumb: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub class_name: Option<Option<String>>,
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "nullable")]
    pub layout_id: Option<Option<DbId>>,
    pub virtual_page: Option<bool>,
    /// Replaces the whole part collection when present.
    pub parts: Option<Vec<PartInput>>,
    pub edited_by: Option<String>,
    pub edit_summary: Option<String>,
}

impl UpdatePageRequest {
    fn apply(self, page: &mut Page) -> SaveContext {
        page.lock_version = self.lock_version;
        if let Some(title) = self.title {
            page.title = title;
        }
        if let Some(slug) = self.slug {
            page.slug = slug;
        }
        if let Some(breadcrumb) = self.breadcrumb {
            page.breadcrumb = breadcrumb;
        }
        if let Some(class_name) = self.class_name {
            page.class_name = class_name;
        }
        if let Some(status) = self.status {
            page.status = status;
        }
        if let Some(layout_id) = self.layout_id {
            page.layout_id = layout_id;
        }
        if let Some(virtual_page) = self.virtual_page {
            page.virtual_page = virtual_page;
        }
        if let Some(parts) = self.parts {
            page.parts = parts.into_iter().map(PagePart::from).collect();
        }
        SaveContext {
            edited_by: self.edited_by,
            edit_summary: self.edit_summary,
        }
    }
}

/// Result of a create or update.
#[derive(Debug, Serialize)]
pub struct SavedPage {
    /// The page as the caller saved it (pending state for a draft save).
    pub page: Page,
    pub version: Option<PageVersion>,
    pub live_write: bool,
}

impl SavedPage {
    fn new(page: Page, outcome: SaveOutcome) -> Self {
        Self {
            page,
            version: outcome.version,
            live_write: outcome.live_write,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ModeParams {
    #[serde(default)]
    pub mode: ViewMode,
}

#[derive(Debug, Deserialize)]
pub struct VersionListParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DiffParams {
    pub v1: i32,
    pub v2: Option<i32>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn page_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "page", id })
}

async fn find_live<S: PageStore>(store: &S, id: DbId) -> AppResult<Page> {
    store.find_page(id).await?.ok_or_else(|| page_not_found(id))
}

async fn find_version<S: PageStore>(store: &S, id: DbId, number: i32) -> AppResult<PageVersion> {
    store
        .find_version(id, number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Version {number} of page {id} not found")))
}

async fn load_tree_with<S: PageStore>(store: &S, id: DbId) -> AppResult<PageTree> {
    let tree = store.load_tree().await?;
    if tree.page(id).is_none() {
        return Err(page_not_found(id));
    }
    Ok(tree)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/pages
///
/// Inserts the page with all of its fields and records version 1.
pub async fn create<S: AppStore>(
    State(state): State<AppState<S>>,
    Json(input): Json<CreatePageRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SavedPage>>)> {
    let mut page = Page::new(input.parent_id, input.title, input.slug);
    page.breadcrumb = input.breadcrumb;
    page.class_name = input.class_name;
    page.status = input.status.unwrap_or_default();
    page.layout_id = input.layout_id;
    page.virtual_page = input.virtual_page.unwrap_or(false);
    page.versioned = input.versioned.unwrap_or(true);
    page.parts = input.parts.into_iter().map(PagePart::from).collect();
    let ctx = SaveContext {
        edited_by: input.edited_by,
        edit_summary: input.edit_summary,
    };

    let outcome = state.saver.create(&state.store, &mut page, &ctx).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(SavedPage::new(page, outcome))),
    ))
}

/// GET /api/v1/pages/{id}
///
/// The live record, exactly as published traffic sees it.
pub async fn get_by_id<S: AppStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Page>>> {
    let page = find_live(&state.store, id).await?;
    Ok(Json(DataResponse::new(page)))
}

/// PUT /api/v1/pages/{id}
///
/// Applies the request on top of the page's newest version and saves it.
/// Below Published only a new version is recorded; the live record keeps
/// its content and only its lock value moves.
pub async fn update<S: AppStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePageRequest>,
) -> AppResult<Json<DataResponse<SavedPage>>> {
    let live = find_live(&state.store, id).await?;
    let latest = if live.versioned {
        state.store.list_versions(id, Some(1)).await?.into_iter().next()
    } else {
        None
    };
    let mut page = match latest {
        Some(version) => version.instance(&live),
        None => live,
    };

    let ctx = input.apply(&mut page);
    let outcome = state.saver.save(&state.store, &mut page, &ctx).await?;
    Ok(Json(DataResponse::new(SavedPage::new(page, outcome))))
}

/// GET /api/v1/pages/{id}/current
pub async fn get_current<S: AppStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Page>>> {
    let tree = load_tree_with(&state.store, id).await?;
    let page = tree.page(id).ok_or_else(|| page_not_found(id))?;
    Ok(Json(DataResponse::new(current(page, &tree).into_owned())))
}

/// GET /api/v1/pages/{id}/current-live
pub async fn get_current_live<S: AppStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Page>>> {
    let tree = load_tree_with(&state.store, id).await?;
    let page = tree.page(id).ok_or_else(|| page_not_found(id))?;
    Ok(Json(DataResponse::new(current_live(page, &tree).into_owned())))
}

/// GET /api/v1/pages/{id}/children
///
/// Direct children in stored order, each at its newest version.
pub async fn list_children<S: AppStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Page>>>> {
    let tree = load_tree_with(&state.store, id).await?;
    let children = current_children(id, &tree)
        .into_iter()
        .map(|c| c.into_owned())
        .collect();
    Ok(Json(DataResponse::new(children)))
}

/// GET /api/v1/pages/{id}/layout?mode=live|dev
///
/// The layout a renderer should use for the page under the given view.
pub async fn get_layout<S: AppStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<DbId>,
    Query(params): Query<ModeParams>,
) -> AppResult<Json<DataResponse<Page>>> {
    let tree = load_tree_with(&state.store, id).await?;
    let page = tree.page(id).ok_or_else(|| page_not_found(id))?;
    let page = project(page, &tree, params.mode);
    let layout = layout_for(&page, &tree, params.mode)
        .ok_or_else(|| AppError::NotFound(format!("Page {id} has no layout")))?;
    Ok(Json(DataResponse::new(layout.into_owned())))
}

/// GET /api/v1/pages/{id}/versions?limit=N
///
/// Version history, newest first.
pub async fn list_versions<S: AppStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<DbId>,
    Query(params): Query<VersionListParams>,
) -> AppResult<Json<DataResponse<Vec<PageVersion>>>> {
    if params.limit.is_some_and(|l| l <= 0) {
        return Err(AppError::BadRequest("limit must be a positive number".into()));
    }
    find_live(&state.store, id).await?;
    let versions = state.store.list_versions(id, params.limit).await?;
    Ok(Json(DataResponse::new(versions)))
}

/// GET /api/v1/pages/{id}/versions/{number}
pub async fn get_version<S: AppStore>(
    State(state): State<AppState<S>>,
    Path((id, number)): Path<(DbId, i32)>,
) -> AppResult<Json<DataResponse<PageVersion>>> {
    let version = find_version(&state.store, id, number).await?;
    Ok(Json(DataResponse::new(version)))
}

/// GET /api/v1/pages/{id}/diff?v1=&v2=
///
/// Structural diff between two versions. Without `v2` the parts of `v1` are
/// listed as a baseline.
pub async fn diff<S: AppStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<DbId>,
    Query(params): Query<DiffParams>,
) -> AppResult<Json<DataResponse<PageDiff>>> {
    let live = find_live(&state.store, id).await?;
    let old = find_version(&state.store, id, params.v1).await?.instance(&live);
    let new = match params.v2 {
        Some(number) => Some(find_version(&state.store, id, number).await?.instance(&live)),
        None => None,
    };
    let diff = diff_pages(&old, new.as_ref(), state.differ.as_ref());
    Ok(Json(DataResponse::new(diff)))
}
