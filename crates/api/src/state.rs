use std::sync::Arc;

use folio_core::differ::TrackedFieldDiffer;
use folio_core::page_type::PageTypeRegistry;
use folio_core::save::SaveController;
use folio_core::store::PageStore;
use folio_db::PgPageStore;

use crate::config::ServerConfig;

/// A [`PageStore`] the HTTP layer can share across handlers.
pub trait AppStore: PageStore + Clone + 'static {}

impl<S: PageStore + Clone + 'static> AppStore for S {}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Production uses [`PgPageStore`]; tests plug in the in-memory store.
#[derive(Clone)]
pub struct AppState<S = PgPageStore> {
    /// Page persistence.
    pub store: S,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Not-found and virtual page types, built from configuration.
    pub registry: Arc<PageTypeRegistry>,
    /// Draft-aware save routing with the default after-save chain.
    pub saver: Arc<SaveController>,
    /// Flat-field differ used by the diff endpoint.
    pub differ: Arc<TrackedFieldDiffer>,
}

impl<S: AppStore> AppState<S> {
    pub fn new(store: S, config: ServerConfig) -> Self {
        let registry =
            PageTypeRegistry::from_names(&config.not_found_page_types, &config.virtual_page_types);
        Self {
            store,
            config: Arc::new(config),
            registry: Arc::new(registry),
            saver: Arc::new(SaveController::default()),
            differ: Arc::new(TrackedFieldDiffer::default()),
        }
    }
}
