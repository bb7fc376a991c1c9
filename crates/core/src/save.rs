//! Draft-aware save routing and the ordered after-save chain.
//!
//! A page whose status ranks below Published is saved as a draft: only the
//! live record's lock column moves and its parts stay as last published,
//! while the pending state is captured as a new version. At Published or
//! above the live record and its parts are written as well. Either way the
//! chain runs in the same order: capture the version, correct its slug and
//! status, then every registered [`AfterSaveHook`].

use chrono::Utc;

use crate::error::CoreError;
use crate::page::Page;
use crate::store::{PageStore, PageTransaction};
use crate::version::{PageSnapshot, PageVersion, VersionFieldUpdate};

// ---------------------------------------------------------------------------
// After-save hooks
// ---------------------------------------------------------------------------

/// Request-scoped metadata available to after-save hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveContext {
    pub edited_by: Option<String>,
    pub edit_summary: Option<String>,
}

/// An action run after the version of a save has been captured.
///
/// Hooks are synchronous and only describe what to change; the controller
/// applies the returned update inside the save's transaction.
pub trait AfterSaveHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn after_save(
        &self,
        ctx: &SaveContext,
        page: &Page,
        version: &PageVersion,
    ) -> Option<VersionFieldUpdate>;
}

/// Copies the page's slug and status onto the freshly captured version.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncVersionIdentity;

impl AfterSaveHook for SyncVersionIdentity {
    fn name(&self) -> &'static str {
        "sync_version_identity"
    }

    fn after_save(
        &self,
        _ctx: &SaveContext,
        page: &Page,
        version: &PageVersion,
    ) -> Option<VersionFieldUpdate> {
        if version.slug == page.slug && version.status == page.status {
            return None;
        }
        Some(VersionFieldUpdate::identity_of(page))
    }
}

/// Stamps editor and summary from the [`SaveContext`], when given.
#[derive(Debug, Clone, Copy, Default)]
pub struct StampEditMetadata;

impl AfterSaveHook for StampEditMetadata {
    fn name(&self) -> &'static str {
        "stamp_edit_metadata"
    }

    fn after_save(
        &self,
        ctx: &SaveContext,
        _page: &Page,
        _version: &PageVersion,
    ) -> Option<VersionFieldUpdate> {
        let update = VersionFieldUpdate {
            edited_by: ctx.edited_by.clone(),
            edit_summary: ctx.edit_summary.clone(),
            ..VersionFieldUpdate::default()
        };
        (!update.is_empty()).then_some(update)
    }
}

/// Hooks run after version capture, in declared order.
///
/// The identity correction is always the first entry.
pub struct AfterSaveChain {
    hooks: Vec<Box<dyn AfterSaveHook>>,
}

impl AfterSaveChain {
    /// A chain holding only the identity correction.
    pub fn new() -> Self {
        Self {
            hooks: vec![Box::new(SyncVersionIdentity)],
        }
    }

    /// Append a hook after the ones already registered.
    pub fn with(mut self, hook: impl AfterSaveHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }
}

impl Default for AfterSaveChain {
    /// Identity correction followed by edit-metadata stamping.
    fn default() -> Self {
        Self::new().with(StampEditMetadata)
    }
}

impl std::fmt::Debug for AfterSaveChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ---------------------------------------------------------------------------
// Save controller
// ---------------------------------------------------------------------------

/// What a save wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The live record and its parts were written.
    pub live_write: bool,
    /// The captured version, after every hook update. `None` for pages that
    /// are not versioned.
    pub version: Option<PageVersion>,
}

#[derive(Debug, Default)]
pub struct SaveController {
    chain: AfterSaveChain,
}

impl SaveController {
    pub fn new(chain: AfterSaveChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &AfterSaveChain {
        &self.chain
    }

    /// Save an existing page.
    ///
    /// `page` holds the caller's pending state and the lock value it was
    /// loaded with. It is not reverted after a draft save; only its
    /// `lock_version` (and, for live writes, `updated_at`/`published_at`)
    /// follow the store.
    pub async fn save<S: PageStore>(
        &self,
        store: &S,
        page: &mut Page,
        ctx: &SaveContext,
    ) -> Result<SaveOutcome, CoreError> {
        page.validate()?;
        let mut tx = store.begin().await?;

        // Unversioned pages have nowhere else to keep a draft.
        let live_write = !page.status.is_draft() || !page.versioned;
        if live_write {
            let now = Utc::now();
            page.updated_at = now;
            if !page.status.is_draft() {
                page.published_at.get_or_insert(now);
            }
            page.lock_version = tx.update_live(page).await?;
            tx.replace_parts(page.id, &page.parts).await?;
        } else {
            page.lock_version = tx.touch_lock(page.id, page.lock_version).await?;
        }

        let version = self.run_chain(&mut tx, page, ctx).await?;
        tx.commit().await?;

        tracing::info!(
            page_id = page.id,
            status = %page.status,
            live_write,
            version = version.as_ref().map(|v| v.number),
            lock_version = page.lock_version,
            "Page saved"
        );
        Ok(SaveOutcome {
            live_write,
            version,
        })
    }

    /// Insert a new page and capture its first version.
    ///
    /// Flat fields are written to the new live record regardless of status.
    /// A versioned draft keeps its parts out of the live record: they exist
    /// only in version 1 until the page is first published. `page` becomes the
    /// stored record carrying the pending parts.
    pub async fn create<S: PageStore>(
        &self,
        store: &S,
        page: &mut Page,
        ctx: &SaveContext,
    ) -> Result<SaveOutcome, CoreError> {
        page.validate()?;
        if let Some(parent_id) = page.parent_id {
            if store.find_page(parent_id).await?.is_none() {
                return Err(CoreError::NotFound {
                    entity: "page",
                    id: parent_id,
                });
            }
        }

        let now = Utc::now();
        page.created_at = now;
        page.updated_at = now;
        page.published_at = (!page.status.is_draft()).then_some(now);

        let mut live = page.clone();
        if page.status.is_draft() && page.versioned {
            live.parts.clear();
        }

        let mut tx = store.begin().await?;
        let stored = tx.insert_page(&live).await?;
        *page = Page {
            parts: std::mem::take(&mut page.parts),
            ..stored
        };
        let version = self.run_chain(&mut tx, page, ctx).await?;
        tx.commit().await?;

        tracing::info!(
            page_id = page.id,
            parent_id = page.parent_id,
            status = %page.status,
            "Page created"
        );
        Ok(SaveOutcome {
            live_write: true,
            version,
        })
    }

    /// Capture the pending state, then run every hook against that version.
    async fn run_chain<T: PageTransaction>(
        &self,
        tx: &mut T,
        page: &Page,
        ctx: &SaveContext,
    ) -> Result<Option<PageVersion>, CoreError> {
        if !page.versioned {
            return Ok(None);
        }

        let mut version = tx
            .create_version(page.id, &PageSnapshot::capture(page))
            .await?;
        tracing::debug!(page_id = page.id, version = version.number, "Page version captured");

        for hook in &self.chain.hooks {
            let Some(update) = hook.after_save(ctx, page, &version) else {
                continue;
            };
            if update.is_empty() {
                continue;
            }
            version = tx.update_version_fields(version.id, &update).await?;
            tracing::debug!(
                page_id = page.id,
                version = version.number,
                hook = hook.name(),
                "After-save hook applied"
            );
        }
        Ok(Some(version))
    }
}
