//! In-memory [`PageStore`] for tests and embedding.
//!
//! State sits behind a `tokio::sync::Mutex`. A transaction holds the lock for
//! its whole lifetime and writes to a staged copy that replaces the shared
//! state on commit, so a dropped transaction leaves nothing behind.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::CoreError;
use crate::page::{Page, PagePart};
use crate::store::{PageStore, PageTransaction};
use crate::tree::PageTree;
use crate::types::DbId;
use crate::version::{PageSnapshot, PageVersion, VersionFieldUpdate};

#[derive(Debug, Clone, Default)]
struct State {
    pages: BTreeMap<DbId, Page>,
    versions: Vec<PageVersion>,
    last_page_id: DbId,
    last_version_id: DbId,
}

impl State {
    fn page_mut(&mut self, id: DbId) -> Result<&mut Page, CoreError> {
        self.pages
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "page", id })
    }

    /// Reject a slug already used by another child of the same parent, or a
    /// second root.
    fn ensure_slug_free(&self, page: &Page) -> Result<(), CoreError> {
        let clash = self.pages.values().find(|other| {
            other.id != page.id
                && other.parent_id == page.parent_id
                && (page.parent_id.is_none() || other.slug == page.slug)
        });
        match clash {
            Some(_) if page.parent_id.is_none() => {
                Err(CoreError::Conflict("A root page already exists".into()))
            }
            Some(other) => Err(CoreError::Conflict(format!(
                "Slug '{}' is already used by sibling page {}",
                page.slug, other.id
            ))),
            None => Ok(()),
        }
    }

    fn check_lock(page: &Page, expected: i32) -> Result<(), CoreError> {
        if page.lock_version != expected {
            return Err(CoreError::ConcurrencyConflict {
                page_id: page.id,
                expected,
            });
        }
        Ok(())
    }
}

/// A [`PageStore`] that keeps everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageStore for MemoryStore {
    type Tx<'a> = MemoryTransaction<'a>;

    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn find_page(&self, id: DbId) -> Result<Option<Page>, CoreError> {
        Ok(self.state.lock().await.pages.get(&id).cloned())
    }

    async fn load_tree(&self) -> Result<PageTree, CoreError> {
        let state = self.state.lock().await;
        Ok(PageTree::build(
            state.pages.values().cloned().collect(),
            state.versions.iter().cloned(),
        ))
    }

    async fn list_versions(
        &self,
        page_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<PageVersion>, CoreError> {
        let state = self.state.lock().await;
        let mut versions: Vec<_> = state
            .versions
            .iter()
            .filter(|v| v.page_id == page_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.number.cmp(&a.number));
        if let Some(limit) = limit {
            versions.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(versions)
    }

    async fn find_version(
        &self,
        page_id: DbId,
        number: i32,
    ) -> Result<Option<PageVersion>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .iter()
            .find(|v| v.page_id == page_id && v.number == number)
            .cloned())
    }

    async fn begin(&self) -> Result<MemoryTransaction<'_>, CoreError> {
        let guard = self.state.lock().await;
        let staged = guard.clone();
        Ok(MemoryTransaction { guard, staged })
    }
}

/// Exclusive write access to a [`MemoryStore`].
pub struct MemoryTransaction<'a> {
    guard: MutexGuard<'a, State>,
    staged: State,
}

impl PageTransaction for MemoryTransaction<'_> {
    async fn insert_page(&mut self, page: &Page) -> Result<Page, CoreError> {
        let state = &mut self.staged;
        state.ensure_slug_free(page)?;

        state.last_page_id += 1;
        let position = state
            .pages
            .values()
            .filter(|p| p.parent_id == page.parent_id)
            .map(|p| p.position + 1)
            .max()
            .unwrap_or(0);
        let stored = Page {
            id: state.last_page_id,
            position,
            lock_version: 0,
            ..page.clone()
        };
        state.pages.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn touch_lock(&mut self, page_id: DbId, expected: i32) -> Result<i32, CoreError> {
        let stored = self.staged.page_mut(page_id)?;
        State::check_lock(stored, expected)?;
        stored.lock_version += 1;
        Ok(stored.lock_version)
    }

    async fn update_live(&mut self, page: &Page) -> Result<i32, CoreError> {
        State::check_lock(self.staged.page_mut(page.id)?, page.lock_version)?;
        self.staged.ensure_slug_free(page)?;

        let stored = self.staged.page_mut(page.id)?;
        stored.title = page.title.clone();
        stored.slug = page.slug.clone();
        stored.breadcrumb = page.breadcrumb.clone();
        stored.class_name = page.class_name.clone();
        stored.status = page.status;
        stored.layout_id = page.layout_id;
        stored.virtual_page = page.virtual_page;
        stored.versioned = page.versioned;
        stored.published_at = page.published_at;
        stored.updated_at = page.updated_at;
        stored.lock_version += 1;
        Ok(stored.lock_version)
    }

    async fn replace_parts(&mut self, page_id: DbId, parts: &[PagePart]) -> Result<(), CoreError> {
        self.staged.page_mut(page_id)?.parts = parts.to_vec();
        Ok(())
    }

    async fn create_version(
        &mut self,
        page_id: DbId,
        snapshot: &PageSnapshot,
    ) -> Result<PageVersion, CoreError> {
        let state = &mut self.staged;
        state.page_mut(page_id)?;

        let number = state
            .versions
            .iter()
            .filter(|v| v.page_id == page_id)
            .map(|v| v.number)
            .max()
            .unwrap_or(0)
            + 1;
        state.last_version_id += 1;
        let version = PageVersion {
            id: state.last_version_id,
            page_id,
            number,
            slug: snapshot.slug.clone(),
            status: snapshot.status,
            snapshot: snapshot.clone(),
            edited_by: None,
            edit_summary: None,
            created_at: Utc::now(),
        };
        state.versions.push(version.clone());
        Ok(version)
    }

    async fn update_version_fields(
        &mut self,
        version_id: DbId,
        update: &VersionFieldUpdate,
    ) -> Result<PageVersion, CoreError> {
        let version = self
            .staged
            .versions
            .iter_mut()
            .find(|v| v.id == version_id)
            .ok_or(CoreError::NotFound {
                entity: "page_version",
                id: version_id,
            })?;
        update.apply(version);
        Ok(version.clone())
    }

    async fn commit(self) -> Result<(), CoreError> {
        let MemoryTransaction { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::current::{current, current_live, ViewMode};
    use crate::page_type::PageTypeRegistry;
    use crate::resolver::UrlResolver;
    use crate::save::{AfterSaveChain, AfterSaveHook, SaveContext, SaveController};
    use crate::status::Status;

    fn new_page(parent_id: Option<DbId>, slug: &str, body: &str, status: Status) -> Page {
        let title = if slug.is_empty() { "Home" } else { slug };
        let mut page = Page::new(parent_id, title, slug);
        page.status = status;
        page.set_part(PagePart::new("body", body));
        page
    }

    /// A store holding a published root and a published `/about/` page.
    async fn seeded() -> (MemoryStore, SaveController, Page) {
        let store = MemoryStore::new();
        let ctl = SaveController::default();
        let ctx = SaveContext::default();

        let mut root = new_page(None, "", "home", Status::Published);
        ctl.create(&store, &mut root, &ctx).await.unwrap();
        let mut about = new_page(Some(root.id), "about", "A", Status::Published);
        ctl.create(&store, &mut about, &ctx).await.unwrap();
        (store, ctl, about)
    }

    #[tokio::test]
    async fn create_records_first_version() {
        let (store, _, about) = seeded().await;
        let versions = store.list_versions(about.id, None).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].number, 1);
        assert_eq!(versions[0].slug, "about");
        assert!(about.published_at.is_some());
    }

    #[tokio::test]
    async fn draft_create_keeps_parts_out_of_live_record() {
        let (store, ctl, about) = seeded().await;
        let mut team = new_page(Some(about.id), "team", "T", Status::Draft);
        ctl.create(&store, &mut team, &SaveContext::default())
            .await
            .unwrap();
        assert_eq!(team.parts.len(), 1);

        let live = store.find_page(team.id).await.unwrap().unwrap();
        assert!(live.parts.is_empty());
        assert_eq!(live.slug, "team");
        assert_eq!(live.status, Status::Draft);

        let first = store.find_version(team.id, 1).await.unwrap().unwrap();
        assert_eq!(first.snapshot.parts[0].content, "T");

        let tree = store.load_tree().await.unwrap();
        let node = tree.page(team.id).unwrap();
        assert_eq!(current(node, &tree).parts[0].content, "T");
    }

    #[tokio::test]
    async fn draft_save_leaves_live_record_untouched() {
        let (store, ctl, mut about) = seeded().await;
        let before = store.find_page(about.id).await.unwrap().unwrap();

        about.status = Status::Draft;
        about.title = "About us".into();
        about.set_part(PagePart::new("body", "B"));
        let outcome = ctl
            .save(&store, &mut about, &SaveContext::default())
            .await
            .unwrap();

        assert!(!outcome.live_write);
        let live = store.find_page(about.id).await.unwrap().unwrap();
        assert_eq!(live.title, before.title);
        assert_eq!(live.status, Status::Published);
        assert_eq!(live.parts, before.parts);
        assert_eq!(live.lock_version, before.lock_version + 1);
        assert_eq!(about.lock_version, live.lock_version);

        // The in-memory page keeps the pending state; the version equals it.
        assert_eq!(about.title, "About us");
        let version = outcome.version.unwrap();
        assert_eq!(version.number, 2);
        assert_eq!(version.snapshot, PageSnapshot::capture(&about));
    }

    #[tokio::test]
    async fn published_save_updates_live_record() {
        let (store, ctl, mut about) = seeded().await;
        about.title = "About us".into();
        about.set_part(PagePart::new("sidebar", "S"));
        let outcome = ctl
            .save(&store, &mut about, &SaveContext::default())
            .await
            .unwrap();

        assert!(outcome.live_write);
        let live = store.find_page(about.id).await.unwrap().unwrap();
        assert_eq!(live.title, "About us");
        assert_eq!(live.parts.len(), 2);
        assert_eq!(outcome.version.unwrap().snapshot.title, "About us");
    }

    #[tokio::test]
    async fn current_tracks_latest_and_latest_published() {
        let (store, ctl, mut about) = seeded().await;
        let ctx = SaveContext::default();

        about.set_part(PagePart::new("body", "published v2"));
        ctl.save(&store, &mut about, &ctx).await.unwrap();
        about.status = Status::Draft;
        about.set_part(PagePart::new("body", "draft v3"));
        ctl.save(&store, &mut about, &ctx).await.unwrap();

        let tree = store.load_tree().await.unwrap();
        let live = tree.page(about.id).unwrap();
        let cur = current(live, &tree);
        assert_eq!(tree.latest_version(about.id).unwrap().number, 3);
        assert_eq!(cur.part("body").unwrap().content, "draft v3");
        assert_eq!(cur.status, Status::Draft);

        let cur_live = current_live(live, &tree);
        assert_eq!(cur_live.part("body").unwrap().content, "published v2");
        assert_eq!(live.part("body").unwrap().content, "published v2");
    }

    #[tokio::test]
    async fn stale_lock_is_a_conflict_and_rolls_back() {
        let (store, ctl, about) = seeded().await;
        let ctx = SaveContext::default();

        let mut first = about.clone();
        let mut second = about.clone();
        first.status = Status::Draft;
        ctl.save(&store, &mut first, &ctx).await.unwrap();

        second.title = "Lost update".into();
        let err = ctl.save(&store, &mut second, &ctx).await.unwrap_err();
        assert_matches!(err, CoreError::ConcurrencyConflict { page_id, expected: 0 } if page_id == about.id);

        let versions = store.list_versions(about.id, None).await.unwrap();
        assert_eq!(versions.len(), 2);
        let live = store.find_page(about.id).await.unwrap().unwrap();
        assert_eq!(live.title, "about");
    }

    #[tokio::test]
    async fn dropped_transaction_writes_nothing() {
        let (store, _, about) = seeded().await;
        {
            let mut tx = store.begin().await.unwrap();
            tx.touch_lock(about.id, about.lock_version).await.unwrap();
        }
        let live = store.find_page(about.id).await.unwrap().unwrap();
        assert_eq!(live.lock_version, about.lock_version);
    }

    #[tokio::test]
    async fn published_at_is_stamped_once() {
        let (store, ctl, _) = seeded().await;
        let ctx = SaveContext::default();
        let mut page = new_page(Some(1), "news", "N", Status::Draft);
        ctl.create(&store, &mut page, &ctx).await.unwrap();
        assert!(page.published_at.is_none());

        page.status = Status::Published;
        ctl.save(&store, &mut page, &ctx).await.unwrap();
        let first = page.published_at.unwrap();

        ctl.save(&store, &mut page, &ctx).await.unwrap();
        assert_eq!(page.published_at, Some(first));
    }

    #[tokio::test]
    async fn create_rejects_sibling_slug_and_missing_parent() {
        let (store, ctl, about) = seeded().await;
        let ctx = SaveContext::default();

        let mut dup = new_page(about.parent_id, "about", "X", Status::Draft);
        let err = ctl.create(&store, &mut dup, &ctx).await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));

        let mut orphan = new_page(Some(404), "lost", "X", Status::Draft);
        let err = ctl.create(&store, &mut orphan, &ctx).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "page", id: 404 });

        let mut second_root = new_page(None, "/", "X", Status::Draft);
        let err = ctl.create(&store, &mut second_root, &ctx).await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));
    }

    #[tokio::test]
    async fn invalid_slug_is_rejected_before_writing() {
        let (store, ctl, mut about) = seeded().await;
        about.slug = "a/b".into();
        let err = ctl
            .save(&store, &mut about, &SaveContext::default())
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
        assert_eq!(store.list_versions(about.id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn edit_metadata_is_stamped_on_the_version() {
        let (store, ctl, mut about) = seeded().await;
        let ctx = SaveContext {
            edited_by: Some("editor@example.com".into()),
            edit_summary: Some("Typo fix".into()),
        };
        let outcome = ctl.save(&store, &mut about, &ctx).await.unwrap();
        let version = outcome.version.unwrap();
        assert_eq!(version.edited_by.as_deref(), Some("editor@example.com"));

        let stored = store.find_version(about.id, version.number).await.unwrap().unwrap();
        assert_eq!(stored.edit_summary.as_deref(), Some("Typo fix"));
    }

    struct Summarize(&'static str);

    impl AfterSaveHook for Summarize {
        fn name(&self) -> &'static str {
            "summarize"
        }

        fn after_save(
            &self,
            _ctx: &SaveContext,
            _page: &Page,
            version: &PageVersion,
        ) -> Option<VersionFieldUpdate> {
            let previous = version.edit_summary.as_deref().unwrap_or("-");
            Some(VersionFieldUpdate {
                edit_summary: Some(format!("{previous}>{}", self.0)),
                ..VersionFieldUpdate::default()
            })
        }
    }

    #[tokio::test]
    async fn hooks_run_in_declared_order_after_identity_sync() {
        let chain = AfterSaveChain::new()
            .with(Summarize("a"))
            .with(Summarize("b"));
        assert_eq!(chain.names(), ["sync_version_identity", "summarize", "summarize"]);

        let store = MemoryStore::new();
        let ctl = SaveController::new(chain);
        let mut root = new_page(None, "", "home", Status::Published);
        let outcome = ctl
            .create(&store, &mut root, &SaveContext::default())
            .await
            .unwrap();
        assert_eq!(outcome.version.unwrap().edit_summary.as_deref(), Some("->a>b"));
    }

    #[tokio::test]
    async fn unversioned_pages_always_write_live() {
        let (store, ctl, _) = seeded().await;
        let ctx = SaveContext::default();
        let mut page = new_page(Some(1), "plain", "P", Status::Published);
        page.versioned = false;
        let outcome = ctl.create(&store, &mut page, &ctx).await.unwrap();
        assert!(outcome.version.is_none());

        page.status = Status::Draft;
        page.title = "Plain draft".into();
        let outcome = ctl.save(&store, &mut page, &ctx).await.unwrap();
        assert!(outcome.live_write);
        let live = store.find_page(page.id).await.unwrap().unwrap();
        assert_eq!(live.title, "Plain draft");
    }

    #[tokio::test]
    async fn list_versions_is_newest_first_and_limited() {
        let (store, ctl, mut about) = seeded().await;
        let ctx = SaveContext::default();
        for _ in 0..3 {
            ctl.save(&store, &mut about, &ctx).await.unwrap();
        }
        let numbers: Vec<_> = store
            .list_versions(about.id, Some(2))
            .await
            .unwrap()
            .iter()
            .map(|v| v.number)
            .collect();
        assert_eq!(numbers, [4, 3]);
        assert!(store.find_version(about.id, 9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn draft_rename_resolves_only_in_dev() {
        let (store, ctl, mut about) = seeded().await;
        about.status = Status::Draft;
        about.slug = "company".into();
        ctl.save(&store, &mut about, &SaveContext::default())
            .await
            .unwrap();

        let tree = store.load_tree().await.unwrap();
        let registry = PageTypeRegistry::default();
        let resolver = UrlResolver::new(&tree, &registry);
        let id = |url, mode| resolver.resolve(url, mode, true).map(|r| r.page.id);

        assert_eq!(id("/company/", ViewMode::Dev), Some(about.id));
        assert_eq!(id("/company/", ViewMode::Live), None);
        assert_eq!(id("/about/", ViewMode::Live), Some(about.id));
    }
}
