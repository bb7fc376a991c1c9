//! Integration tests for the Postgres page store.
//!
//! Exercises `PgPageStore` and the repositories against a real database:
//! - A draft save moves only the lock column and records a version
//! - A draft create keeps its parts out of `page_parts`
//! - A stale lock value is a concurrency conflict and writes nothing
//! - Sibling slug uniqueness surfaces as a conflict
//! - Field updates mirror slug and status into the snapshot document
//! - Tree heads carry the newest and the newest published version

use assert_matches::assert_matches;
use folio_core::error::CoreError;
use folio_core::page::{Page, PagePart};
use folio_core::save::{SaveContext, SaveController};
use folio_core::status::Status;
use folio_core::store::PageStore;
use folio_core::version::VersionFieldUpdate;
use folio_db::repositories::{PagePartRepo, PageVersionRepo};
use folio_db::PgPageStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_page(parent_id: Option<i64>, slug: &str, body: &str, status: Status) -> Page {
    let title = if slug.is_empty() { "Home" } else { slug };
    let mut page = Page::new(parent_id, title, slug);
    page.status = status;
    page.set_part(PagePart::new("body", body));
    page
}

/// A store holding a published root and a published `/about/` page.
async fn seeded(pool: PgPool) -> (PgPageStore, SaveController, Page) {
    let store = PgPageStore::new(pool);
    let ctl = SaveController::default();
    let ctx = SaveContext::default();

    let mut root = new_page(None, "", "home", Status::Published);
    ctl.create(&store, &mut root, &ctx).await.unwrap();
    let mut about = new_page(Some(root.id), "about", "A", Status::Published);
    ctl.create(&store, &mut about, &ctx).await.unwrap();
    (store, ctl, about)
}

// ---------------------------------------------------------------------------
// Test: draft saves
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_draft_save_keeps_live_row_and_parts(pool: PgPool) {
    let (store, ctl, mut about) = seeded(pool).await;
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
    assert_eq!(live.title, "about");
    assert_eq!(live.status, Status::Published);
    assert_eq!(live.parts, before.parts);
    assert_eq!(live.lock_version, before.lock_version + 1);

    let versions = store.list_versions(about.id, None).await.unwrap();
    let numbers: Vec<_> = versions.iter().map(|v| v.number).collect();
    assert_eq!(numbers, [2, 1]);
    assert_eq!(versions[0].status, Status::Draft);
    assert_eq!(versions[0].snapshot.title, "About us");
    assert_eq!(versions[0].snapshot.parts[0].content, "B");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_draft_create_writes_no_parts(pool: PgPool) {
    let (store, ctl, about) = seeded(pool.clone()).await;
    let mut team = new_page(Some(about.id), "team", "T", Status::Draft);
    ctl.create(&store, &mut team, &SaveContext::default())
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let rows = PagePartRepo::list_for_page(&mut conn, team.id).await.unwrap();
    assert!(rows.is_empty());

    let live = store.find_page(team.id).await.unwrap().unwrap();
    assert!(live.parts.is_empty());
    assert_eq!(live.slug, "team");

    let first = store.find_version(team.id, 1).await.unwrap().unwrap();
    assert_eq!(first.snapshot.parts[0].content, "T");
}

// ---------------------------------------------------------------------------
// Test: optimistic locking and uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_stale_lock_is_a_concurrency_conflict(pool: PgPool) {
    let (store, ctl, mut about) = seeded(pool).await;
    let ctx = SaveContext::default();
    let mut stale = about.clone();

    ctl.save(&store, &mut about, &ctx).await.unwrap();
    stale.title = "Lost update".into();
    let err = ctl.save(&store, &mut stale, &ctx).await.unwrap_err();
    assert_matches!(
        err,
        CoreError::ConcurrencyConflict { page_id, expected: 0 } if page_id == about.id
    );

    let live = store.find_page(about.id).await.unwrap().unwrap();
    assert_eq!(live.title, "about");
    assert_eq!(live.lock_version, 1);
    assert_eq!(store.list_versions(about.id, None).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_sibling_slug_is_a_conflict(pool: PgPool) {
    let (store, ctl, about) = seeded(pool).await;
    let parent_id = about.parent_id;
    let mut twin = new_page(parent_id, "about", "twin", Status::Published);

    let err = ctl
        .create(&store, &mut twin, &SaveContext::default())
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    let tree = store.load_tree().await.unwrap();
    assert_eq!(tree.len(), 2);
}

// ---------------------------------------------------------------------------
// Test: version field updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_update_fields_mirrors_identity_into_snapshot(pool: PgPool) {
    let (store, _, about) = seeded(pool.clone()).await;
    let first = store.find_version(about.id, 1).await.unwrap().unwrap();

    let update = VersionFieldUpdate {
        slug: Some("company".into()),
        status: Some(Status::Hidden),
        edited_by: Some("ed".into()),
        ..VersionFieldUpdate::default()
    };
    let mut conn = pool.acquire().await.unwrap();
    let row = PageVersionRepo::update_fields(&mut conn, first.id, &update)
        .await
        .unwrap()
        .expect("version exists");
    assert_eq!(row.slug, "company");
    assert_eq!(row.status_id, Status::Hidden.id());
    assert_eq!(row.edited_by.as_deref(), Some("ed"));

    let (slug, status): (String, String) = sqlx::query_as(
        "SELECT snapshot->>'slug', snapshot->>'status' FROM page_versions WHERE id = $1",
    )
    .bind(first.id)
    .fetch_one(&mut *conn)
    .await
    .unwrap();
    assert_eq!(slug, "company");
    assert_eq!(status, "hidden");

    let stored = store.find_version(about.id, 1).await.unwrap().unwrap();
    assert_eq!(stored.snapshot.slug, "company");
    assert_eq!(stored.snapshot.status, Status::Hidden);
    assert_eq!(stored.snapshot.title, first.snapshot.title);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_fields_missing_version_returns_none(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let update = VersionFieldUpdate {
        edited_by: Some("ed".into()),
        ..VersionFieldUpdate::default()
    };
    let row = PageVersionRepo::update_fields(&mut conn, 999, &update)
        .await
        .unwrap();
    assert!(row.is_none());
}

// ---------------------------------------------------------------------------
// Test: tree loading
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_tree_heads_are_newest_and_newest_published(pool: PgPool) {
    let (store, ctl, mut about) = seeded(pool.clone()).await;
    let ctx = SaveContext::default();
    ctl.save(&store, &mut about, &ctx).await.unwrap();
    about.status = Status::Draft;
    ctl.save(&store, &mut about, &ctx).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let mut heads: Vec<_> = PageVersionRepo::list_tree_heads(&mut conn)
        .await
        .unwrap()
        .into_iter()
        .filter(|row| row.page_id == about.id)
        .map(|row| row.version_number)
        .collect();
    heads.sort_unstable();
    assert_eq!(heads, [2, 3]);

    let tree = store.load_tree().await.unwrap();
    assert_eq!(tree.latest_version(about.id).unwrap().number, 3);
    assert_eq!(tree.latest_published_version(about.id).unwrap().number, 2);
    let node = tree.page(about.id).unwrap();
    assert_eq!(node.status, Status::Published);
    assert_eq!(node.parts[0].content, "A");
}
