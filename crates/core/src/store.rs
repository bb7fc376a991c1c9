//! Persistence seams consumed by the save controller and the HTTP layer.
//!
//! A [`PageStore`] hands out read snapshots and opens [`PageTransaction`]s.
//! Everything a save writes (the live record, the version row and any
//! after-save stamping) goes through one transaction, which is rolled back
//! if it is dropped without [`PageTransaction::commit`].

use std::future::Future;

use crate::error::CoreError;
use crate::page::{Page, PagePart};
use crate::tree::PageTree;
use crate::types::DbId;
use crate::version::{PageSnapshot, PageVersion, VersionFieldUpdate};

/// Read access plus transaction factory.
pub trait PageStore: Send + Sync {
    type Tx<'a>: PageTransaction + 'a
    where
        Self: 'a;

    /// Verify the backing storage is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Load the live record of a page, parts included.
    fn find_page(&self, id: DbId) -> impl Future<Output = Result<Option<Page>, CoreError>> + Send;

    /// Load every live page with its newest and newest-published versions.
    fn load_tree(&self) -> impl Future<Output = Result<PageTree, CoreError>> + Send;

    /// Versions of a page, newest first, optionally capped at `limit`.
    fn list_versions(
        &self,
        page_id: DbId,
        limit: Option<i64>,
    ) -> impl Future<Output = Result<Vec<PageVersion>, CoreError>> + Send;

    /// One version of a page by its per-page number.
    fn find_version(
        &self,
        page_id: DbId,
        number: i32,
    ) -> impl Future<Output = Result<Option<PageVersion>, CoreError>> + Send;

    /// Open a write transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx<'_>, CoreError>> + Send;
}

/// The write operations of one save.
///
/// Every method that changes the live record compares `lock_version` and
/// returns the new value; a mismatch is [`CoreError::ConcurrencyConflict`].
pub trait PageTransaction: Send {
    /// Insert a new page with its parts. Returns the stored record with its
    /// assigned id, position and lock value.
    fn insert_page(&mut self, page: &Page) -> impl Future<Output = Result<Page, CoreError>> + Send;

    /// Bump the lock column of `page_id` without touching any other column.
    fn touch_lock(
        &mut self,
        page_id: DbId,
        expected: i32,
    ) -> impl Future<Output = Result<i32, CoreError>> + Send;

    /// Write the ordinary columns of `page` to its live record.
    fn update_live(&mut self, page: &Page) -> impl Future<Output = Result<i32, CoreError>> + Send;

    /// Replace the live parts of `page_id` with `parts`, in order.
    fn replace_parts(
        &mut self,
        page_id: DbId,
        parts: &[PagePart],
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Append the next-numbered version of `page_id`.
    fn create_version(
        &mut self,
        page_id: DbId,
        snapshot: &PageSnapshot,
    ) -> impl Future<Output = Result<PageVersion, CoreError>> + Send;

    /// Apply a narrow field update to an existing version.
    fn update_version_fields(
        &mut self,
        version_id: DbId,
        update: &VersionFieldUpdate,
    ) -> impl Future<Output = Result<PageVersion, CoreError>> + Send;

    /// Make every write of this transaction visible.
    fn commit(self) -> impl Future<Output = Result<(), CoreError>> + Send;
}
