//! Postgres-backed [`PageStore`].

use std::collections::HashMap;

use folio_core::error::CoreError;
use folio_core::page::{Page, PagePart};
use folio_core::store::{PageStore, PageTransaction};
use folio_core::tree::PageTree;
use folio_core::types::DbId;
use folio_core::version::{PageSnapshot, PageVersion, VersionFieldUpdate};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::DbError;
use crate::repositories::{PagePartRepo, PageRepo, PageVersionRepo};

#[derive(Debug, Clone)]
pub struct PgPageStore {
    pool: PgPool,
}

impl PgPageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Open a read-only transaction whose statements all see one snapshot.
    ///
    /// A save commits the live row, its parts and the new version together;
    /// reading them through separate statements under READ COMMITTED could
    /// pair one save's parts with another's row.
    async fn read_snapshot(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn load_page(&self, id: DbId) -> Result<Option<Page>, DbError> {
        let mut tx = self.read_snapshot().await?;
        let Some(row) = PageRepo::find_by_id(&mut tx, id).await? else {
            return Ok(None);
        };
        let parts = PagePartRepo::list_for_page(&mut tx, id)
            .await?
            .into_iter()
            .map(PagePart::from)
            .collect();
        tx.commit().await?;
        Ok(Some(row.into_page(parts)?))
    }

    async fn load_snapshot(&self) -> Result<PageTree, DbError> {
        let mut tx = self.read_snapshot().await?;
        let rows = PageRepo::list_all(&mut tx).await?;
        let part_rows = PagePartRepo::list_all(&mut tx).await?;
        let version_rows = PageVersionRepo::list_tree_heads(&mut tx).await?;
        tx.commit().await?;

        let mut parts: HashMap<DbId, Vec<PagePart>> = HashMap::new();
        for part in part_rows {
            parts.entry(part.page_id).or_default().push(part.into());
        }
        let pages = rows
            .into_iter()
            .map(|row| {
                let own = parts.remove(&row.id).unwrap_or_default();
                row.into_page(own)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let versions = version_rows
            .into_iter()
            .map(PageVersion::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(pages = pages.len(), versions = versions.len(), "Page tree loaded");
        Ok(PageTree::build(pages, versions))
    }

    async fn load_versions(
        &self,
        page_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<PageVersion>, DbError> {
        let mut conn = self.pool.acquire().await?;
        PageVersionRepo::list_by_page(&mut conn, page_id, limit)
            .await?
            .into_iter()
            .map(PageVersion::try_from)
            .collect()
    }

    async fn load_version(
        &self,
        page_id: DbId,
        number: i32,
    ) -> Result<Option<PageVersion>, DbError> {
        let mut conn = self.pool.acquire().await?;
        PageVersionRepo::find_by_number(&mut conn, page_id, number)
            .await?
            .map(PageVersion::try_from)
            .transpose()
    }
}

impl PageStore for PgPageStore {
    type Tx<'a> = PgPageTransaction;

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(DbError::from)?;
        Ok(())
    }

    async fn find_page(&self, id: DbId) -> Result<Option<Page>, CoreError> {
        Ok(self.load_page(id).await?)
    }

    async fn load_tree(&self) -> Result<PageTree, CoreError> {
        Ok(self.load_snapshot().await?)
    }

    async fn list_versions(
        &self,
        page_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<PageVersion>, CoreError> {
        Ok(self.load_versions(page_id, limit).await?)
    }

    async fn find_version(
        &self,
        page_id: DbId,
        number: i32,
    ) -> Result<Option<PageVersion>, CoreError> {
        Ok(self.load_version(page_id, number).await?)
    }

    async fn begin(&self) -> Result<PgPageTransaction, CoreError> {
        let tx = self.pool.begin().await.map_err(DbError::from)?;
        Ok(PgPageTransaction { tx })
    }
}

/// A save in progress. Dropping it rolls the database transaction back.
pub struct PgPageTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgPageTransaction {
    /// Turn a failed compare-and-swap into the matching error.
    async fn lock_miss(&mut self, page_id: DbId, expected: i32) -> Result<CoreError, DbError> {
        if PageRepo::exists(&mut self.tx, page_id).await? {
            tracing::warn!(page_id, expected, "Stale lock version on save");
            Ok(CoreError::ConcurrencyConflict { page_id, expected })
        } else {
            Ok(CoreError::NotFound {
                entity: "page",
                id: page_id,
            })
        }
    }

    async fn insert(&mut self, page: &Page) -> Result<Page, DbError> {
        let row = PageRepo::insert(&mut self.tx, page).await?;
        PagePartRepo::replace(&mut self.tx, row.id, &page.parts).await?;
        row.into_page(page.parts.clone())
    }

    async fn cas(&mut self, page_id: DbId, expected: i32, new: Option<i32>) -> Result<i32, CoreError> {
        match new {
            Some(lock) => Ok(lock),
            None => Err(self.lock_miss(page_id, expected).await?),
        }
    }
}

impl PageTransaction for PgPageTransaction {
    async fn insert_page(&mut self, page: &Page) -> Result<Page, CoreError> {
        Ok(self.insert(page).await?)
    }

    async fn touch_lock(&mut self, page_id: DbId, expected: i32) -> Result<i32, CoreError> {
        let new = PageRepo::touch_lock(&mut self.tx, page_id, expected)
            .await
            .map_err(DbError::from)?;
        self.cas(page_id, expected, new).await
    }

    async fn update_live(&mut self, page: &Page) -> Result<i32, CoreError> {
        let new = PageRepo::update_live(&mut self.tx, page)
            .await
            .map_err(DbError::from)?;
        self.cas(page.id, page.lock_version, new).await
    }

    async fn replace_parts(&mut self, page_id: DbId, parts: &[PagePart]) -> Result<(), CoreError> {
        PagePartRepo::replace(&mut self.tx, page_id, parts)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn create_version(
        &mut self,
        page_id: DbId,
        snapshot: &PageSnapshot,
    ) -> Result<PageVersion, CoreError> {
        let row = PageVersionRepo::create(&mut self.tx, page_id, snapshot)
            .await
            .map_err(DbError::from)?;
        Ok(PageVersion::try_from(row)?)
    }

    async fn update_version_fields(
        &mut self,
        version_id: DbId,
        update: &VersionFieldUpdate,
    ) -> Result<PageVersion, CoreError> {
        let row = PageVersionRepo::update_fields(&mut self.tx, version_id, update)
            .await
            .map_err(DbError::from)?
            .ok_or(CoreError::NotFound {
                entity: "page_version",
                id: version_id,
            })?;
        Ok(PageVersion::try_from(row)?)
    }

    async fn commit(self) -> Result<(), CoreError> {
        self.tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }
}
