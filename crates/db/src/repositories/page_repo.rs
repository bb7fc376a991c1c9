//! Repository for the `pages` table.

use folio_core::page::Page;
use folio_core::types::DbId;
use sqlx::PgConnection;

use crate::models::page::PageRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, parent_id, position, title, slug, breadcrumb, class_name, \
    status_id, layout_id, virtual_page, versioned, lock_version, published_at, \
    created_at, updated_at";

/// Live page records and their optimistic-locking column.
pub struct PageRepo;

impl PageRepo {
    /// Find a page row by its ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<PageRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE id = $1");
        sqlx::query_as::<_, PageRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Every page row, siblings in stored order.
    pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<PageRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages ORDER BY parent_id NULLS FIRST, position, id");
        sqlx::query_as::<_, PageRow>(&query).fetch_all(conn).await
    }

    /// Whether a page row exists.
    pub async fn exists(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pages WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await?;
        Ok(row.0)
    }

    /// Insert a page at the end of its sibling list. Parts are written separately.
    pub async fn insert(conn: &mut PgConnection, page: &Page) -> Result<PageRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO pages
                (parent_id, position, title, slug, breadcrumb, class_name, status_id,
                 layout_id, virtual_page, versioned, published_at, created_at, updated_at)
             VALUES (
                $1,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM pages WHERE parent_id IS NOT DISTINCT FROM $1),
                $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageRow>(&query)
            .bind(page.parent_id)
            .bind(&page.title)
            .bind(&page.slug)
            .bind(&page.breadcrumb)
            .bind(&page.class_name)
            .bind(page.status.id())
            .bind(page.layout_id)
            .bind(page.virtual_page)
            .bind(page.versioned)
            .bind(page.published_at)
            .bind(page.created_at)
            .bind(page.updated_at)
            .fetch_one(conn)
            .await
    }

    /// Bump `lock_version` if it still equals `expected`.
    ///
    /// Returns the new value, or `None` when the row is missing or the lock
    /// has moved on.
    pub async fn touch_lock(
        conn: &mut PgConnection,
        id: DbId,
        expected: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "UPDATE pages SET lock_version = lock_version + 1 \
             WHERE id = $1 AND lock_version = $2 \
             RETURNING lock_version",
        )
        .bind(id)
        .bind(expected)
        .fetch_optional(conn)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Write the ordinary columns of `page`, guarded by its `lock_version`.
    ///
    /// Same return contract as [`PageRepo::touch_lock`].
    pub async fn update_live(
        conn: &mut PgConnection,
        page: &Page,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "UPDATE pages SET
                title = $3,
                slug = $4,
                breadcrumb = $5,
                class_name = $6,
                status_id = $7,
                layout_id = $8,
                virtual_page = $9,
                versioned = $10,
                published_at = $11,
                updated_at = $12,
                lock_version = lock_version + 1
             WHERE id = $1 AND lock_version = $2
             RETURNING lock_version",
        )
        .bind(page.id)
        .bind(page.lock_version)
        .bind(&page.title)
        .bind(&page.slug)
        .bind(&page.breadcrumb)
        .bind(&page.class_name)
        .bind(page.status.id())
        .bind(page.layout_id)
        .bind(page.virtual_page)
        .bind(page.versioned)
        .bind(page.published_at)
        .bind(page.updated_at)
        .fetch_optional(conn)
        .await?;
        Ok(row.map(|r| r.0))
    }
}
