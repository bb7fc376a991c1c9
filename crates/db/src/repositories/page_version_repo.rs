//! Repository for the `page_versions` table.

use folio_core::status::Status;
use folio_core::types::DbId;
use folio_core::version::{PageSnapshot, VersionFieldUpdate};
use sqlx::types::Json;
use sqlx::PgConnection;

use crate::models::page_version::PageVersionRow;

const COLUMNS: &str = "id, page_id, version_number, slug, status_id, snapshot, \
    edited_by, edit_summary, created_at";

/// Append-only page history.
pub struct PageVersionRepo;

impl PageVersionRepo {
    /// Insert the next-numbered version of a page.
    ///
    /// `slug` and `status_id` start out as the snapshot's own values.
    pub async fn create(
        conn: &mut PgConnection,
        page_id: DbId,
        snapshot: &PageSnapshot,
    ) -> Result<PageVersionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO page_versions (page_id, version_number, slug, status_id, snapshot)
             VALUES (
                $1,
                (SELECT COALESCE(MAX(version_number), 0) + 1 FROM page_versions WHERE page_id = $1),
                $2, $3, $4
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageVersionRow>(&query)
            .bind(page_id)
            .bind(&snapshot.slug)
            .bind(snapshot.status.id())
            .bind(Json(snapshot))
            .fetch_one(conn)
            .await
    }

    /// Versions of a page, newest first. A `None` limit returns all of them.
    pub async fn list_by_page(
        conn: &mut PgConnection,
        page_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<PageVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM page_versions
             WHERE page_id = $1
             ORDER BY version_number DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, PageVersionRow>(&query)
            .bind(page_id)
            .bind(limit)
            .fetch_all(conn)
            .await
    }

    pub async fn find_by_number(
        conn: &mut PgConnection,
        page_id: DbId,
        number: i32,
    ) -> Result<Option<PageVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM page_versions WHERE page_id = $1 AND version_number = $2"
        );
        sqlx::query_as::<_, PageVersionRow>(&query)
            .bind(page_id)
            .bind(number)
            .fetch_optional(conn)
            .await
    }

    /// The newest version of every page plus the newest published one.
    ///
    /// A version that is both appears twice; the tree builder keeps one copy.
    pub async fn list_tree_heads(
        conn: &mut PgConnection,
    ) -> Result<Vec<PageVersionRow>, sqlx::Error> {
        let query = format!(
            "(SELECT DISTINCT ON (page_id) {COLUMNS} FROM page_versions
              ORDER BY page_id, version_number DESC)
             UNION ALL
             (SELECT DISTINCT ON (page_id) {COLUMNS} FROM page_versions
              WHERE status_id >= $1
              ORDER BY page_id, version_number DESC)"
        );
        sqlx::query_as::<_, PageVersionRow>(&query)
            .bind(Status::Published.id())
            .fetch_all(conn)
            .await
    }

    /// Apply a narrow field update. `slug` and `status` are mirrored into the
    /// snapshot document so the two never disagree.
    pub async fn update_fields(
        conn: &mut PgConnection,
        id: DbId,
        update: &VersionFieldUpdate,
    ) -> Result<Option<PageVersionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE page_versions SET
                slug = COALESCE($2, slug),
                status_id = COALESCE($3, status_id),
                edited_by = COALESCE($5, edited_by),
                edit_summary = COALESCE($6, edit_summary),
                snapshot = snapshot || jsonb_strip_nulls(
                    jsonb_build_object('slug', $2::text, 'status', $4::text))
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageVersionRow>(&query)
            .bind(id)
            .bind(&update.slug)
            .bind(update.status.map(Status::id))
            .bind(update.status.map(Status::as_str))
            .bind(&update.edited_by)
            .bind(&update.edit_summary)
            .fetch_optional(conn)
            .await
    }
}
