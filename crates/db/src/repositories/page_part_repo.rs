//! Repository for the `page_parts` table.

use folio_core::page::PagePart;
use folio_core::types::DbId;
use sqlx::PgConnection;

use crate::models::page_part::PagePartRow;

const COLUMNS: &str = "id, page_id, position, name, filter_id, content";

pub struct PagePartRepo;

impl PagePartRepo {
    /// Parts of one page in stored order.
    pub async fn list_for_page(
        conn: &mut PgConnection,
        page_id: DbId,
    ) -> Result<Vec<PagePartRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM page_parts WHERE page_id = $1 ORDER BY position");
        sqlx::query_as::<_, PagePartRow>(&query)
            .bind(page_id)
            .fetch_all(conn)
            .await
    }

    /// Every part, grouped by page and in stored order within each page.
    pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<PagePartRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM page_parts ORDER BY page_id, position");
        sqlx::query_as::<_, PagePartRow>(&query).fetch_all(conn).await
    }

    /// Replace the parts of a page with `parts`, keeping their order.
    pub async fn replace(
        conn: &mut PgConnection,
        page_id: DbId,
        parts: &[PagePart],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM page_parts WHERE page_id = $1")
            .bind(page_id)
            .execute(&mut *conn)
            .await?;

        for (position, part) in (0_i32..).zip(parts) {
            sqlx::query(
                "INSERT INTO page_parts (page_id, position, name, filter_id, content) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(page_id)
            .bind(position)
            .bind(&part.name)
            .bind(&part.filter_id)
            .bind(&part.content)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}
