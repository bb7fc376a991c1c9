//! Page version row model.

use folio_core::status::{Status, StatusId};
use folio_core::types::{DbId, Timestamp};
use folio_core::version::{PageSnapshot, PageVersion};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::error::DbError;

/// A row from the `page_versions` table. The snapshot is stored as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct PageVersionRow {
    pub id: DbId,
    pub page_id: DbId,
    pub version_number: i32,
    pub slug: String,
    pub status_id: StatusId,
    pub snapshot: Json<PageSnapshot>,
    pub edited_by: Option<String>,
    pub edit_summary: Option<String>,
    pub created_at: Timestamp,
}

impl TryFrom<PageVersionRow> for PageVersion {
    type Error = DbError;

    fn try_from(row: PageVersionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            page_id: row.page_id,
            number: row.version_number,
            slug: row.slug,
            status: Status::from_id(row.status_id)?,
            snapshot: row.snapshot.0,
            edited_by: row.edited_by,
            edit_summary: row.edit_summary,
            created_at: row.created_at,
        })
    }
}
