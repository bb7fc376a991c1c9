//! Page part row model.

use folio_core::page::PagePart;
use folio_core::types::DbId;
use sqlx::FromRow;

/// A row from the `page_parts` table.
#[derive(Debug, Clone, FromRow)]
pub struct PagePartRow {
    pub id: DbId,
    pub page_id: DbId,
    pub position: i32,
    pub name: String,
    pub filter_id: Option<String>,
    pub content: String,
}

impl From<PagePartRow> for PagePart {
    fn from(row: PagePartRow) -> Self {
        Self {
            name: row.name,
            filter_id: row.filter_id,
            content: row.content,
        }
    }
}
