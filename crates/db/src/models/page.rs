//! Page row model.

use folio_core::page::{Page, PagePart};
use folio_core::status::{Status, StatusId};
use folio_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::error::DbError;

/// A row from the `pages` table. Parts live in `page_parts`.
#[derive(Debug, Clone, FromRow)]
pub struct PageRow {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub position: i32,
    pub title: String,
    pub slug: String,
    pub breadcrumb: Option<String>,
    pub class_name: Option<String>,
    pub status_id: StatusId,
    pub layout_id: Option<DbId>,
    pub virtual_page: bool,
    pub versioned: bool,
    pub lock_version: i32,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PageRow {
    /// Combine the row with its parts, already in stored order.
    pub fn into_page(self, parts: Vec<PagePart>) -> Result<Page, DbError> {
        Ok(Page {
            id: self.id,
            parent_id: self.parent_id,
            position: self.position,
            title: self.title,
            slug: self.slug,
            breadcrumb: self.breadcrumb,
            class_name: self.class_name,
            status: Status::from_id(self.status_id)?,
            layout_id: self.layout_id,
            virtual_page: self.virtual_page,
            versioned: self.versioned,
            lock_version: self.lock_version,
            published_at: self.published_at,
            parts,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
