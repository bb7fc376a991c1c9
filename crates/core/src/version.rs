//! Page versions: immutable snapshots of a page's fields and parts.
//!
//! A version is created exactly once per qualifying save. The only mutation
//! allowed afterwards goes through [`VersionFieldUpdate`], which the save path
//! uses to keep `slug`/`status` in sync with the page at capture time and to
//! let after-save hooks stamp edit metadata.

use serde::{Deserialize, Serialize};

use crate::page::{Page, PartAttributes};
use crate::status::Status;
use crate::types::{DbId, Timestamp};

/// Versioned flat fields plus the ordered part collection, as one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub title: String,
    pub slug: String,
    pub breadcrumb: Option<String>,
    pub class_name: Option<String>,
    pub status: Status,
    pub layout_id: Option<DbId>,
    pub virtual_page: bool,
    pub parts: Vec<PartAttributes>,
}

impl PageSnapshot {
    /// Capture the in-memory state of `page`, including pending parts.
    pub fn capture(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            slug: page.slug.clone(),
            breadcrumb: page.breadcrumb.clone(),
            class_name: page.class_name.clone(),
            status: page.status,
            layout_id: page.layout_id,
            virtual_page: page.virtual_page,
            parts: page.parts.iter().map(|p| p.attributes()).collect(),
        }
    }
}

/// A stored version of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVersion {
    pub id: DbId,
    pub page_id: DbId,
    /// 1-based, strictly increasing per page.
    pub number: i32,
    pub slug: String,
    pub status: Status,
    pub snapshot: PageSnapshot,
    pub edited_by: Option<String>,
    pub edit_summary: Option<String>,
    pub created_at: Timestamp,
}

impl PageVersion {
    /// Project this version onto the live page it belongs to.
    ///
    /// Tree position, identity and the locking column come from `live`; every
    /// versioned field comes from the snapshot, with `slug` and `status` taken
    /// from the version's own identity fields.
    pub fn instance(&self, live: &Page) -> Page {
        debug_assert_eq!(self.page_id, live.id);
        let snap = &self.snapshot;
        Page {
            id: live.id,
            parent_id: live.parent_id,
            position: live.position,
            title: snap.title.clone(),
            slug: self.slug.clone(),
            breadcrumb: snap.breadcrumb.clone(),
            class_name: snap.class_name.clone(),
            status: self.status,
            layout_id: snap.layout_id,
            virtual_page: snap.virtual_page,
            versioned: live.versioned,
            lock_version: live.lock_version,
            published_at: live.published_at,
            parts: snap.parts.iter().cloned().map(Into::into).collect(),
            created_at: live.created_at,
            updated_at: self.created_at,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status.is_live()
    }
}

/// A narrow set of fields that may be written onto an existing version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFieldUpdate {
    pub slug: Option<String>,
    pub status: Option<Status>,
    pub edited_by: Option<String>,
    pub edit_summary: Option<String>,
}

impl VersionFieldUpdate {
    /// The identity correction applied right after capture.
    pub fn identity_of(page: &Page) -> Self {
        Self {
            slug: Some(page.slug.clone()),
            status: Some(page.status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.status.is_none()
            && self.edited_by.is_none()
            && self.edit_summary.is_none()
    }

    /// Apply the update in place. Slug and status are mirrored into the
    /// snapshot so the two never disagree.
    pub fn apply(&self, version: &mut PageVersion) {
        if let Some(slug) = &self.slug {
            version.slug = slug.clone();
            version.snapshot.slug = slug.clone();
        }
        if let Some(status) = self.status {
            version.status = status;
            version.snapshot.status = status;
        }
        if let Some(by) = &self.edited_by {
            version.edited_by = Some(by.clone());
        }
        if let Some(summary) = &self.edit_summary {
            version.edit_summary = Some(summary.clone());
        }
    }
}
