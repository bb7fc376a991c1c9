//! Current / current-live projections.
//!
//! These decide which state of a page a caller should actually show: the dev
//! view sees the newest version whatever its status, the live view sees the
//! newest published version. Pages that are not versioned (or have no
//! matching version yet) project to themselves.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::page::Page;
use crate::tree::PageTree;
use crate::types::DbId;

/// Which visibility rules apply to a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Published content only.
    #[default]
    Live,
    /// Latest content, including unpublished drafts.
    Dev,
}

impl ViewMode {
    pub fn is_live(self) -> bool {
        self == ViewMode::Live
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Live => "live",
            ViewMode::Dev => "dev",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The newest version of `page`, possibly ahead of the live record.
pub fn current<'a>(page: &'a Page, tree: &PageTree) -> Cow<'a, Page> {
    match tree.latest_version(page.id) {
        Some(version) if page.versioned => Cow::Owned(version.instance(page)),
        _ => Cow::Borrowed(page),
    }
}

/// The newest published version of `page`.
pub fn current_live<'a>(page: &'a Page, tree: &PageTree) -> Cow<'a, Page> {
    match tree.latest_published_version(page.id) {
        Some(version) if page.versioned => Cow::Owned(version.instance(page)),
        _ => Cow::Borrowed(page),
    }
}

/// `current` or `current_live` depending on `mode`.
pub fn project<'a>(page: &'a Page, tree: &PageTree, mode: ViewMode) -> Cow<'a, Page> {
    match mode {
        ViewMode::Live => current_live(page, tree),
        ViewMode::Dev => current(page, tree),
    }
}

/// Every direct child of `page_id`, each through [`current`], in stored order.
pub fn current_children(page_id: DbId, tree: &PageTree) -> Vec<Cow<'_, Page>> {
    tree.children(page_id).map(|c| current(c, tree)).collect()
}

/// The layout a renderer should use for `page`.
///
/// In the dev view a versioned layout is shown at its newest version; the live
/// view always uses the layout's live record. `None` when the page has no
/// layout or the layout is not part of the snapshot.
pub fn layout_for<'t>(page: &Page, tree: &'t PageTree, mode: ViewMode) -> Option<Cow<'t, Page>> {
    let layout = tree.page(page.layout_id?)?;
    Some(match mode {
        ViewMode::Dev => current(layout, tree),
        ViewMode::Live => Cow::Borrowed(layout),
    })
}
