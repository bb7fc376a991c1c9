//! URL resolution against the page tree under live or dev visibility.
//!
//! Resolution starts at the tree root and recurses into children. A path
//! segment naming a child's slug is tried first, then every child in stored
//! order (siblings may share a slug, so the first may be a dead end). If no
//! child matches, a direct child of a registered not-found type is used as a
//! fallback. Not finding anything is an ordinary `None`, never an error.

use serde::Serialize;

use crate::current::{current, current_children, ViewMode};
use crate::page::Page;
use crate::page_type::PageTypeRegistry;
use crate::tree::PageTree;
use crate::url::{clean_url, next_segment};

/// How a resolved page was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The page's own URL equals the requested URL.
    Exact,
    /// Nothing matched; this is a tree-local not-found page.
    NotFoundFallback,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPage {
    pub page: Page,
    pub kind: MatchKind,
}

impl ResolvedPage {
    fn exact(page: Page) -> Self {
        Self {
            page,
            kind: MatchKind::Exact,
        }
    }

    fn fallback(page: Page) -> Self {
        Self {
            page,
            kind: MatchKind::NotFoundFallback,
        }
    }
}

/// Resolves URLs against one [`PageTree`] snapshot.
#[derive(Debug, Clone, Copy)]
pub struct UrlResolver<'t> {
    tree: &'t PageTree,
    registry: &'t PageTypeRegistry,
}

impl<'t> UrlResolver<'t> {
    pub fn new(tree: &'t PageTree, registry: &'t PageTypeRegistry) -> Self {
        Self { tree, registry }
    }

    /// Resolve `url` from the tree root.
    ///
    /// With `clean` set the URL is normalised first; a URL that cannot be
    /// normalised resolves to `None`.
    pub fn resolve(&self, url: &str, mode: ViewMode, clean: bool) -> Option<ResolvedPage> {
        let Some(root) = self.tree.root() else {
            tracing::debug!(url, "Resolution against an empty page tree");
            return None;
        };
        let resolved = self.find_by_url(root, url, mode, clean);
        tracing::debug!(
            url,
            mode = %mode,
            page_id = resolved.as_ref().map(|r| r.page.id),
            kind = ?resolved.as_ref().map(|r| r.kind),
            "URL resolved"
        );
        resolved
    }

    /// Resolve `url` starting from an arbitrary page of the tree.
    pub fn find_by_url(
        &self,
        page: &Page,
        url: &str,
        mode: ViewMode,
        clean: bool,
    ) -> Option<ResolvedPage> {
        let cleaned;
        let url = if clean {
            cleaned = clean_url(url)?;
            cleaned.as_str()
        } else {
            url
        };
        match mode {
            ViewMode::Live => self.find_live(page, url),
            ViewMode::Dev => self.find_dev(page, url),
        }
    }

    /// Plain lookup over live records. A page only matches when published.
    fn find_live(&self, page: &Page, url: &str) -> Option<ResolvedPage> {
        if self.registry.is_virtual(page) {
            return None;
        }
        let my_url = self.tree.url(page, ViewMode::Live);
        if my_url == url && page.is_published() {
            return Some(ResolvedPage::exact(page.clone()));
        }
        let segment = next_segment(url, &my_url)?;

        if let Some(slug_child) = self.tree.children(page.id).find(|c| c.slug == segment) {
            if let Some(found) = self.find_live(slug_child, url) {
                return Some(found);
            }
        }
        for child in self.tree.children(page.id) {
            if let Some(found) = self.find_live(child, url) {
                return Some(found);
            }
        }

        self.tree
            .children(page.id)
            .find(|c| self.registry.is_not_found_page(c) && c.is_published())
            .map(|c| ResolvedPage::fallback(c.clone()))
    }

    /// Draft-aware lookup. `page` is the root record or a current projection,
    /// and every node is judged by its newest version.
    fn find_dev(&self, page: &Page, url: &str) -> Option<ResolvedPage> {
        if self.registry.is_virtual(page) {
            return None;
        }
        let my_url = self.tree.url(page, ViewMode::Dev);
        if my_url == url {
            return Some(ResolvedPage::exact(current(page, self.tree).into_owned()));
        }
        let segment = next_segment(url, &my_url)?;

        let children = current_children(page.id, self.tree);
        if let Some(slug_child) = children.iter().find(|c| c.slug == segment) {
            if let Some(found) = self.find_dev(slug_child, url) {
                return Some(found);
            }
        }
        for child in &children {
            if let Some(found) = self.find_dev(child, url) {
                return Some(found);
            }
        }

        self.tree
            .children(page.id)
            .find(|c| self.registry.is_not_found_page(c))
            .map(|c| ResolvedPage::fallback(current(c, self.tree).into_owned()))
    }
}
