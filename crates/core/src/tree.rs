//! Read-only snapshot of the page tree used for URL resolution.
//!
//! A [`PageTree`] holds every live page record together with its newest and
//! newest-published versions. It is built once per request from a consistent
//! read and never mutated, so any number of resolutions may share it.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::current::ViewMode;
use crate::page::Page;
use crate::types::DbId;
use crate::url::{child_url, root_url};
use crate::version::PageVersion;

/// A live page and the versions the accessors project it through.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub page: Page,
    pub latest: Option<PageVersion>,
    pub latest_published: Option<PageVersion>,
}

#[derive(Debug, Clone, Default)]
pub struct PageTree {
    nodes: IndexMap<DbId, TreeNode>,
    children: HashMap<DbId, Vec<DbId>>,
    roots: Vec<DbId>,
}

impl PageTree {
    /// Build a snapshot from live pages and any subset of their versions.
    ///
    /// Siblings are kept in stored order (`position`, then `id`). For each page
    /// the highest-numbered version becomes `latest` and the highest-numbered
    /// version at or above Published becomes `latest_published`. Versions of
    /// unknown pages are ignored.
    pub fn build(pages: Vec<Page>, versions: impl IntoIterator<Item = PageVersion>) -> Self {
        let mut nodes: IndexMap<DbId, TreeNode> = pages
            .into_iter()
            .map(|page| {
                (
                    page.id,
                    TreeNode {
                        page,
                        latest: None,
                        latest_published: None,
                    },
                )
            })
            .collect();

        for version in versions {
            let Some(node) = nodes.get_mut(&version.page_id) else {
                continue;
            };
            if version.is_published()
                && node
                    .latest_published
                    .as_ref()
                    .map_or(true, |v| v.number < version.number)
            {
                node.latest_published = Some(version.clone());
            }
            if node.latest.as_ref().map_or(true, |v| v.number < version.number) {
                node.latest = Some(version);
            }
        }

        let mut children: HashMap<DbId, Vec<DbId>> = HashMap::new();
        let mut roots = Vec::new();
        for node in nodes.values() {
            match node.page.parent_id {
                Some(parent) if nodes.contains_key(&parent) => {
                    children.entry(parent).or_default().push(node.page.id)
                }
                Some(_) => {}
                None => roots.push(node.page.id),
            }
        }
        let order = |nodes: &IndexMap<DbId, TreeNode>, ids: &mut Vec<DbId>| {
            ids.sort_by_key(|id| (nodes[id].page.position, *id));
        };
        for ids in children.values_mut() {
            order(&nodes, ids);
        }
        order(&nodes, &mut roots);

        Self {
            nodes,
            children,
            roots,
        }
    }

    /// The first root page in stored order.
    pub fn root(&self) -> Option<&Page> {
        self.roots.first().map(|id| &self.nodes[id].page)
    }

    pub fn page(&self, id: DbId) -> Option<&Page> {
        self.nodes.get(&id).map(|n| &n.page)
    }

    pub fn node(&self, id: DbId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    /// Live child records of `id`, in stored order.
    pub fn children(&self, id: DbId) -> impl Iterator<Item = &Page> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .map(|cid| &self.nodes[cid].page)
    }

    pub fn parent(&self, page: &Page) -> Option<&Page> {
        page.parent_id.and_then(|pid| self.page(pid))
    }

    pub fn latest_version(&self, id: DbId) -> Option<&PageVersion> {
        self.nodes.get(&id).and_then(|n| n.latest.as_ref())
    }

    pub fn latest_published_version(&self, id: DbId) -> Option<&PageVersion> {
        self.nodes.get(&id).and_then(|n| n.latest_published.as_ref())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// URL of `page` under the given view.
    ///
    /// `page` supplies its own slug (pass a projection to get the projected
    /// slug). Ancestors contribute their live slugs in [`ViewMode::Live`] and
    /// their current slugs in [`ViewMode::Dev`], so a renamed draft parent
    /// moves its children in the dev view only.
    pub fn url(&self, page: &Page, mode: ViewMode) -> String {
        let mut slugs = vec![page.slug.as_str()];
        let mut next = page.parent_id;
        // Bounded by the node count so corrupt parent links cannot loop forever.
        for _ in 0..self.nodes.len() {
            let Some(ancestor) = next.and_then(|id| self.page(id)) else {
                break;
            };
            let slug = match mode {
                ViewMode::Live => ancestor.slug.as_str(),
                ViewMode::Dev => self
                    .latest_version(ancestor.id)
                    .filter(|_| ancestor.versioned)
                    .map_or(ancestor.slug.as_str(), |v| v.slug.as_str()),
            };
            slugs.push(slug);
            next = ancestor.parent_id;
        }

        let mut segments = slugs.into_iter().rev();
        let mut url = root_url(segments.next().unwrap_or_default());
        for slug in segments {
            url = child_url(&url, slug);
        }
        url
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::about_team;
    use super::*;
    use crate::page::fixtures::page;
    use crate::status::Status;
    use crate::version::fixtures::version_of;

    #[test]
    fn children_follow_stored_order() {
        let root = page(1, None, "");
        let mut b = page(2, Some(1), "b");
        b.position = 2;
        let mut a = page(3, Some(1), "a");
        a.position = 1;
        let tree = PageTree::build(vec![root, b, a], Vec::new());
        let slugs: Vec<_> = tree.children(1).map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "b"]);
    }

    #[test]
    fn latest_and_latest_published_are_tracked_separately() {
        let mut p = page(1, None, "");
        let v1 = version_of(&p, 1, 1);
        p.status = Status::Draft;
        let v2 = version_of(&p, 2, 2);
        let tree = PageTree::build(vec![p], vec![v2, v1]);
        assert_eq!(tree.latest_version(1).unwrap().number, 2);
        assert_eq!(tree.latest_published_version(1).unwrap().number, 1);
    }

    #[test]
    fn urls_follow_ancestor_chain() {
        let tree = about_team();
        let team = tree.page(3).unwrap();
        assert_eq!(tree.url(team, ViewMode::Live), "/about/team/");
        assert_eq!(tree.url(tree.root().unwrap(), ViewMode::Live), "/");
    }

    #[test]
    fn dev_url_uses_renamed_draft_parent() {
        let root = page(1, None, "");
        let about = page(2, Some(1), "about");
        let team = page(3, Some(2), "team");
        let mut renamed = about.clone();
        renamed.slug = "about-us".into();
        renamed.status = Status::Draft;
        let versions = vec![version_of(&about, 10, 1), version_of(&renamed, 11, 2)];
        let tree = PageTree::build(vec![root, about, team], versions);

        let team = tree.page(3).unwrap();
        assert_eq!(tree.url(team, ViewMode::Live), "/about/team/");
        assert_eq!(tree.url(team, ViewMode::Dev), "/about-us/team/");
    }

    #[test]
    fn dev_url_ignores_versions_of_unversioned_parent() {
        let root = page(1, None, "");
        let mut about = page(2, Some(1), "about");
        let team = page(3, Some(2), "team");
        let mut renamed = about.clone();
        renamed.slug = "about-us".into();
        let versions = vec![version_of(&renamed, 10, 1)];
        about.versioned = false;
        let tree = PageTree::build(vec![root, about, team], versions);

        let team = tree.page(3).unwrap();
        assert_eq!(tree.url(team, ViewMode::Dev), "/about/team/");
    }

    #[test]
    fn orphaned_pages_are_not_roots() {
        let orphan = page(5, Some(99), "lost");
        let root = page(1, None, "");
        let tree = PageTree::build(vec![orphan, root], Vec::new());
        assert_eq!(tree.root().unwrap().id, 1);
        assert_eq!(tree.len(), 2);
    }
}
