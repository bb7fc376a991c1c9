//! Registry of page-type tags with special routing behaviour.
//!
//! Page types are plain string tags stored in `pages.class_name`. The registry
//! is filled at configuration time; a subtype is registered explicitly against
//! its parent type and inherits the parent's capabilities at that moment.

use std::collections::BTreeSet;

use crate::page::Page;

/// Built-in tag for the tree-local "file not found" page.
pub const FILE_NOT_FOUND_PAGE: &str = "FileNotFoundPage";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTypeRegistry {
    not_found: BTreeSet<String>,
    virtual_types: BTreeSet<String>,
}

impl Default for PageTypeRegistry {
    fn default() -> Self {
        Self {
            not_found: BTreeSet::from([FILE_NOT_FOUND_PAGE.to_string()]),
            virtual_types: BTreeSet::new(),
        }
    }
}

impl PageTypeRegistry {
    /// A registry with no recognized types at all.
    pub fn empty() -> Self {
        Self {
            not_found: BTreeSet::new(),
            virtual_types: BTreeSet::new(),
        }
    }

    /// Build a registry from configured tag lists. Blank entries are skipped.
    pub fn from_names<N, V>(not_found: N, virtual_types: V) -> Self
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let mut registry = Self::empty();
        for name in not_found {
            registry.register_not_found_type(name.as_ref());
        }
        for name in virtual_types {
            registry.register_virtual_type(name.as_ref());
        }
        registry
    }

    pub fn register_not_found_type(&mut self, name: &str) -> &mut Self {
        let name = name.trim();
        if !name.is_empty() {
            self.not_found.insert(name.to_string());
        }
        self
    }

    pub fn register_virtual_type(&mut self, name: &str) -> &mut Self {
        let name = name.trim();
        if !name.is_empty() {
            self.virtual_types.insert(name.to_string());
        }
        self
    }

    /// Register `subtype` as a descendant of `parent`, copying whichever
    /// capabilities `parent` currently has.
    pub fn register_subtype(&mut self, subtype: &str, parent: &str) -> &mut Self {
        if self.not_found.contains(parent) {
            self.register_not_found_type(subtype);
        }
        if self.virtual_types.contains(parent) {
            self.register_virtual_type(subtype);
        }
        self
    }

    pub fn is_not_found_type(&self, class_name: Option<&str>) -> bool {
        class_name.is_some_and(|c| self.not_found.contains(c))
    }

    pub fn is_not_found_page(&self, page: &Page) -> bool {
        self.is_not_found_type(page.class_name.as_deref())
    }

    /// A page is virtual if its own flag says so or its type is registered virtual.
    pub fn is_virtual(&self, page: &Page) -> bool {
        page.virtual_page
            || page
                .class_name
                .as_deref()
                .is_some_and(|c| self.virtual_types.contains(c))
    }

    pub fn not_found_types(&self) -> impl Iterator<Item = &str> {
        self.not_found.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::fixtures::page;

    #[test]
    fn default_knows_file_not_found_page() {
        let reg = PageTypeRegistry::default();
        assert!(reg.is_not_found_type(Some(FILE_NOT_FOUND_PAGE)));
        assert!(!reg.is_not_found_type(Some("ArchivePage")));
        assert!(!reg.is_not_found_type(None));
    }

    #[test]
    fn subtypes_inherit_not_found_capability() {
        let mut reg = PageTypeRegistry::default();
        reg.register_subtype("CustomMissingPage", FILE_NOT_FOUND_PAGE)
            .register_subtype("PlainPage", "Page");
        assert!(reg.is_not_found_type(Some("CustomMissingPage")));
        assert!(!reg.is_not_found_type(Some("PlainPage")));
    }

    #[test]
    fn virtual_by_flag_or_type() {
        let reg = PageTypeRegistry::from_names([FILE_NOT_FOUND_PAGE], ["LayoutPage"]);
        let mut p = page(1, None, "");
        assert!(!reg.is_virtual(&p));
        p.class_name = Some("LayoutPage".into());
        assert!(reg.is_virtual(&p));
        p.class_name = None;
        p.virtual_page = true;
        assert!(reg.is_virtual(&p));
    }

    #[test]
    fn from_names_skips_blank_entries() {
        let reg = PageTypeRegistry::from_names(["", "  ", "Missing"], Vec::<String>::new());
        assert_eq!(reg.not_found_types().collect::<Vec<_>>(), ["Missing"]);
    }
}
