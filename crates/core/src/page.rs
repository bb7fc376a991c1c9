//! Page and page-part domain model, plus slug/title validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::Status;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum allowed length for a page title.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum allowed length for a page slug.
pub const MAX_SLUG_LENGTH: usize = 100;

/// Maximum allowed length for a part name.
pub const MAX_PART_NAME_LENGTH: usize = 100;

/// Name of the part rendered when a page has no layout.
pub const DEFAULT_PART: &str = "body";

// ---------------------------------------------------------------------------
// Page parts
// ---------------------------------------------------------------------------

/// A named content block belonging to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePart {
    pub name: String,
    pub filter_id: Option<String>,
    pub content: String,
}

impl PagePart {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter_id: None,
            content: content.into(),
        }
    }

    /// The comparable attribute set used by the differ and by snapshots.
    pub fn attributes(&self) -> PartAttributes {
        PartAttributes {
            name: self.name.clone(),
            filter_id: self.filter_id.clone(),
            content: self.content.clone(),
        }
    }
}

/// The comparable attributes of a part. Storage identity and timestamps are
/// not part of this set, so two parts with equal attributes are "unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartAttributes {
    pub name: String,
    pub filter_id: Option<String>,
    pub content: String,
}

impl From<PartAttributes> for PagePart {
    fn from(attrs: PartAttributes) -> Self {
        Self {
            name: attrs.name,
            filter_id: attrs.filter_id,
            content: attrs.content,
        }
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// A node in the page tree.
///
/// The parent owns the child list (via `parent_id` + `position` on the child
/// rows); a child only holds the parent's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub position: i32,
    pub title: String,
    pub slug: String,
    pub breadcrumb: Option<String>,
    /// Page-type tag, checked against the [`PageTypeRegistry`](crate::page_type::PageTypeRegistry).
    pub class_name: Option<String>,
    pub status: Status,
    pub layout_id: Option<DbId>,
    pub virtual_page: bool,
    pub versioned: bool,
    /// Optimistic-locking column. Owned by the store; the core only compares it.
    pub lock_version: i32,
    pub published_at: Option<Timestamp>,
    pub parts: Vec<PagePart>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Page {
    /// An unsaved, versioned draft page with no parts.
    pub fn new(parent_id: Option<DbId>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: 0,
            parent_id,
            position: 0,
            title: title.into(),
            slug: slug.into(),
            breadcrumb: None,
            class_name: None,
            status: Status::Draft,
            layout_id: None,
            virtual_page: false,
            versioned: true,
            lock_version: 0,
            published_at: None,
            parts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find a part by name.
    pub fn part(&self, name: &str) -> Option<&PagePart> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Insert or replace the part with the same name, keeping stored order.
    pub fn set_part(&mut self, part: PagePart) {
        match self.parts.iter_mut().find(|p| p.name == part.name) {
            Some(existing) => *existing = part,
            None => self.parts.push(part),
        }
    }

    /// Remove a part by name. Returns the removed part, if any.
    pub fn remove_part(&mut self, name: &str) -> Option<PagePart> {
        let idx = self.parts.iter().position(|p| p.name == name)?;
        Some(self.parts.remove(idx))
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }

    /// Run every field validator that applies to this page.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.title)?;
        if self.is_root() {
            validate_root_slug(&self.slug)?;
        } else {
            validate_slug(&self.slug)?;
        }
        validate_parts(&self.parts)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a page title (non-empty, <= [`MAX_TITLE_LENGTH`] chars).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate the slug of a non-root page.
///
/// A slug is a single path segment: non-empty, no `/`, no whitespace, and not
/// one of the relative segments `.` or `..`.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if slug.chars().count() > MAX_SLUG_LENGTH {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LENGTH} characters"
        )));
    }
    if slug == "." || slug == ".." {
        return Err(CoreError::Validation(format!("Slug '{slug}' is reserved")));
    }
    if slug.chars().any(|c| c == '/' || c.is_whitespace() || c.is_control()) {
        return Err(CoreError::Validation(
            "Slug must not contain '/', whitespace or control characters".into(),
        ));
    }
    Ok(())
}

/// Validate the slug of the root page, which may only be `""` or `"/"`.
pub fn validate_root_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug == "/" {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Root page slug must be empty or '/', got '{slug}'"
        )))
    }
}

/// Validate a part collection: non-empty names within bounds, unique per page.
pub fn validate_parts(parts: &[PagePart]) -> Result<(), CoreError> {
    for (idx, part) in parts.iter().enumerate() {
        if part.name.trim().is_empty() {
            return Err(CoreError::Validation("Part name must not be empty".into()));
        }
        if part.name.chars().count() > MAX_PART_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Part name must be at most {MAX_PART_NAME_LENGTH} characters"
            )));
        }
        if parts[..idx].iter().any(|p| p.name == part.name) {
            return Err(CoreError::Validation(format!(
                "Duplicate part name '{}'",
                part.name
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::fixtures::page;
    use super::*;

    #[test]
    fn set_part_replaces_in_place() {
        let mut p = page(1, None, "");
        p.set_part(PagePart::new("sidebar", "S"));
        p.set_part(PagePart::new("body", "B2"));
        let names: Vec<_> = p.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["body", "sidebar"]);
        assert_eq!(p.part("body").unwrap().content, "B2");
    }

    #[test]
    fn remove_part_returns_removed() {
        let mut p = page(1, None, "");
        assert!(p.remove_part("missing").is_none());
        assert_eq!(p.remove_part("body").unwrap().name, "body");
        assert!(p.parts.is_empty());
    }

    #[test]
    fn slug_valid() {
        assert!(validate_slug("about-us").is_ok());
        assert!(validate_slug("v2.0").is_ok());
    }

    #[test]
    fn slug_rejects_separators_and_relative_segments() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("a/b").is_err());
        assert!(validate_slug("a b").is_err());
        assert!(validate_slug("..").is_err());
    }

    #[test]
    fn root_slug_only_empty_or_slash() {
        assert!(validate_root_slug("").is_ok());
        assert!(validate_root_slug("/").is_ok());
        assert!(validate_root_slug("home").is_err());
    }

    #[test]
    fn title_bounds() {
        assert!(validate_title("Home").is_ok());
        assert!(validate_title("  ").is_err());
        assert!(validate_title(&"t".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn length_limits_count_characters_not_bytes() {
        assert!(validate_title(&"é".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title(&"é".repeat(MAX_TITLE_LENGTH + 1)).is_err());
        assert!(validate_slug(&"ü".repeat(MAX_SLUG_LENGTH)).is_ok());
        assert!(validate_slug(&"ü".repeat(MAX_SLUG_LENGTH + 1)).is_err());
        assert!(validate_parts(&[PagePart::new("ö".repeat(MAX_PART_NAME_LENGTH), "")]).is_ok());
    }

    #[test]
    fn validate_picks_slug_rule_by_position() {
        assert!(page(1, None, "").validate().is_ok());
        assert!(page(1, None, "home").validate().is_err());
        assert!(page(2, Some(1), "").validate().is_err());
        assert!(page(2, Some(1), "about").validate().is_ok());
    }

    #[test]
    fn parts_must_have_unique_names() {
        let parts = vec![PagePart::new("body", "a"), PagePart::new("body", "b")];
        assert!(validate_parts(&parts).is_err());
        let parts = vec![PagePart::new("body", "a"), PagePart::new("extended", "b")];
        assert!(validate_parts(&parts).is_ok());
    }
}
