//! Structural diff of two page states: flat fields plus the part collection.
//!
//! Flat fields are compared by a pluggable [`FieldDiffer`]. Parts are matched
//! by name and compared by full attribute equality, so a renamed part shows up
//! as one deletion plus one addition.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::diff::DiffStatus;
use crate::page::{Page, PartAttributes};

// ---------------------------------------------------------------------------
// Flat fields
// ---------------------------------------------------------------------------

/// Old and new value of one changed flat field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// Produces the map of changed scalar fields between two page records.
pub trait FieldDiffer {
    fn diff_fields(&self, old: &Page, new: &Page) -> BTreeMap<String, FieldChange>;
}

/// A page field the default differ knows how to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedField {
    Title,
    Slug,
    Breadcrumb,
    LayoutId,
    ClassName,
    Status,
}

impl TrackedField {
    pub const ALL: &'static [TrackedField] = &[
        TrackedField::Title,
        TrackedField::Slug,
        TrackedField::Breadcrumb,
        TrackedField::LayoutId,
        TrackedField::ClassName,
        TrackedField::Status,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TrackedField::Title => "title",
            TrackedField::Slug => "slug",
            TrackedField::Breadcrumb => "breadcrumb",
            TrackedField::LayoutId => "layout_id",
            TrackedField::ClassName => "class_name",
            TrackedField::Status => "status",
        }
    }

    fn value(self, page: &Page) -> Value {
        match self {
            TrackedField::Title => Value::from(page.title.as_str()),
            TrackedField::Slug => Value::from(page.slug.as_str()),
            TrackedField::Breadcrumb => Value::from(page.breadcrumb.clone()),
            TrackedField::LayoutId => Value::from(page.layout_id),
            TrackedField::ClassName => Value::from(page.class_name.clone()),
            TrackedField::Status => Value::from(page.status.as_str()),
        }
    }
}

/// Compares a fixed list of [`TrackedField`]s.
#[derive(Debug, Clone)]
pub struct TrackedFieldDiffer {
    fields: Vec<TrackedField>,
}

impl TrackedFieldDiffer {
    pub fn new(fields: impl IntoIterator<Item = TrackedField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }
}

impl Default for TrackedFieldDiffer {
    fn default() -> Self {
        Self::new(TrackedField::ALL.iter().copied())
    }
}

impl FieldDiffer for TrackedFieldDiffer {
    fn diff_fields(&self, old: &Page, new: &Page) -> BTreeMap<String, FieldChange> {
        self.fields
            .iter()
            .filter_map(|field| {
                let (old, new) = (field.value(old), field.value(new));
                (old != new).then(|| (field.name().to_string(), FieldChange { old, new }))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// One entry of the part diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartDiffEntry {
    Baseline { part: PartAttributes },
    Unchanged { part: PartAttributes },
    Added { new: PartAttributes },
    Changed { old: PartAttributes, new: PartAttributes },
    Deleted { old: PartAttributes },
}

impl PartDiffEntry {
    pub fn status(&self) -> DiffStatus {
        match self {
            PartDiffEntry::Baseline { .. } => DiffStatus::Baseline,
            PartDiffEntry::Unchanged { .. } => DiffStatus::Unchanged,
            PartDiffEntry::Added { .. } => DiffStatus::Added,
            PartDiffEntry::Changed { .. } => DiffStatus::Changed,
            PartDiffEntry::Deleted { .. } => DiffStatus::Deleted,
        }
    }

    /// Name of the part this entry describes.
    pub fn name(&self) -> &str {
        match self {
            PartDiffEntry::Baseline { part } | PartDiffEntry::Unchanged { part } => &part.name,
            PartDiffEntry::Added { new } | PartDiffEntry::Changed { new, .. } => &new.name,
            PartDiffEntry::Deleted { old } => &old.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Page diff
// ---------------------------------------------------------------------------

/// Field changes and part entries between two page states.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageDiff {
    pub fields: BTreeMap<String, FieldChange>,
    pub parts: Vec<PartDiffEntry>,
}

impl PageDiff {
    /// Number of part entries with the given status.
    pub fn count(&self, status: DiffStatus) -> usize {
        self.parts.iter().filter(|e| e.status() == status).count()
    }

    /// True when neither fields nor parts differ.
    pub fn is_unchanged(&self) -> bool {
        self.fields.is_empty() && !self.parts.iter().any(|e| e.status().is_change())
    }
}

/// Diff `old` against `new`.
///
/// Without `new` every part of `old` is listed as a baseline entry and no
/// field changes are reported. With `new`, parts are walked in `new`'s stored
/// order, followed by the parts of `old` that no longer exist.
pub fn diff_pages<D>(old: &Page, new: Option<&Page>, differ: &D) -> PageDiff
where
    D: FieldDiffer + ?Sized,
{
    let Some(new) = new else {
        return PageDiff {
            fields: BTreeMap::new(),
            parts: old
                .parts
                .iter()
                .map(|p| PartDiffEntry::Baseline {
                    part: p.attributes(),
                })
                .collect(),
        };
    };

    let mut parts = Vec::with_capacity(new.parts.len());
    for part in &new.parts {
        let attrs = part.attributes();
        let entry = match old.part(&part.name) {
            None => PartDiffEntry::Added { new: attrs },
            Some(prev) if prev.attributes() == attrs => PartDiffEntry::Unchanged { part: attrs },
            Some(prev) => PartDiffEntry::Changed {
                old: prev.attributes(),
                new: attrs,
            },
        };
        parts.push(entry);
    }
    parts.extend(
        old.parts
            .iter()
            .filter(|p| new.part(&p.name).is_none())
            .map(|p| PartDiffEntry::Deleted {
                old: p.attributes(),
            }),
    );

    PageDiff {
        fields: differ.diff_fields(old, new),
        parts,
    }
}
