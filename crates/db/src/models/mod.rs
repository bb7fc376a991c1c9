//! Row structs for the page tables.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! the conversion into the corresponding `folio_core` domain value.

pub mod page;
pub mod page_part;
pub mod page_version;
