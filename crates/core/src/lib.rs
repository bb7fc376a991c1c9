//! Draft-aware page versioning: save routing, URL resolution, projections and
//! structural diffs over a page tree. Storage is reached through the
//! [`store`] traits; [`memory::MemoryStore`] is the in-process implementation.

pub mod current;
pub mod diff;
pub mod differ;
pub mod error;
pub mod memory;
pub mod page;
pub mod page_type;
pub mod resolver;
pub mod save;
pub mod status;
pub mod store;
pub mod tree;
pub mod types;
pub mod url;
pub mod version;
