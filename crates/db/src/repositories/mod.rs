//! Repository layer.
//!
//! Each repository is a zero-sized struct whose functions take
//! `&mut PgConnection`, so reads and writes alike run inside the caller's
//! transaction.

pub mod page_part_repo;
pub mod page_repo;
pub mod page_version_repo;

pub use page_part_repo::PagePartRepo;
pub use page_repo::PageRepo;
pub use page_version_repo::PageVersionRepo;
