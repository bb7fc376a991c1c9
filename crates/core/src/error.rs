use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The optimistic-locking column no longer matches what the caller loaded.
    #[error("Concurrent edit detected on page {page_id} (expected lock version {expected})")]
    ConcurrencyConflict { page_id: DbId, expected: i32 },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
