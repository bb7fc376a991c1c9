//! Database-layer errors and their mapping onto [`CoreError`].

use folio_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be turned into a domain value.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => core,
            DbError::Sqlx(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                CoreError::Conflict(format!(
                    "Duplicate value violates {}",
                    db.constraint().unwrap_or("a unique constraint")
                ))
            }
            DbError::Sqlx(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                CoreError::Validation(format!(
                    "Referenced row does not exist ({})",
                    db.constraint().unwrap_or("foreign key")
                ))
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                CoreError::Internal(other.to_string())
            }
        }
    }
}
