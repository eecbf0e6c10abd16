use thiserror::Error;

/// Errors produced by the moderation store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error, including failed commits.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database lock poisoned: {0}")]
    LockPoisoned(String),

    /// The blocking worker running the query panicked or was cancelled.
    #[error("Database worker failed: {0}")]
    Worker(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
