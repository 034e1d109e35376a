use thiserror::Error;

use crate::persistent::errors::StorageError;

/// Errors returned by channel databases.
#[derive(Debug, Error)]
pub enum DbError {
    /// The persistent store failed.
    #[error("sled: {0}")]
    Storage(#[from] StorageError),
}

/// The result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
