//! Persistent database errors.

use thiserror::Error;

/// Errors that can occur when interacting with the database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An error occurred when interacting with the sled database.
    #[error("driver: {0}")]
    Driver(#[from] sled::Error),

    /// An error occurred when encoding or decoding a stored value.
    #[error("codec: {0}")]
    Codec(#[from] bincode::Error),

    /// A stored entry does not match its key.
    #[error("data: {0}")]
    InvalidData(String),
}
