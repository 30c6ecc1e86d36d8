//! Storage layer errors.

use thiserror::Error;

use crate::storage::RecordId;

/// Storage layer errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Record not found in storage.
    ///
    /// The identifier lies at or beyond the current record count. Records
    /// come into existence only through `append_record`.
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// Buffer passed to a record I/O call is not exactly one record long.
    #[error("invalid buffer size: expected {expected}, got {actual}")]
    InvalidBufferSize {
        /// Expected buffer size (the store's record size)
        expected: usize,
        /// Actual buffer size provided
        actual: usize,
    },

    /// I/O error from underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data corruption detected.
    ///
    /// The file size is not a whole number of records, or a record's
    /// contents cannot be decoded.
    #[error("data corruption: {0}")]
    Corrupted(String),

    /// A text value does not fit its fixed-width field.
    #[error("field `{field}` exceeds {max} bytes")]
    FieldTooLong {
        /// Field name
        field: &'static str,
        /// Width of the on-disk slot in bytes
        max: usize,
    },
}
