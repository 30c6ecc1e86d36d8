//! Record I/O backend implementations.
//!
//! This module provides the `RecordStorage` trait for fixed-size record I/O,
//! along with MemoryStorage and FileStorage implementations.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use super::record_id::RecordId;
use crate::storage::error::StorageError;

/// Record I/O backend trait.
///
/// Reads and writes whole records of a fixed size using caller-owned
/// buffers. Implementations include:
/// - `io::MemoryStorage`: In-memory storage for tests
/// - `io::FileStorage`: Disk-backed storage using tokio::fs
///
/// # Design Decisions
///
/// 1. **Async trait**: Uses `async fn` (Rust 1.75+) for compatibility with tokio.
///
/// 2. **Whole records only**: Every read and write covers exactly
///    `record_size()` bytes. Partial-record writes are never issued.
///
/// 3. **Append assigns the id**: `append_record()` chooses the new id (the
///    current record count) and lets the caller fill the record's bytes with
///    that id before anything reaches the file. Id assignment and the write
///    happen under one internal lock.
///
/// 4. **No caching**: This layer does not cache records.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Sync + Send). Individual calls are
/// serialized internally; multi-call read-modify-write sequences must be
/// guarded by the caller.
pub trait RecordStorage: Send + Sync {
    /// Returns the size in bytes of one record.
    fn record_size(&self) -> usize;

    /// Reads a record into caller-provided buffer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::RecordNotFound` if `id` is beyond the last record.
    /// Returns `StorageError::InvalidBufferSize` if `buf.len() != record_size()`.
    fn read_record(
        &self,
        id: RecordId,
        buf: &mut [u8],
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Overwrites an existing record from caller-provided buffer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::RecordNotFound` if `id` is beyond the last record.
    /// Returns `StorageError::InvalidBufferSize` if `buf.len() != record_size()`.
    fn write_record(
        &self,
        id: RecordId,
        buf: &[u8],
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Appends a new record and returns its id.
    ///
    /// `fill` receives the id the record will have and a zeroed buffer of
    /// `record_size()` bytes to encode into. If `fill` fails, nothing is
    /// written and the record count is unchanged.
    fn append_record<F>(
        &self,
        fill: F,
    ) -> impl std::future::Future<Output = Result<RecordId, StorageError>> + Send
    where
        F: FnOnce(RecordId, &mut [u8]) -> Result<(), StorageError> + Send;

    /// Returns the number of records in the store.
    fn record_count(&self) -> impl std::future::Future<Output = u64> + Send;

    /// Syncs all pending writes to physical disk (fsync).
    ///
    /// For io::MemoryStorage, this is a no-op.
    fn sync_all(&self) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
