//! Typed record tables.
//!
//! [`Table`] pairs a [`RecordStorage`] backend with a [`FixedRecord`] layout,
//! turning raw record I/O into append / point read / point overwrite / scan
//! over decoded values.

use std::marker::PhantomData;

use super::error::StorageError;
use super::io::RecordStorage;
use super::record_id::RecordId;
use super::scan::TableScan;

/// A value with a fixed-size on-disk encoding.
///
/// `encode` is always handed a zeroed buffer of exactly `SIZE` bytes and must
/// fill it completely or fail; `decode` receives the same `SIZE` bytes back.
pub trait FixedRecord: Sized {
    /// Encoded size in bytes. Changing it invalidates existing files.
    const SIZE: usize;

    /// Encodes this record into `buf`.
    fn encode(&self, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Decodes a record from `buf`.
    fn decode(buf: &[u8]) -> Result<Self, StorageError>;
}

/// A record file holding values of one [`FixedRecord`] type.
///
/// A table performs no locking of its own beyond what the backend does for a
/// single call. Read-modify-write sequences must be serialized by the caller.
pub struct Table<T, S> {
    storage: S,
    _record: PhantomData<fn() -> T>,
}

impl<T, S> Table<T, S>
where
    T: FixedRecord + Send + Sync,
    S: RecordStorage,
{
    /// Wraps a backend whose record size matches `T::SIZE`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupted` if the backend was opened with a
    /// different record size.
    pub fn new(storage: S) -> Result<Self, StorageError> {
        if storage.record_size() != T::SIZE {
            return Err(StorageError::Corrupted(format!(
                "record size mismatch: storage uses {}, layout needs {}",
                storage.record_size(),
                T::SIZE
            )));
        }
        Ok(Self {
            storage,
            _record: PhantomData,
        })
    }

    /// Returns the underlying backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the table and returns the backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Returns the number of records.
    pub async fn len(&self) -> u64 {
        self.storage.record_count().await
    }

    /// Returns true if the table holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Appends the record produced by `build` and returns its id.
    ///
    /// `build` receives the id the record is about to get, so records that
    /// carry their own id can embed it.
    pub async fn append<F>(&self, build: F) -> Result<RecordId, StorageError>
    where
        F: FnOnce(RecordId) -> T + Send,
    {
        self.storage
            .append_record(|id, buf| build(id).encode(buf))
            .await
    }

    /// Reads and decodes the record at `id`.
    pub async fn read_at(&self, id: RecordId) -> Result<T, StorageError> {
        let mut buf = vec![0u8; T::SIZE];
        self.storage.read_record(id, &mut buf).await?;
        T::decode(&buf)
    }

    /// Encodes `record` and overwrites the record at `id`.
    pub async fn write_at(&self, id: RecordId, record: &T) -> Result<(), StorageError> {
        let mut buf = vec![0u8; T::SIZE];
        record.encode(&mut buf)?;
        self.storage.write_record(id, &buf).await
    }

    /// Starts a scan from the first record.
    ///
    /// Every call returns a fresh cursor positioned at `RecordId(0)`.
    pub fn scan(&self) -> TableScan<'_, T, S> {
        TableScan::new(self)
    }
}
