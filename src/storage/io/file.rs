//! File-backed record storage.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{File as TokioFile, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use super::RecordStorage;
use crate::storage::error::StorageError;
use crate::storage::record_id::RecordId;

/// File-backed record storage.
///
/// Stores records as contiguous fixed-size blocks in a single file.
/// Uses `tokio::fs` for async file I/O.
///
/// # File Layout
///
/// ```text
/// +------------------+------------------+------------------+
/// | Record 0         | Record 1         | Record 2         | ...
/// +------------------+------------------+------------------+
/// ^ offset 0         ^ offset size      ^ offset 2*size
/// ```
///
/// # Concurrency
///
/// Uses a `tokio::Mutex` around the file handle to serialize I/O operations,
/// so two writers to the same record never interleave partial writes.
///
/// # Durability
///
/// Every append and overwrite is followed by `sync_data()` before the call
/// returns. Nothing beyond that is promised: a crash between two related
/// writes leaves both files as they were after the last completed write.
pub struct FileStorage {
    /// Path to the record file
    path: PathBuf,
    /// File handle wrapped in async mutex for serialized access
    file: Mutex<TokioFile>,
    /// Size of one record in bytes
    record_size: usize,
    /// Number of records currently in the file
    record_count: AtomicU64,
}

impl FileStorage {
    /// Opens or creates a record file at the given path.
    ///
    /// If the file exists, its record count is calculated from file size.
    /// If the file doesn't exist, it is created empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupted` if the file size is not a multiple
    /// of `record_size`.
    pub async fn open(path: impl Into<PathBuf>, record_size: usize) -> Result<Self, StorageError> {
        let path = path.into();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await?;

        let metadata = file.metadata().await?;
        let file_size = metadata.len();

        if record_size == 0 || file_size % record_size as u64 != 0 {
            return Err(StorageError::Corrupted(format!(
                "file size {} of {} is not a multiple of record size {}",
                file_size,
                path.display(),
                record_size
            )));
        }

        let record_count = file_size / record_size as u64;

        Ok(Self {
            path,
            file: Mutex::new(file),
            record_size,
            record_count: AtomicU64::new(record_count),
        })
    }

    /// Returns the path to the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_buffer(&self, len: usize) -> Result<(), StorageError> {
        if len != self.record_size {
            return Err(StorageError::InvalidBufferSize {
                expected: self.record_size,
                actual: len,
            });
        }
        Ok(())
    }

    fn check_id(&self, id: RecordId) -> Result<(), StorageError> {
        if id.ordinal() >= self.record_count.load(Ordering::Acquire) {
            return Err(StorageError::RecordNotFound(id));
        }
        Ok(())
    }
}

impl RecordStorage for FileStorage {
    fn record_size(&self) -> usize {
        self.record_size
    }

    async fn read_record(&self, id: RecordId, buf: &mut [u8]) -> Result<(), StorageError> {
        self.check_buffer(buf.len())?;
        self.check_id(id)?;

        let mut file = self.file.lock().await;
        file.seek(std::io::SeekFrom::Start(id.byte_offset(self.record_size)))
            .await?;
        // A short read surfaces as UnexpectedEof.
        file.read_exact(buf).await?;

        Ok(())
    }

    async fn write_record(&self, id: RecordId, buf: &[u8]) -> Result<(), StorageError> {
        self.check_buffer(buf.len())?;
        self.check_id(id)?;

        let mut file = self.file.lock().await;
        file.seek(std::io::SeekFrom::Start(id.byte_offset(self.record_size)))
            .await?;
        file.write_all(buf).await?;
        file.sync_data().await?;

        Ok(())
    }

    async fn append_record<F>(&self, fill: F) -> Result<RecordId, StorageError>
    where
        F: FnOnce(RecordId, &mut [u8]) -> Result<(), StorageError> + Send,
    {
        let mut file = self.file.lock().await;

        let ordinal = self.record_count.load(Ordering::Acquire);
        let id = RecordId::new(ordinal);

        let mut buf = vec![0u8; self.record_size];
        fill(id, &mut buf)?;

        file.seek(std::io::SeekFrom::Start(id.byte_offset(self.record_size)))
            .await?;
        file.write_all(&buf).await?;
        file.sync_data().await?;

        self.record_count.store(ordinal + 1, Ordering::Release);

        Ok(id)
    }

    async fn record_count(&self) -> u64 {
        self.record_count.load(Ordering::Acquire)
    }

    async fn sync_all(&self) -> Result<(), StorageError> {
        let file = self.file.lock().await;
        file.sync_all().await?;
        Ok(())
    }
}
