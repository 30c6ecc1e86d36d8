//! In-memory record storage implementation.

use parking_lot::Mutex;

use super::RecordStorage;
use crate::storage::error::StorageError;
use crate::storage::record_id::RecordId;

/// In-memory record storage for testing and development.
///
/// Stores records in a Vec; RecordIds are assigned sequentially as Vec
/// indices. All operations are synchronous but wrapped in async for trait
/// compatibility. Nothing survives a drop.
pub struct MemoryStorage {
    records: Mutex<Vec<Box<[u8]>>>,
    record_size: usize,
}

impl MemoryStorage {
    /// Creates a new empty in-memory storage of `record_size`-byte records.
    pub fn new(record_size: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            record_size,
        }
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
}

impl RecordStorage for MemoryStorage {
    fn record_size(&self) -> usize {
        self.record_size
    }

    async fn read_record(&self, id: RecordId, buf: &mut [u8]) -> Result<(), StorageError> {
        self.check_buffer(buf.len())?;

        let records = self.records.lock();
        let record = records
            .get(id.ordinal() as usize)
            .ok_or(StorageError::RecordNotFound(id))?;

        buf.copy_from_slice(record);
        Ok(())
    }

    async fn write_record(&self, id: RecordId, buf: &[u8]) -> Result<(), StorageError> {
        self.check_buffer(buf.len())?;

        let mut records = self.records.lock();
        let record = records
            .get_mut(id.ordinal() as usize)
            .ok_or(StorageError::RecordNotFound(id))?;

        record.copy_from_slice(buf);
        Ok(())
    }

    async fn append_record<F>(&self, fill: F) -> Result<RecordId, StorageError>
    where
        F: FnOnce(RecordId, &mut [u8]) -> Result<(), StorageError> + Send,
    {
        let mut records = self.records.lock();
        let id = RecordId::new(records.len() as u64);

        let mut buf = vec![0u8; self.record_size].into_boxed_slice();
        fill(id, &mut buf)?;
        records.push(buf);

        Ok(id)
    }

    async fn record_count(&self) -> u64 {
        self.records.lock().len() as u64
    }

    async fn sync_all(&self) -> Result<(), StorageError> {
        // No-op for in-memory storage
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_read() {
        let storage = MemoryStorage::new(8);
        let id = storage
            .append_record(|_, buf| {
                buf[7] = 9;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(id, RecordId(0));

        let mut buf = vec![0u8; 8];
        storage.read_record(id, &mut buf).await.unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0, 0, 0, 0, 9]);
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let storage = MemoryStorage::new(4);
        let id = storage.append_record(|_, _| Ok(())).await.unwrap();

        storage.write_record(id, &[1, 2, 3, 4]).await.unwrap();

        let mut buf = [0u8; 4];
        storage.read_record(id, &mut buf).await.unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_record_not_found() {
        let storage = MemoryStorage::new(4);
        let mut buf = [0u8; 4];
        let result = storage.read_record(RecordId::new(999), &mut buf).await;
        assert!(matches!(result, Err(StorageError::RecordNotFound(_))));
    }

    #[tokio::test]
    async fn test_record_count() {
        let storage = MemoryStorage::new(4);
        assert_eq!(storage.record_count().await, 0);

        storage.append_record(|_, _| Ok(())).await.unwrap();
        storage.append_record(|_, _| Ok(())).await.unwrap();
        assert_eq!(storage.record_count().await, 2);
    }
}
