//! Sequential table scanner.
//!
//! [`TableScan`] walks a [`Table`] from `RecordId(0)` upward and yields every
//! record with its id. The record count is re-read on every step, so records
//! appended while a scan is in progress are visited as well.

use super::error::StorageError;
use super::io::RecordStorage;
use super::record_id::RecordId;
use super::table::{FixedRecord, Table};

/// Async cursor over all records of a table, in ascending id order.
pub struct TableScan<'a, T, S> {
    table: &'a Table<T, S>,
    next_id: RecordId,
}

impl<'a, T, S> TableScan<'a, T, S>
where
    T: FixedRecord + Send + Sync,
    S: RecordStorage,
{
    /// Creates a new scanner positioned at the first record.
    pub fn new(table: &'a Table<T, S>) -> Self {
        Self {
            table,
            next_id: RecordId::new(0),
        }
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` once the id passes the end of the table.
    pub async fn next_record(&mut self) -> Result<Option<(RecordId, T)>, StorageError> {
        if self.next_id.ordinal() >= self.table.len().await {
            return Ok(None);
        }

        let id = self.next_id;
        let record = self.table.read_at(id).await?;
        self.next_id = id.next();

        Ok(Some((id, record)))
    }

    /// Collects all remaining records.
    ///
    /// NOTE: This loads the rest of the table into memory. Lookups that can
    /// stop early should drive `next_record()` directly.
    pub async fn collect_all(&mut self) -> Result<Vec<(RecordId, T)>, StorageError> {
        let mut all = Vec::new();
        while let Some(entry) = self.next_record().await? {
            all.push(entry);
        }
        Ok(all)
    }
}
