//! Record identifiers.

use std::fmt;

/// Identifier of a record within one record file.
///
/// Identifiers form a dense, append-only space: the first record appended to
/// an empty store is `RecordId(0)`, the next `RecordId(1)`, and so on. They
/// are never reused or compacted, so an id handed out at account creation
/// stays valid for the lifetime of the file.
///
/// The mapping to a physical location lives in [`byte_offset`](Self::byte_offset)
/// and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Creates a new RecordId from its ordinal.
    pub const fn new(ordinal: u64) -> Self {
        Self(ordinal)
    }

    /// Returns the ordinal.
    pub const fn ordinal(&self) -> u64 {
        self.0
    }

    /// Returns the id that follows this one.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Calculates the byte offset of this record in a file of
    /// `record_size`-byte records.
    pub const fn byte_offset(&self, record_size: usize) -> u64 {
        self.0 * record_size as u64
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_byte_offset() {
        assert_eq!(RecordId::new(0).byte_offset(100), 0);
        assert_eq!(RecordId::new(1).byte_offset(100), 100);
        assert_eq!(RecordId::new(7).byte_offset(2609), 18263);
    }

    #[test]
    fn test_record_id_ordering() {
        assert!(RecordId::new(0) < RecordId::new(1));
        assert_eq!(RecordId::new(3).next(), RecordId::new(4));
        assert_eq!(RecordId::new(42).to_string(), "42");
    }
}
