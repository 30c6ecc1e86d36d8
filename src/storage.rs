//! Storage layer for fixed-size record files.
//!
//! Every persistent entity (student, faculty, admin credential) lives in its
//! own file of contiguous, equally sized records. A record is addressed by a
//! dense, append-only [`RecordId`]; its physical location is
//! `id * record_size`. There is no header, checksum, or free list: records
//! are never removed, only rewritten in place.
//!
//! # Architecture
//!
//! ```text
//! +-------------------+
//! | Table<T, S>       |  <- typed append / read / write / scan
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! | RecordStorage     |  <- io
//! +-------------------+
//!       /      \
//!      v        v
//! +--------------+ +-------------+
//! | MemoryStorage| | FileStorage |
//! +--------------+ +-------------+
//! ```

pub mod error;
pub mod io;
pub mod record_id;
pub mod scan;
pub mod table;

pub use error::StorageError;
pub use io::{FileStorage, MemoryStorage, RecordStorage};
pub use record_id::RecordId;
pub use scan::TableScan;
pub use table::{FixedRecord, Table};
