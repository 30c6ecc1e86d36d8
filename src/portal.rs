//! Account directory, course catalog and enrollment transactions.
//!
//! The [`Portal`] type is the entry point for every user action. It owns the
//! three record tables and shares a [`LockCoordinator`] that serializes
//! access to them.
//!
//! # Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |                            Portal                                |
//! |                                                                  |
//! |  directory        catalog            enrollment                  |
//! |  (login, accounts) (add/remove course) (enroll/unenroll)         |
//! |        |                |                    |                   |
//! |        +-------+--------+---------+----------+                   |
//! |                |                  |                              |
//! |        Arc<LockCoordinator>   Table<Student/Faculty/Admin, S>    |
//! +------------------------------------------------------------------+
//!                                    |
//!                                    v
//!                         +----------------------+
//!                         | storage::RecordStorage |
//!                         |   (Memory / File)    |
//!                         +----------------------+
//! ```
//!
//! Courses are not stored on their own: each lives inside the record of the
//! faculty member offering it, and lookups by name scan the faculty table.

mod catalog;
mod directory;
mod enrollment;
mod error;
mod lock;
mod reply;

pub use catalog::{CourseEnrollment, CourseListing, CourseRemoval, EnrolledStudent};
pub use directory::{CredentialUpdate, Identity, Role};
pub use error::{ErrorKind, PortalError};
pub use lock::{CourseScope, FacultyScope, LockCoordinator, StudentScope};
pub use reply::{Reply, Status};

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::record::codec::check_text;
use crate::record::{AdminCredential, Faculty, Student};
use crate::storage::{FileStorage, FixedRecord, MemoryStorage, RecordId, RecordStorage, Table};

/// File names of the three record stores inside the data directory.
pub const STUDENTS_FILE: &str = "students.dat";
pub const FACULTY_FILE: &str = "faculty.dat";
pub const ADMIN_FILE: &str = "admin.dat";

/// The three storage backends a portal is built from.
pub struct Stores<S> {
    pub students: S,
    pub faculty: S,
    pub admin: S,
}

/// Shared state behind every user action.
pub struct Portal<S: RecordStorage> {
    students: Table<Student, S>,
    faculty: Table<Faculty, S>,
    admin: Table<AdminCredential, S>,
    locks: Arc<LockCoordinator>,
}

impl<S: RecordStorage> Portal<S> {
    /// Opens a portal over `stores` with a private lock coordinator.
    ///
    /// If the admin store is empty, `default_admin` is written to it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a store's record size does not match its layout
    /// - `default_admin` does not fit the credential fields
    /// - storage I/O fails
    pub async fn open(stores: Stores<S>, default_admin: AdminCredential) -> Result<Self, PortalError> {
        Self::with_locks(stores, default_admin, Arc::new(LockCoordinator::new())).await
    }

    /// Opens a portal that coordinates through an existing `locks`.
    pub async fn with_locks(
        stores: Stores<S>,
        default_admin: AdminCredential,
        locks: Arc<LockCoordinator>,
    ) -> Result<Self, PortalError> {
        let portal = Self {
            students: Table::new(stores.students)?,
            faculty: Table::new(stores.faculty)?,
            admin: Table::new(stores.admin)?,
            locks,
        };

        if portal.admin.is_empty().await {
            validate_text("admin username", &default_admin.username)?;
            validate_text("admin password", &default_admin.password)?;
            portal.admin.append(move |_| default_admin).await?;
            info!("initialized admin credentials");
        }

        Ok(portal)
    }

    /// Returns the student table.
    pub fn students(&self) -> &Table<Student, S> {
        &self.students
    }

    /// Forces all three stores to stable storage.
    pub async fn sync_all(&self) -> Result<(), PortalError> {
        self.students.storage().sync_all().await?;
        self.faculty.storage().sync_all().await?;
        self.admin.storage().sync_all().await?;
        Ok(())
    }

    async fn read_student(&self, id: RecordId) -> Result<Student, PortalError> {
        self.students
            .read_at(id)
            .await
            .map_err(PortalError::for_student(id))
    }

    async fn read_faculty(&self, id: RecordId) -> Result<Faculty, PortalError> {
        self.faculty
            .read_at(id)
            .await
            .map_err(PortalError::for_faculty(id))
    }
}

impl Portal<FileStorage> {
    /// Opens (creating if needed) the record files inside `dir`.
    pub async fn open_dir(
        dir: impl AsRef<Path>,
        default_admin: AdminCredential,
    ) -> Result<Self, PortalError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PortalError::Storage(e.into()))?;

        let stores = Stores {
            students: FileStorage::open(dir.join(STUDENTS_FILE), Student::SIZE).await?,
            faculty: FileStorage::open(dir.join(FACULTY_FILE), Faculty::SIZE).await?,
            admin: FileStorage::open(dir.join(ADMIN_FILE), AdminCredential::SIZE).await?,
        };
        info!(dir = %dir.display(), "opened data directory");

        Self::open(stores, default_admin).await
    }
}

impl Portal<MemoryStorage> {
    /// Opens a portal backed by in-memory stores.
    pub async fn in_memory(default_admin: AdminCredential) -> Result<Self, PortalError> {
        let stores = Stores {
            students: MemoryStorage::new(Student::SIZE),
            faculty: MemoryStorage::new(Faculty::SIZE),
            admin: MemoryStorage::new(AdminCredential::SIZE),
        };
        Self::open(stores, default_admin).await
    }
}

/// Reads the record at `id`, applies `edit`, and writes it back in place.
///
/// The caller must hold whatever scope serializes writers of `table`. If
/// `edit` fails nothing is written.
pub(crate) async fn edit_record<T, S, M, E>(
    table: &Table<T, S>,
    id: RecordId,
    missing: M,
    edit: E,
) -> Result<T, PortalError>
where
    T: FixedRecord + Send + Sync,
    S: RecordStorage,
    M: FnOnce(crate::storage::StorageError) -> PortalError + Send,
    E: FnOnce(&mut T) -> Result<(), PortalError> + Send,
{
    let mut record = table.read_at(id).await.map_err(missing)?;
    edit(&mut record)?;
    table.write_at(id, &record).await?;
    Ok(record)
}

/// Rejects text that cannot be stored in a fixed-width field.
pub(crate) fn validate_text(field: &'static str, value: &str) -> Result<(), PortalError> {
    check_text(field, value).map_err(|e| PortalError::InvalidInput(e.to_string()))
}

/// Like [`validate_text`], but also rejects the empty string.
pub(crate) fn validate_name(field: &'static str, value: &str) -> Result<(), PortalError> {
    if value.is_empty() {
        return Err(PortalError::InvalidInput(format!("{} must not be empty", field)));
    }
    validate_text(field, value)
}
