//! Portal-level errors.

use thiserror::Error;

use crate::record::CapacityError;
use crate::storage::{RecordId, StorageError};

/// Coarse classification of a [`PortalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Duplicate,
    InvalidInput,
    CapacityExceeded,
    AuthFailed,
    Io,
}

/// Outcome of a portal operation that did not succeed.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Student not found")]
    StudentNotFound(RecordId),

    #[error("Faculty not found")]
    FacultyNotFound(RecordId),

    /// The faculty member does not offer a course with this name.
    #[error("Course not found in your offered courses")]
    CourseNotOffered(String),

    /// No course with this name has a free seat (or none exists at all).
    #[error("Course not found or no seats available")]
    CourseUnavailable(String),

    #[error("Course not found in your enrolled courses")]
    CourseNotEnrolled(String),

    #[error("Course already exists")]
    DuplicateCourse(String),

    #[error("Already enrolled in this course")]
    AlreadyEnrolled(String),

    #[error("Invalid number of seats")]
    InvalidSeatCount(i64),

    #[error("New passwords do not match")]
    PasswordMismatch,

    #[error("Incorrect old password")]
    WrongOldPassword,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Maximum courses limit reached")]
    CapacityExceeded(#[from] CapacityError),

    #[error("Login failed")]
    AuthFailed,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The course was withdrawn but the student cascade did not finish.
    #[error("Course removed, but warning: failed to update student enrollments")]
    CascadeIncomplete {
        course: String,
        #[source]
        source: StorageError,
    },

    /// The student was unenrolled but the seat was not given back.
    #[error("Warning: Failed to update course seats")]
    SeatRestoreFailed {
        course: String,
        #[source]
        source: StorageError,
    },
}

impl PortalError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortalError::StudentNotFound(_)
            | PortalError::FacultyNotFound(_)
            | PortalError::CourseNotOffered(_)
            | PortalError::CourseUnavailable(_)
            | PortalError::CourseNotEnrolled(_) => ErrorKind::NotFound,
            PortalError::DuplicateCourse(_) | PortalError::AlreadyEnrolled(_) => {
                ErrorKind::Duplicate
            }
            PortalError::InvalidSeatCount(_)
            | PortalError::PasswordMismatch
            | PortalError::WrongOldPassword
            | PortalError::InvalidInput(_) => ErrorKind::InvalidInput,
            PortalError::CapacityExceeded(_) => ErrorKind::CapacityExceeded,
            PortalError::AuthFailed => ErrorKind::AuthFailed,
            PortalError::Storage(StorageError::FieldTooLong { .. }) => ErrorKind::InvalidInput,
            PortalError::Storage(_)
            | PortalError::CascadeIncomplete { .. }
            | PortalError::SeatRestoreFailed { .. } => ErrorKind::Io,
        }
    }

    /// Maps a missing-record error for a student id to `StudentNotFound`.
    pub(crate) fn for_student(id: RecordId) -> impl FnOnce(StorageError) -> PortalError {
        move |e| match e {
            StorageError::RecordNotFound(_) => PortalError::StudentNotFound(id),
            other => PortalError::Storage(other),
        }
    }

    /// Maps a missing-record error for a faculty id to `FacultyNotFound`.
    pub(crate) fn for_faculty(id: RecordId) -> impl FnOnce(StorageError) -> PortalError {
        move |e| match e {
            StorageError::RecordNotFound(_) => PortalError::FacultyNotFound(id),
            other => PortalError::Storage(other),
        }
    }
}
