//! User-facing replies.
//!
//! A [`Reply`] is what the session layer sends back after an operation: a
//! status plus the text to show, which is forwarded verbatim.

use std::fmt::{self, Write};

use tracing::error;

use super::catalog::{CourseEnrollment, CourseListing, CourseRemoval};
use super::error::{ErrorKind, PortalError};
use crate::record::Course;
use crate::storage::RecordId;

/// Result code of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure(ErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    pub message: String,
}

impl Reply {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }

    /// Builds a failure reply from `err`.
    ///
    /// Storage failures are logged and shown as `Failed to {action}` rather
    /// than with the underlying I/O details.
    pub fn failure(err: &PortalError, action: &str) -> Self {
        let kind = err.kind();
        let message = match err {
            PortalError::Storage(e) if kind == ErrorKind::Io => {
                error!(action, error = %e, "storage failure");
                format!("Failed to {}", action)
            }
            PortalError::CascadeIncomplete { source, .. }
            | PortalError::SeatRestoreFailed { source, .. } => {
                error!(action, error = %source, "partial update");
                err.to_string()
            }
            _ => err.to_string(),
        };
        Self {
            status: Status::Failure(kind),
            message,
        }
    }

    /// Builds a reply from an operation result, rendering success with `render`.
    pub fn from_result<T>(
        result: Result<T, PortalError>,
        action: &str,
        render: impl FnOnce(T) -> Reply,
    ) -> Self {
        match result {
            Ok(value) => render(value),
            Err(err) => Self::failure(&err, action),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Iterates the lines of the message.
    pub fn lines(&self) -> std::str::Lines<'_> {
        self.message.lines()
    }

    pub fn account_created(role_title: &str, id: RecordId) -> Self {
        Self::success(format!("{} added successfully with ID: {}", role_title, id))
    }

    pub fn status_toggled(active: bool) -> Self {
        let state = if active { "activated" } else { "deactivated" };
        Self::success(format!("Student {} successfully", state))
    }

    pub fn course_removed(removal: CourseRemoval) -> Self {
        Self::success(format!(
            "Course removed successfully ({} students unenrolled)",
            removal.students_updated
        ))
    }

    /// Listing shown before a student picks a course to enroll in.
    pub fn available_courses(listings: &[CourseListing]) -> Self {
        let mut out = String::from("Available Courses:\n");
        for listing in listings {
            let _ = writeln!(
                out,
                "- {} (Available seats: {})",
                listing.name, listing.seats_remaining
            );
        }
        Self::success(out)
    }

    /// Listing shown before a faculty member picks a course to remove.
    pub fn offered_courses(courses: &[Course]) -> Self {
        let mut out = String::from("Your offered courses:\n");
        if courses.is_empty() {
            out.push_str("No courses offered\n");
        }
        for course in courses {
            let _ = writeln!(out, "- {} (Seats: {})", course.name, course.seats_remaining);
        }
        Self::success(out)
    }

    /// Short listing shown before a student picks a course to drop.
    pub fn enrolled_list(courses: &[String]) -> Self {
        let mut out = String::from("Your enrolled courses:\n");
        if courses.is_empty() {
            out.push_str("No courses enrolled\n");
        }
        for name in courses {
            let _ = writeln!(out, "- {}", name);
        }
        Self::success(out)
    }

    /// The "View enrolled Courses" screen.
    pub fn enrolled_view(courses: &[String]) -> Self {
        let mut out = String::from("\n=== Your Enrolled Courses ===\n");
        if courses.is_empty() {
            out.push_str("You are not enrolled in any courses.\n");
        } else {
            let _ = writeln!(out, "Total courses enrolled: {}\n", courses.len());
            for (i, name) in courses.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", i + 1, name);
            }
        }
        Self::success(out)
    }

    /// The "View enrollments in Courses" screen.
    pub fn course_enrollments(enrollments: &[CourseEnrollment]) -> Self {
        let mut out = String::from("\n=== Course Enrollments ===\n");
        if enrollments.is_empty() {
            out.push_str("You have not offered any courses.\n");
            return Self::success(out);
        }

        for entry in enrollments {
            let course = &entry.course;
            let _ = write!(
                out,
                "\nCourse: {}\nEnrolled Students: {}/{}\n",
                course.name,
                course.enrolled(),
                course.seats_initial
            );
            if course.enrolled() > 0 {
                out.push_str("Students enrolled:\n");
                for student in &entry.students {
                    let _ = writeln!(out, "  - {} (ID: {})", student.username, student.id);
                }
            } else {
                out.push_str("No students enrolled yet.\n");
            }
            out.push_str("------------------------\n");
        }
        Self::success(out)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
