//! Enrollment transactions.
//!
//! Enrolling moves one seat from a course (inside a faculty record) onto a
//! student's course list; unenrolling moves it back. Both run under the
//! course scope and then the student scope. The two record writes are not
//! atomic with respect to a crash.

use tracing::{info, warn};

use super::error::PortalError;
use super::{Portal, edit_record};
use crate::record::{CapacityError, Faculty, MAX_COURSES};
use crate::storage::{RecordId, RecordStorage, StorageError};

impl<S: RecordStorage> Portal<S> {
    /// Enrolls a student in the course named `course`.
    ///
    /// # Errors
    ///
    /// - `AlreadyEnrolled` if the course is already on the student's list
    /// - `CapacityExceeded` if the student's list is full
    /// - `CourseUnavailable` if no course of that name has a free seat
    /// - `StudentNotFound` if the id does not exist
    ///
    /// Nothing is written in any of these cases.
    pub async fn enroll(&self, student_id: RecordId, course: &str) -> Result<(), PortalError> {
        let (_course, _student) = self.locks.enrollment().await;

        let mut student = self.read_student(student_id).await?;
        if student.is_enrolled(course) {
            return Err(PortalError::AlreadyEnrolled(course.to_owned()));
        }
        if student.courses.is_full() {
            return Err(CapacityError {
                capacity: MAX_COURSES,
            }
            .into());
        }

        let (faculty_id, mut faculty) = self
            .find_open_course(course)
            .await?
            .ok_or_else(|| PortalError::CourseUnavailable(course.to_owned()))?;
        if let Some(offered) = faculty.course_mut(course) {
            offered.take_seat();
        }
        self.faculty.write_at(faculty_id, &faculty).await?;

        student.add_course(course)?;
        self.students.write_at(student_id, &student).await?;

        info!(student_id = %student_id, faculty_id = %faculty_id, course, "enrolled");
        Ok(())
    }

    /// Removes a course from a student's list and gives the seat back.
    ///
    /// The student record is written first. The seat goes to the first
    /// offering of that name with a seat taken. If the course no longer
    /// exists there is no seat to restore and the call still succeeds.
    pub async fn unenroll(&self, student_id: RecordId, course: &str) -> Result<(), PortalError> {
        let (_course, _student) = self.locks.enrollment().await;

        edit_record(
            &self.students,
            student_id,
            PortalError::for_student(student_id),
            |student| {
                if student.drop_course(course) {
                    Ok(())
                } else {
                    Err(PortalError::CourseNotEnrolled(course.to_owned()))
                }
            },
        )
        .await?;

        let restored = self.restore_seat(course).await.map_err(|source| {
            warn!(student_id = %student_id, course, error = %source, "seat not restored");
            PortalError::SeatRestoreFailed {
                course: course.to_owned(),
                source,
            }
        })?;
        if restored.is_none() {
            warn!(course, "no offered course had room for the returned seat");
        }

        info!(student_id = %student_id, course, "unenrolled");
        Ok(())
    }

    /// Returns the names on a student's course list, in enrollment order.
    pub async fn enrolled_courses(&self, student_id: RecordId) -> Result<Vec<String>, PortalError> {
        let _scope = self.locks.student().await;
        let student = self.read_student(student_id).await?;
        Ok(student.courses.iter().cloned().collect())
    }

    /// Finds the first faculty record offering `course` with a free seat.
    /// Caller holds the course scope.
    async fn find_open_course(
        &self,
        course: &str,
    ) -> Result<Option<(RecordId, Faculty)>, StorageError> {
        let mut scan = self.faculty.scan();
        while let Some((id, faculty)) = scan.next_record().await? {
            if faculty
                .courses
                .iter()
                .any(|offered| offered.name == course && offered.has_open_seat())
            {
                return Ok(Some((id, faculty)));
            }
        }
        Ok(None)
    }

    /// Gives one seat of `course` back to the first offering of that name
    /// that has a seat taken. Caller holds the course scope. Returns the
    /// faculty id the seat went to, or `None` if no offering had room.
    async fn restore_seat(&self, course: &str) -> Result<Option<RecordId>, StorageError> {
        let mut scan = self.faculty.scan();
        while let Some((id, mut faculty)) = scan.next_record().await? {
            let released = faculty
                .course_mut(course)
                .is_some_and(|offered| offered.release_seat());
            if released {
                self.faculty.write_at(id, &faculty).await?;
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}
