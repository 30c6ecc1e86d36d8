//! Course catalog operations.
//!
//! Courses live inside faculty records. Name lookups scan the faculty table
//! in id order.

use tracing::{info, warn};

use super::error::PortalError;
use super::{Portal, edit_record, validate_name};
use crate::record::{Course, MAX_SEATS};
use crate::storage::{RecordId, RecordStorage};

/// A course as listed to students choosing what to enroll in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListing {
    pub faculty_id: RecordId,
    pub name: String,
    pub seats_remaining: u32,
    pub seats_initial: u32,
}

/// Result of withdrawing a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseRemoval {
    /// Number of student records the course was retracted from.
    pub students_updated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrolledStudent {
    pub id: RecordId,
    pub username: String,
}

/// One offered course together with the students enrolled in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseEnrollment {
    pub course: Course,
    pub students: Vec<EnrolledStudent>,
}

impl<S: RecordStorage> Portal<S> {
    /// Returns true if any faculty member offers a course named `name`.
    pub async fn course_exists(&self, name: &str) -> Result<bool, PortalError> {
        let _scope = self.locks.faculty().await;

        let mut scan = self.faculty.scan();
        while let Some((_, faculty)) = scan.next_record().await? {
            if faculty.offers(name) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Adds a course with `seats` seats to a faculty member's offerings.
    ///
    /// The duplicate check runs before the mutation locks are taken, so two
    /// concurrent adds of the same name can both succeed.
    pub async fn add_course(
        &self,
        faculty_id: RecordId,
        name: &str,
        seats: i64,
    ) -> Result<(), PortalError> {
        validate_name("course name", name)?;
        let seats = match u32::try_from(seats) {
            Ok(n) if n > 0 && n <= MAX_SEATS => n,
            _ => return Err(PortalError::InvalidSeatCount(seats)),
        };

        if self.course_exists(name).await? {
            return Err(PortalError::DuplicateCourse(name.to_owned()));
        }

        let (_course, _faculty) = self.locks.course_and_faculty().await;
        edit_record(
            &self.faculty,
            faculty_id,
            PortalError::for_faculty(faculty_id),
            |faculty| {
                faculty.add_course(Course::new(name, seats))?;
                Ok(())
            },
        )
        .await?;

        info!(faculty_id = %faculty_id, course = name, seats, "course added");
        Ok(())
    }

    /// Withdraws a course and retracts it from every student enrolled in it.
    ///
    /// The faculty record is persisted first. The student cascade then runs
    /// under the student scope while the course scope is still held, so no
    /// enrollment into the withdrawn course can slip in between.
    pub async fn remove_course(
        &self,
        faculty_id: RecordId,
        name: &str,
    ) -> Result<CourseRemoval, PortalError> {
        let (course_scope, faculty_scope) = self.locks.course_and_faculty().await;
        edit_record(
            &self.faculty,
            faculty_id,
            PortalError::for_faculty(faculty_id),
            |faculty| {
                faculty
                    .withdraw_course(name)
                    .map(drop)
                    .ok_or_else(|| PortalError::CourseNotOffered(name.to_owned()))
            },
        )
        .await?;
        drop(faculty_scope);

        let _students = course_scope.student().await;
        let students_updated = self.retract_course(name).await.map_err(|source| {
            warn!(course = name, error = %source, "course cascade incomplete");
            PortalError::CascadeIncomplete {
                course: name.to_owned(),
                source,
            }
        })?;

        info!(
            faculty_id = %faculty_id,
            course = name,
            students_updated,
            "course removed"
        );
        Ok(CourseRemoval { students_updated })
    }

    /// Removes `name` from every student list containing it. Caller holds the
    /// student scope.
    async fn retract_course(&self, name: &str) -> Result<usize, crate::storage::StorageError> {
        let mut updated = 0;
        let mut scan = self.students.scan();
        while let Some((id, mut student)) = scan.next_record().await? {
            if student.drop_course(name) {
                self.students.write_at(id, &student).await?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Returns the courses offered by a faculty member, in list order.
    pub async fn offered_courses(&self, faculty_id: RecordId) -> Result<Vec<Course>, PortalError> {
        let _scope = self.locks.faculty().await;
        let faculty = self.read_faculty(faculty_id).await?;
        Ok(faculty.courses.iter().cloned().collect())
    }

    /// Returns every course with at least one open seat, in faculty id order.
    pub async fn available_courses(&self) -> Result<Vec<CourseListing>, PortalError> {
        let _scope = self.locks.course().await;

        let mut listings = Vec::new();
        let mut scan = self.faculty.scan();
        while let Some((faculty_id, faculty)) = scan.next_record().await? {
            listings.extend(
                faculty
                    .courses
                    .iter()
                    .filter(|course| course.has_open_seat())
                    .map(|course| CourseListing {
                        faculty_id,
                        name: course.name.clone(),
                        seats_remaining: course.seats_remaining,
                        seats_initial: course.seats_initial,
                    }),
            );
        }
        Ok(listings)
    }

    /// Returns each offered course with the students enrolled in it.
    ///
    /// The faculty record is read under the faculty scope, which is released
    /// before the student table is scanned.
    pub async fn course_enrollments(
        &self,
        faculty_id: RecordId,
    ) -> Result<Vec<CourseEnrollment>, PortalError> {
        let faculty = {
            let _scope = self.locks.faculty().await;
            self.read_faculty(faculty_id).await?
        };

        let mut enrollments: Vec<CourseEnrollment> = faculty
            .courses
            .iter()
            .map(|course| CourseEnrollment {
                course: course.clone(),
                students: Vec::new(),
            })
            .collect();

        if enrollments.iter().any(|e| e.course.enrolled() > 0) {
            let _scope = self.locks.student().await;
            let mut scan = self.students.scan();
            while let Some((id, student)) = scan.next_record().await? {
                for entry in enrollments.iter_mut() {
                    if student.is_enrolled(&entry.course.name) {
                        entry.students.push(EnrolledStudent {
                            id,
                            username: student.username.clone(),
                        });
                    }
                }
            }
        }

        Ok(enrollments)
    }
}
