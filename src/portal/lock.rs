//! Coarse store locks.
//!
//! Three async mutexes guard the record stores:
//!
//! - **course scope**: seat counters inside faculty records, and every
//!   read-modify-write of a faculty record
//! - **faculty scope**: the faculty store
//! - **student scope**: the student store
//!
//! Scopes are always acquired in the order course, faculty, student. The
//! guard types make the forward direction the easy one: a [`CourseScope`]
//! can take the faculty or student scope, while [`FacultyScope`] and
//! [`StudentScope`] take nothing. Faculty and student are never held
//! together. All guards release on drop, so `?` returns and cancelled
//! futures never leak a lock.

use tokio::sync::{Mutex, MutexGuard};

/// Owner of the three store locks.
///
/// Shared between the portal and anything else that must coordinate with it
/// via `Arc`.
#[derive(Debug, Default)]
pub struct LockCoordinator {
    course: Mutex<()>,
    faculty: Mutex<()>,
    student: Mutex<()>,
}

/// Held course scope.
#[must_use]
pub struct CourseScope<'a> {
    locks: &'a LockCoordinator,
    _guard: MutexGuard<'a, ()>,
}

/// Held faculty scope.
#[must_use]
pub struct FacultyScope<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// Held student scope.
#[must_use]
pub struct StudentScope<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl LockCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the course scope.
    pub async fn course(&self) -> CourseScope<'_> {
        CourseScope {
            locks: self,
            _guard: self.course.lock().await,
        }
    }

    /// Acquires the faculty scope.
    ///
    /// Must not be called while holding the student scope.
    pub async fn faculty(&self) -> FacultyScope<'_> {
        FacultyScope {
            _guard: self.faculty.lock().await,
        }
    }

    /// Acquires the student scope.
    pub async fn student(&self) -> StudentScope<'_> {
        StudentScope {
            _guard: self.student.lock().await,
        }
    }

    /// Acquires course scope, then student scope.
    pub async fn enrollment(&self) -> (CourseScope<'_>, StudentScope<'_>) {
        let course = self.course().await;
        let student = course.student().await;
        (course, student)
    }

    /// Acquires course scope, then faculty scope.
    pub async fn course_and_faculty(&self) -> (CourseScope<'_>, FacultyScope<'_>) {
        let course = self.course().await;
        let faculty = course.faculty().await;
        (course, faculty)
    }
}

impl<'a> CourseScope<'a> {
    /// Acquires the faculty scope while holding this one.
    pub async fn faculty(&self) -> FacultyScope<'a> {
        self.locks.faculty().await
    }

    /// Acquires the student scope while holding this one.
    pub async fn student(&self) -> StudentScope<'a> {
        self.locks.student().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_scopes_are_exclusive() {
        let locks = Arc::new(LockCoordinator::new());
        let held = locks.student().await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _scope = locks.student().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let locks = LockCoordinator::new();
        let (_course, _student) = locks.enrollment().await;
        // Faculty scope is free while course and student are held.
        let _faculty = locks.faculty().await;
    }

    #[tokio::test]
    async fn test_release_faculty_then_take_student() {
        let locks = LockCoordinator::new();
        let (course, faculty) = locks.course_and_faculty().await;
        drop(faculty);
        let _student = course.student().await;
        assert!(locks.faculty.try_lock().is_ok());
        assert!(locks.course.try_lock().is_err());
    }

    #[tokio::test]
    async fn test_guard_released_on_error_path() {
        let locks = LockCoordinator::new();

        async fn failing(locks: &LockCoordinator) -> Result<(), ()> {
            let _scope = locks.course().await;
            Err(())
        }

        assert!(failing(&locks).await.is_err());
        assert!(locks.course.try_lock().is_ok());
    }
}
