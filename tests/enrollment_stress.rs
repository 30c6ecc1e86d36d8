//! Enrollment stress test with many concurrent students.
//!
//! Checks that seat accounting stays exact under contention:
//! - Oversubscribed courses hand out exactly as many seats as they have
//! - Mixed enroll/unenroll churn never loses or duplicates a seat
//! - The number of students listing a course always matches the seats taken

use std::sync::Arc;

use academia::portal::{Portal, PortalError, Role};
use academia::record::AdminCredential;
use academia::storage::{MemoryStorage, RecordId, RecordStorage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;

async fn memory_portal() -> Portal<MemoryStorage> {
    Portal::in_memory(AdminCredential::new("admin", "admin123"))
        .await
        .unwrap()
}

async fn setup<S: RecordStorage>(
    portal: Portal<S>,
    students: usize,
) -> (Arc<Portal<S>>, RecordId, Vec<RecordId>) {
    let prof = portal.create_account(Role::Faculty, "prof", "pw").await.unwrap();

    let mut ids = Vec::with_capacity(students);
    for i in 0..students {
        ids.push(
            portal
                .create_account(Role::Student, &format!("student{}", i), "pw")
                .await
                .unwrap(),
        );
    }
    (Arc::new(portal), prof, ids)
}

async fn students_enrolled_in<S: RecordStorage>(
    portal: &Portal<S>,
    ids: &[RecordId],
    course: &str,
) -> u32 {
    let mut count = 0;
    for &id in ids {
        if portal.enrolled_courses(id).await.unwrap().iter().any(|c| c == course) {
            count += 1;
        }
    }
    count
}

/// Races `students` enrollments for a course with `seats` seats and checks
/// that exactly `seats` of them win.
async fn run_oversubscription<S: RecordStorage + 'static>(
    portal: Portal<S>,
    students: usize,
    seats: i64,
) {
    let (portal, prof, mut ids) = setup(portal, students).await;
    portal.add_course(prof, "CS101", seats).await.unwrap();

    ids.shuffle(&mut StdRng::seed_from_u64(42));

    let mut handles = Vec::new();
    for &id in &ids {
        let portal = portal.clone();
        handles.push(tokio::spawn(async move { portal.enroll(id, "CS101").await }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => succeeded += 1,
            Err(PortalError::CourseUnavailable(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(succeeded, seats);
    let course = &portal.offered_courses(prof).await.unwrap()[0];
    assert_eq!(course.seats_remaining, 0);
    assert_eq!(students_enrolled_in(&portal, &ids, "CS101").await, seats as u32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_oversubscribed_course_fills_exactly() {
    run_oversubscription(memory_portal().await, 40, 10).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_oversubscribed_course_fills_exactly_on_disk() {
    let dir = tempdir().unwrap();
    let portal = Portal::open_dir(dir.path(), AdminCredential::new("admin", "admin123"))
        .await
        .unwrap();
    run_oversubscription(portal, 24, 7).await;

    // The on-disk state agrees after a reopen.
    let portal = Portal::open_dir(dir.path(), AdminCredential::new("admin", "admin123"))
        .await
        .unwrap();
    let course = &portal.offered_courses(RecordId::new(0)).await.unwrap()[0];
    assert_eq!(course.seats_remaining, 0);
    assert_eq!(portal.students().len().await, 24);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_enroll_unenroll_churn_conserves_seats() {
    const STUDENTS: usize = 16;
    const OPS_PER_STUDENT: usize = 30;
    const COURSES: [&str; 3] = ["CS101", "MA201", "PH301"];

    let (portal, prof, ids) = setup(memory_portal().await, STUDENTS).await;
    for course in COURSES {
        portal.add_course(prof, course, 5).await.unwrap();
    }

    let mut handles = Vec::new();
    for (worker, &id) in ids.iter().enumerate() {
        let portal = portal.clone();
        handles.push(tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(worker as u64);
            for _ in 0..OPS_PER_STUDENT {
                let course = COURSES[rng.gen_range(0..COURSES.len())];
                let result = if rng.gen_bool(0.6) {
                    portal.enroll(id, course).await
                } else {
                    portal.unenroll(id, course).await
                };
                match result {
                    Ok(())
                    | Err(PortalError::CourseUnavailable(_))
                    | Err(PortalError::AlreadyEnrolled(_))
                    | Err(PortalError::CourseNotEnrolled(_)) => {}
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    for course in portal.offered_courses(prof).await.unwrap() {
        let enrolled = students_enrolled_in(&portal, &ids, &course.name).await;
        assert_eq!(
            course.seats_remaining + enrolled,
            course.seats_initial,
            "seat accounting broken for {}",
            course.name
        );
    }
}
