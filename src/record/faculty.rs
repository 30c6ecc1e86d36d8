use bytes::{Buf, BufMut};

use super::bounded::{BoundedVec, CapacityError};
use super::codec::{TEXT_LEN, check_len, get_count, get_text, put_empty_text, put_text};
use super::{Account, MAX_COURSES};
use crate::storage::{FixedRecord, RecordId, StorageError};

/// One course offering with its seat counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub name: String,
    pub seats_remaining: u32,
    pub seats_initial: u32,
}

impl Course {
    /// Encoded size of one course slot.
    const SLOT_SIZE: usize = TEXT_LEN + 4 + 4;

    /// Creates a course with every seat open.
    pub fn new(name: impl Into<String>, seats: u32) -> Self {
        Self {
            name: name.into(),
            seats_remaining: seats,
            seats_initial: seats,
        }
    }

    /// Number of seats currently taken.
    pub fn enrolled(&self) -> u32 {
        self.seats_initial.saturating_sub(self.seats_remaining)
    }

    pub fn has_open_seat(&self) -> bool {
        self.seats_remaining > 0
    }

    /// Takes one seat. Returns false if none is left.
    pub fn take_seat(&mut self) -> bool {
        if self.seats_remaining == 0 {
            return false;
        }
        self.seats_remaining -= 1;
        true
    }

    /// Gives one seat back, never exceeding the initial count.
    pub fn release_seat(&mut self) -> bool {
        if self.seats_remaining >= self.seats_initial {
            return false;
        }
        self.seats_remaining += 1;
        true
    }

    fn encode_slot(&self, dst: &mut impl BufMut) -> Result<(), StorageError> {
        put_text(dst, "course", &self.name)?;
        dst.put_u32_le(self.seats_remaining);
        dst.put_u32_le(self.seats_initial);
        Ok(())
    }

    fn decode_slot(src: &mut impl Buf) -> Result<Self, StorageError> {
        let name = get_text(src, "course")?;
        let seats_remaining = src.get_u32_le();
        let seats_initial = src.get_u32_le();
        if seats_remaining > seats_initial {
            return Err(StorageError::Corrupted(format!(
                "course `{}` has {} seats remaining of {}",
                name, seats_remaining, seats_initial
            )));
        }
        Ok(Self {
            name,
            seats_remaining,
            seats_initial,
        })
    }
}

/// A faculty account and the courses it offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faculty {
    pub id: RecordId,
    pub username: String,
    pub password: String,
    pub courses: BoundedVec<Course, MAX_COURSES>,
}

impl Faculty {
    /// Creates a faculty member with no courses.
    pub fn new(id: RecordId, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            password: password.into(),
            courses: BoundedVec::new(),
        }
    }

    /// Returns the first offered course named `name`.
    pub fn course(&self, name: &str) -> Option<&Course> {
        self.courses.find(|course| course.name == name)
    }

    /// Returns the first offered course named `name`, mutably.
    pub fn course_mut(&mut self, name: &str) -> Option<&mut Course> {
        self.courses.find_mut(|course| course.name == name)
    }

    pub fn offers(&self, name: &str) -> bool {
        self.course(name).is_some()
    }

    /// Appends a course offering.
    pub fn add_course(&mut self, course: Course) -> Result<(), CapacityError> {
        self.courses.try_push(course)
    }

    /// Removes and returns the first course named `name`.
    pub fn withdraw_course(&mut self, name: &str) -> Option<Course> {
        self.courses.remove_first(|course| course.name == name)
    }
}

impl FixedRecord for Faculty {
    const SIZE: usize = 8 + TEXT_LEN * 2 + 4 + Course::SLOT_SIZE * MAX_COURSES;

    fn encode(&self, buf: &mut [u8]) -> Result<(), StorageError> {
        check_len(buf, Self::SIZE)?;
        let mut dst = buf;

        dst.put_u64_le(self.id.0);
        put_text(&mut dst, "username", &self.username)?;
        put_text(&mut dst, "password", &self.password)?;
        dst.put_u32_le(self.courses.len() as u32);
        for course in &self.courses {
            course.encode_slot(&mut dst)?;
        }
        for _ in self.courses.len()..MAX_COURSES {
            put_empty_text(&mut dst);
            dst.put_bytes(0, 8);
        }
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self, StorageError> {
        check_len(buf, Self::SIZE)?;
        let mut src = buf;

        let id = RecordId(src.get_u64_le());
        let username = get_text(&mut src, "username")?;
        let password = get_text(&mut src, "password")?;
        let count = get_count(&mut src, "courses", MAX_COURSES)?;

        let mut offered = Vec::with_capacity(count);
        for _ in 0..count {
            offered.push(Course::decode_slot(&mut src)?);
        }
        let courses = BoundedVec::from_vec(offered)
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;

        Ok(Self {
            id,
            username,
            password,
            courses,
        })
    }
}

impl Account for Faculty {
    fn username(&self) -> &str {
        &self.username
    }

    fn password(&self) -> &str {
        &self.password
    }

    fn set_username(&mut self, username: String) {
        self.username = username;
    }

    fn set_password(&mut self, password: String) {
        self.password = password;
    }
}
