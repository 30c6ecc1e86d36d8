use bytes::{Buf, BufMut};

use super::bounded::{BoundedVec, CapacityError};
use super::codec::{TEXT_LEN, check_len, get_count, get_text, put_empty_text, put_text};
use super::{Account, MAX_COURSES};
use crate::storage::{FixedRecord, RecordId, StorageError};

/// A student account and the names of the courses it is enrolled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: RecordId,
    pub username: String,
    pub password: String,
    /// Deactivated students cannot log in. Their data is kept.
    pub active: bool,
    pub courses: BoundedVec<String, MAX_COURSES>,
}

impl Student {
    /// Creates an active student with no enrollments.
    pub fn new(id: RecordId, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            password: password.into(),
            active: true,
            courses: BoundedVec::new(),
        }
    }

    /// Whether `course` is on this student's list.
    pub fn is_enrolled(&self, course: &str) -> bool {
        self.courses.iter().any(|name| name == course)
    }

    /// Appends `course` to the list.
    pub fn add_course(&mut self, course: impl Into<String>) -> Result<(), CapacityError> {
        self.courses.try_push(course.into())
    }

    /// Removes the first occurrence of `course`. Returns whether it was present.
    pub fn drop_course(&mut self, course: &str) -> bool {
        self.courses.remove_first(|name| name == course).is_some()
    }
}

impl FixedRecord for Student {
    const SIZE: usize = 8 + TEXT_LEN * 2 + 1 + 4 + TEXT_LEN * MAX_COURSES;

    fn encode(&self, buf: &mut [u8]) -> Result<(), StorageError> {
        check_len(buf, Self::SIZE)?;
        let mut dst = buf;

        dst.put_u64_le(self.id.0);
        put_text(&mut dst, "username", &self.username)?;
        put_text(&mut dst, "password", &self.password)?;
        dst.put_u8(self.active as u8);
        dst.put_u32_le(self.courses.len() as u32);
        for name in &self.courses {
            put_text(&mut dst, "course", name)?;
        }
        for _ in self.courses.len()..MAX_COURSES {
            put_empty_text(&mut dst);
        }
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self, StorageError> {
        check_len(buf, Self::SIZE)?;
        let mut src = buf;

        let id = RecordId(src.get_u64_le());
        let username = get_text(&mut src, "username")?;
        let password = get_text(&mut src, "password")?;
        let active = src.get_u8() != 0;
        let count = get_count(&mut src, "courses", MAX_COURSES)?;

        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(get_text(&mut src, "course")?);
        }
        let courses = BoundedVec::from_vec(names)
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;

        Ok(Self {
            id,
            username,
            password,
            active,
            courses,
        })
    }
}

impl Account for Student {
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

    fn can_login(&self) -> bool {
        self.active
    }
}
