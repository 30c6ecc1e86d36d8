//! On-disk record layouts.
//!
//! One fixed-size layout per role. All integers are little-endian, all text
//! fields occupy a NUL-padded slot of [`TEXT_LEN`] bytes, and list fields
//! always reserve room for their full capacity so every record of a type has
//! the same size.
//!
//! ```text
//! Student  : id u64 | username | password | active u8 | count u32 | course name x 50
//! Faculty  : id u64 | username | password | count u32 | (name | remaining u32 | initial u32) x 50
//! Admin    : username | password
//! ```

pub mod admin;
pub mod bounded;
pub mod codec;
pub mod faculty;
pub mod student;

pub use admin::AdminCredential;
pub use bounded::{BoundedVec, CapacityError};
pub use codec::TEXT_LEN;
pub use faculty::{Course, Faculty};
pub use student::Student;

use crate::storage::FixedRecord;

/// Maximum number of courses on one student's or one faculty member's list.
pub const MAX_COURSES: usize = 50;

/// Upper bound on the seat count of a single course.
pub const MAX_SEATS: u32 = 100;

/// A record that carries a login credential pair.
pub trait Account: FixedRecord {
    /// Returns the stored username.
    fn username(&self) -> &str;

    /// Returns the stored password.
    fn password(&self) -> &str;

    /// Replaces the username.
    fn set_username(&mut self, username: String);

    /// Replaces the password.
    fn set_password(&mut self, password: String);

    /// Whether this account may log in at all.
    fn can_login(&self) -> bool {
        true
    }

    /// Whether `username`/`password` identify this account for login.
    fn matches(&self, username: &str, password: &str) -> bool {
        self.can_login() && self.username() == username && self.password() == password
    }
}
