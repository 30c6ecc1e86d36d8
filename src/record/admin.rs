use super::Account;
use super::codec::{TEXT_LEN, check_len, get_text, put_text};
use crate::storage::{FixedRecord, StorageError};

/// The administrator login. Only the first record of the admin file is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
}

impl AdminCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl FixedRecord for AdminCredential {
    const SIZE: usize = TEXT_LEN * 2;

    fn encode(&self, buf: &mut [u8]) -> Result<(), StorageError> {
        check_len(buf, Self::SIZE)?;
        let mut dst = buf;
        put_text(&mut dst, "username", &self.username)?;
        put_text(&mut dst, "password", &self.password)
    }

    fn decode(buf: &[u8]) -> Result<Self, StorageError> {
        check_len(buf, Self::SIZE)?;
        let mut src = buf;
        Ok(Self {
            username: get_text(&mut src, "username")?,
            password: get_text(&mut src, "password")?,
        })
    }
}

impl Account for AdminCredential {
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
