//! Fixed-width field helpers shared by the record layouts.

use bytes::{Buf, BufMut};

use crate::storage::StorageError;

/// Width in bytes of every text slot (usernames, passwords, course names).
pub const TEXT_LEN: usize = 50;

/// Returns an error if `value` cannot be stored in a text slot.
///
/// Values must fit in [`TEXT_LEN`] bytes of UTF-8 and must not contain NUL,
/// which terminates the slot on decode.
pub fn check_text(field: &'static str, value: &str) -> Result<(), StorageError> {
    if value.len() > TEXT_LEN {
        return Err(StorageError::FieldTooLong {
            field,
            max: TEXT_LEN,
        });
    }
    if value.as_bytes().contains(&0) {
        return Err(StorageError::Corrupted(format!(
            "field `{}` contains a NUL byte",
            field
        )));
    }
    Ok(())
}

/// Writes `value` into a NUL-padded text slot.
pub fn put_text(dst: &mut impl BufMut, field: &'static str, value: &str) -> Result<(), StorageError> {
    check_text(field, value)?;
    dst.put_slice(value.as_bytes());
    dst.put_bytes(0, TEXT_LEN - value.len());
    Ok(())
}

/// Writes an all-zero text slot.
pub fn put_empty_text(dst: &mut impl BufMut) {
    dst.put_bytes(0, TEXT_LEN);
}

/// Reads a text slot, stopping at the first NUL.
pub fn get_text(src: &mut impl Buf, field: &'static str) -> Result<String, StorageError> {
    let mut raw = [0u8; TEXT_LEN];
    src.copy_to_slice(&mut raw);

    let end = raw.iter().position(|&b| b == 0).unwrap_or(TEXT_LEN);
    String::from_utf8(raw[..end].to_vec())
        .map_err(|_| StorageError::Corrupted(format!("field `{}` is not valid UTF-8", field)))
}

/// Reads a list length and checks it against the list capacity.
pub fn get_count(src: &mut impl Buf, field: &'static str, capacity: usize) -> Result<usize, StorageError> {
    let count = src.get_u32_le() as usize;
    if count > capacity {
        return Err(StorageError::Corrupted(format!(
            "`{}` count {} exceeds capacity {}",
            field, count, capacity
        )));
    }
    Ok(count)
}

/// Fails unless `buf` is exactly `size` bytes.
pub fn check_len(buf: &[u8], size: usize) -> Result<(), StorageError> {
    if buf.len() != size {
        return Err(StorageError::InvalidBufferSize {
            expected: size,
            actual: buf.len(),
        });
    }
    Ok(())
}
