//! Capacity-checked lists stored inside fixed-size records.

use thiserror::Error;

/// Returned when an append would exceed a list's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("list is full ({capacity} entries)")]
pub struct CapacityError {
    /// The list's fixed capacity.
    pub capacity: usize,
}

/// An ordered list with a hard upper bound of `CAP` entries.
///
/// Order is insertion order. Removing an entry shifts the later entries one
/// position left, preserving their relative order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedVec<T, const CAP: usize> {
    items: Vec<T>,
}

impl<T, const CAP: usize> BoundedVec<T, CAP> {
    /// The fixed capacity.
    pub const CAPACITY: usize = CAP;

    /// Creates an empty list.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Builds a list from `items`, failing if there are more than `CAP`.
    pub fn from_vec(items: Vec<T>) -> Result<Self, CapacityError> {
        if items.len() > CAP {
            return Err(CapacityError { capacity: CAP });
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= CAP
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Appends `item` at the end.
    ///
    /// # Errors
    ///
    /// Returns `CapacityError` (leaving the list unchanged) if it is full.
    pub fn try_push(&mut self, item: T) -> Result<(), CapacityError> {
        if self.is_full() {
            return Err(CapacityError { capacity: CAP });
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes and returns the first entry matching `pred`.
    pub fn remove_first(&mut self, pred: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.items.iter().position(pred)?;
        Some(self.items.remove(index))
    }

    /// Returns the first entry matching `pred`.
    pub fn find(&self, pred: impl FnMut(&&T) -> bool) -> Option<&T> {
        self.items.iter().find(pred)
    }

    /// Returns the first entry matching `pred`, mutably.
    pub fn find_mut(&mut self, pred: impl FnMut(&&mut T) -> bool) -> Option<&mut T> {
        self.items.iter_mut().find(pred)
    }
}

impl<T, const CAP: usize> Default for BoundedVec<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, const CAP: usize> IntoIterator for &'a BoundedVec<T, CAP> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
