use std::ops::Index;
use std::slice;
use thiserror::Error;

/// Rejected `insert_at`: the index was outside `0..=len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} out of bounds for list of length {len}")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

/// Owned, ordered sequence of values.
///
/// Pieces, add-log fragments and undo actions all live in one of these. Values
/// are dropped together with the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedList<T> {
    items: Vec<T>,
}

impl<T> OrderedList<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Insert `value` before the element currently at `index`.
    ///
    /// `index == len` appends. On success the new element is returned so the
    /// caller can keep adjusting it in place.
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<&mut T, IndexError> {
        let len = self.items.len();
        if index > len {
            return Err(IndexError { index, len });
        }
        self.items.insert(index, value);
        Ok(&mut self.items[index])
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Drop every element at position `len` and beyond.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.items.retain(f);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for OrderedList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
