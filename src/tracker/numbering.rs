//! Numbered storage for one kind of conversation.

use std::collections::HashMap;

use crate::storage::{StorageError, StorageResult};

/// items keyed by number, plus the sequence for auto-numbering
///
/// Auto-assigned numbers start at 1 and only grow. An explicit number moves
/// the sequence past it, so a later auto-assigned number never collides.
#[derive(Debug, Clone)]
pub(crate) struct Numbered<T> {
    kind: &'static str,
    items: HashMap<u64, T>,
    last: u64,
}

impl<T> Numbered<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: HashMap::new(),
            last: 0,
        }
    }

    /// store a new item under `number`, or under the next sequence value
    /// when `number` is absent or zero
    pub fn insert(&mut self, number: Option<u64>, make: impl FnOnce(u64) -> T) -> StorageResult<&T> {
        let number = match number.filter(|n| *n != 0) {
            Some(n) if self.items.contains_key(&n) => {
                return Err(StorageError::duplicate(self.kind, n));
            }
            Some(n) => n,
            None => self
                .last
                .checked_add(1)
                .ok_or(StorageError::SequenceExhausted(self.kind))?,
        };
        self.last = self.last.max(number);
        Ok(self.items.entry(number).or_insert_with(|| make(number)))
    }

    pub fn get(&self, number: u64) -> StorageResult<&T> {
        self.items
            .get(&number)
            .ok_or_else(|| StorageError::not_found(self.kind, number))
    }

    pub fn get_mut(&mut self, number: u64) -> StorageResult<&mut T> {
        let kind = self.kind;
        self.items
            .get_mut(&number)
            .ok_or_else(|| StorageError::not_found(kind, number))
    }

    /// all items in number order
    pub fn list(&self) -> Vec<&T> {
        let mut numbers: Vec<&u64> = self.items.keys().collect();
        numbers.sort();
        numbers.into_iter().map(|n| &self.items[n]).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
