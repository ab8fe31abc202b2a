//! Pure operations over keyed, ordered entity lists.
//!
//! All functions return a fresh vector and leave the input untouched;
//! relative order of unaffected elements is preserved.

use crate::models::{Comment, Community, Question, User};

/// Entities addressable by a unique key within a list.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Question {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Comment {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Community {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Prepend an entity. Callers are responsible for not inserting a key that
/// is already present.
pub fn insert_front<T: Clone>(list: &[T], item: T) -> Vec<T> {
    let mut updated = Vec::with_capacity(list.len() + 1);
    updated.push(item);
    updated.extend_from_slice(list);
    updated
}

/// Replace the first entity with the same key, keeping its position. When
/// the key is absent and `insert_if_missing` is set, the entity is
/// prepended; otherwise the list is returned unchanged.
pub fn upsert<T: Keyed + Clone>(list: &[T], item: T, insert_if_missing: bool) -> Vec<T> {
    let mut updated = list.to_vec();

    match updated.iter().position(|e| e.key() == item.key()) {
        Some(index) => updated[index] = item,
        None => {
            if insert_if_missing {
                updated.insert(0, item);
            }
        }
    }

    updated
}

/// Remove the first entity with the same key; no-op when absent.
pub fn remove_by_key<T: Keyed + Clone>(list: &[T], item: &T) -> Vec<T> {
    let mut updated = list.to_vec();

    if let Some(index) = updated.iter().position(|e| e.key() == item.key()) {
        updated.remove(index);
    }

    updated
}
