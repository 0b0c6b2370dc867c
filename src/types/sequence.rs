//! Arrays with a per-field emptiness policy.
//!
//! Some protocol arrays must always appear (`"setVariableResult":[]` is a
//! schema violation only if the key is missing), others are dropped from the
//! object when empty. The policy is part of the field's type, so a schema
//! cannot change it at runtime.

use core::ops::{Deref, DerefMut};

/// Ordered list of `T`. With `OMIT_EMPTY = true` an empty sequence is left
/// out of the encoded object and a missing key decodes as empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence<T, const OMIT_EMPTY: bool>(Vec<T>);

/// Empty sequence is omitted; key is optional on input.
pub type OmitEmpty<T> = Sequence<T, true>;

/// Empty sequence is written as `[]`; key is required on input.
pub type AlwaysEmit<T> = Sequence<T, false>;

impl<T, const OMIT_EMPTY: bool> Sequence<T, OMIT_EMPTY> {
    pub const OMIT_WHEN_EMPTY: bool = OMIT_EMPTY;

    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T, const OMIT_EMPTY: bool> Default for Sequence<T, OMIT_EMPTY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const OMIT_EMPTY: bool> Deref for Sequence<T, OMIT_EMPTY> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T, const OMIT_EMPTY: bool> DerefMut for Sequence<T, OMIT_EMPTY> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

impl<T, const OMIT_EMPTY: bool> From<Vec<T>> for Sequence<T, OMIT_EMPTY> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T, const OMIT_EMPTY: bool> FromIterator<T> for Sequence<T, OMIT_EMPTY> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, T, const OMIT_EMPTY: bool> IntoIterator for &'a Sequence<T, OMIT_EMPTY> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
