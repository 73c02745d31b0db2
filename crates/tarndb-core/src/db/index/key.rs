//! Module: index::key
//! Responsibility: semantic index-key vocabulary, canonical ordering, collation.
//! Does not own: pending-change navigation or durable entry layout.
//! Boundary: read entrypoints collate raw keys before touching any store.

use crate::MAX_COMPOSITE_KEY_PARTS;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, ops::Bound};
use thiserror::Error as ThisError;

///
/// CompositeKeyError
///
/// Invariant violations for composite key construction.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
pub enum CompositeKeyError {
    #[error("composite key has no parts")]
    Empty,

    #[error("composite key exceeds max parts: {parts} (limit {MAX_COMPOSITE_KEY_PARTS})")]
    TooManyParts { parts: usize },

    #[error("composite key part at index {index} is itself composite")]
    NestedComposite { index: usize },
}

///
/// Key
///
/// Semantic index-key value. Keys compare under a canonical total order:
/// variant rank first, then variant-specific comparison. Composites compare
/// lexicographically by parts, so a strict prefix orders before all of its
/// extensions.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Text(String),
    Composite(Vec<Key>),
}

impl Key {
    /// Build a validated composite key from scalar parts.
    pub fn composite<I>(parts: I) -> Result<Self, CompositeKeyError>
    where
        I: IntoIterator<Item = Self>,
    {
        let parts: Vec<Self> = parts.into_iter().collect();

        if parts.is_empty() {
            return Err(CompositeKeyError::Empty);
        }
        if parts.len() > MAX_COMPOSITE_KEY_PARTS {
            return Err(CompositeKeyError::TooManyParts { parts: parts.len() });
        }
        for (index, part) in parts.iter().enumerate() {
            if part.is_composite() {
                return Err(CompositeKeyError::NestedComposite { index });
            }
        }

        Ok(Self::Composite(parts))
    }

    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Number of composite parts; scalars count as one.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Composite(parts) => parts.len(),
            _ => 1,
        }
    }

    const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) => 1,
            Self::Uint(_) => 2,
            Self::Text(_) => 3,
            Self::Composite(_) => 4,
        }
    }

    /// True if `self` is a composite strict prefix of `other`.
    pub(crate) fn is_prefix_of(&self, other: &Self) -> bool {
        let (Self::Composite(prefix), Self::Composite(full)) = (self, other) else {
            return false;
        };

        prefix.len() < full.len() && full[..prefix.len()] == prefix[..]
    }

    /// True if this key names only a prefix of an index with `index_arity` fields.
    pub(crate) fn is_partial_for(&self, index_arity: usize) -> bool {
        match self {
            Self::Composite(parts) => parts.len() < index_arity,
            _ => false,
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = self.canonical_rank().cmp(&other.canonical_rank());
        if rank != Ordering::Equal {
            return rank;
        }

        #[allow(clippy::match_same_arms)]
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Uint(a), Self::Uint(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Composite(a), Self::Composite(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

///
/// Collation
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Collation {
    #[default]
    Cs, // case-sensitive
    Ci, // case-insensitive
}

impl Collation {
    /// Normalize a key under this collation.
    #[must_use]
    pub fn apply(self, key: Key) -> Key {
        match self {
            Self::Cs => key,
            Self::Ci => fold_case(key),
        }
    }
}

fn fold_case(key: Key) -> Key {
    match key {
        Key::Text(text) => Key::Text(text.to_lowercase()),
        Key::Composite(parts) => Key::Composite(parts.into_iter().map(fold_case).collect()),
        other => other,
    }
}

///
/// LowerEdge
///
/// Lower range edge after composite widening. A partial composite bound
/// (fewer parts than the index arity) names a whole subtree of keys; an
/// exclusive partial bound must skip the subtree, not just the bound key.
/// `admits` is monotone along the key order: false up to the edge, true
/// from the edge onward.
///

#[derive(Clone, Debug)]
pub(crate) struct LowerEdge {
    key: Key,
    inclusive: bool,
    skip_extensions: bool,
}

impl LowerEdge {
    pub(crate) fn new(key: Key, inclusive: bool, index_arity: usize) -> Self {
        let partial = key.is_partial_for(index_arity);

        Self {
            skip_extensions: partial && !inclusive,
            key,
            inclusive,
        }
    }

    pub(crate) const fn key(&self) -> &Key {
        &self.key
    }

    /// True if `candidate` lies at or above this edge.
    pub(crate) fn admits(&self, candidate: &Key) -> bool {
        match candidate.cmp(&self.key) {
            Ordering::Less => false,
            Ordering::Equal => self.inclusive,
            Ordering::Greater => !(self.skip_extensions && self.key.is_prefix_of(candidate)),
        }
    }

    /// Loose lower bound for ordered-map traversal; `admits` trims the rest.
    pub(crate) const fn range_bound(&self) -> Bound<&Key> {
        Bound::Included(&self.key)
    }
}

///
/// UpperEdge
///
/// Upper range edge after composite widening. An inclusive partial bound
/// admits every extension of the partial key; extensions sort directly
/// after their prefix, so `admits` stays monotone (true up to and through
/// the edge, false after).
///

#[derive(Clone, Debug)]
pub(crate) struct UpperEdge {
    key: Key,
    inclusive: bool,
    admit_extensions: bool,
}

impl UpperEdge {
    pub(crate) fn new(key: Key, inclusive: bool, index_arity: usize) -> Self {
        let partial = key.is_partial_for(index_arity);

        Self {
            admit_extensions: partial && inclusive,
            key,
            inclusive,
        }
    }

    pub(crate) const fn key(&self) -> &Key {
        &self.key
    }

    /// True if `candidate` lies at or below this edge.
    pub(crate) fn admits(&self, candidate: &Key) -> bool {
        match candidate.cmp(&self.key) {
            Ordering::Less => true,
            Ordering::Equal => self.inclusive,
            Ordering::Greater => self.admit_extensions && self.key.is_prefix_of(candidate),
        }
    }

    /// Loose upper bound for ordered-map traversal. Extensions of a partial
    /// key sort after it, so a widened edge cannot be expressed as a closed
    /// bound; `admits` trims the tail instead.
    pub(crate) const fn range_bound(&self) -> Bound<&Key> {
        if self.admit_extensions {
            Bound::Unbounded
        } else if self.inclusive {
            Bound::Included(&self.key)
        } else {
            Bound::Excluded(&self.key)
        }
    }
}

/// True if the traversal envelope between two edges is structurally empty.
///
/// Guards the ordered-map range calls, which reject inverted bounds. A
/// widened upper edge keeps an open map bound, so only closed upper bounds
/// can invert.
pub(crate) fn envelope_is_empty(lower: &LowerEdge, upper: &UpperEdge) -> bool {
    match upper.range_bound() {
        Bound::Unbounded => false,
        Bound::Included(key) | Bound::Excluded(key) => lower.key() > key,
    }
}

///
/// TESTS
///
