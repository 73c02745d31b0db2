//! Module: index::entry
//! Responsibility: record identity and the read-only (key, id) projection.
//! Does not own: survival decisions or merge ordering.
//! Boundary: cursors yield `IndexEntry` values; callers never receive live
//! handles into storage.

use crate::db::index::Key;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

///
/// RecordId
///
/// Opaque handle to a stored record, addressed as bucket:slot. Record ids
/// are index values: they support equality and hashing but carry no
/// meaningful order of their own.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[display("{bucket}:{slot}")]
pub struct RecordId {
    bucket: u32,
    slot: u64,
}

impl RecordId {
    #[must_use]
    pub const fn new(bucket: u32, slot: u64) -> Self {
        Self { bucket, slot }
    }

    #[must_use]
    pub const fn bucket(&self) -> u32 {
        self.bucket
    }

    #[must_use]
    pub const fn slot(&self) -> u64 {
        self.slot
    }
}

/// Unordered set of record ids held for one key.
pub type RecordSet = HashSet<RecordId>;

///
/// IndexEntry
///
/// Immutable (key, id) pair yielded by index cursors. Entries are read-only
/// projections of the merged view; there is deliberately no way to mutate
/// one after construction.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexEntry {
    key: Key,
    id: RecordId,
}

impl IndexEntry {
    #[must_use]
    pub const fn new(key: Key, id: RecordId) -> Self {
        Self { key, id }
    }

    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    #[must_use]
    pub fn into_parts(self) -> (Key, RecordId) {
        (self.key, self.id)
    }
}

///
/// TESTS
///
