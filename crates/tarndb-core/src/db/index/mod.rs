//! Module: index
//! Responsibility: index vocabulary (keys, entries, configs), the pending
//! change log, and the plain/overlay read surfaces.
//! Does not own: record payloads or commit application.

mod changes;
mod contracts;
mod entry;
mod key;
mod store;

pub mod overlay;

pub use changes::{IndexTxChanges, KeyChanges, PendingOp, TxState};
pub use contracts::{AllowAll, EntryCursor, IndexReader, RecordReadFilter};
pub use entry::{IndexEntry, RecordId, RecordSet};
pub use key::{Collation, CompositeKeyError, Key};
pub use overlay::OverlayIndex;
pub use store::{MemoryIndexStore, PlainIndex};

use crate::MAX_COMPOSITE_KEY_PARTS;

///
/// IndexConfig
///
/// Static description of one index: name, field arity, and collation. Both
/// read surfaces collate every incoming key through this before touching a
/// store, so range edges and point lookups agree on key identity.
///

#[derive(Clone, Debug)]
pub struct IndexConfig {
    name: String,
    arity: usize,
    collation: Collation,
}

impl IndexConfig {
    /// `arity` is the number of indexed fields, 1..=`MAX_COMPOSITE_KEY_PARTS`.
    #[must_use]
    pub fn new(name: impl Into<String>, arity: usize, collation: Collation) -> Self {
        debug_assert!(
            (1..=MAX_COMPOSITE_KEY_PARTS).contains(&arity),
            "index arity out of range"
        );

        Self {
            name: name.into(),
            arity,
            collation,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn arity(&self) -> usize {
        self.arity
    }

    #[must_use]
    pub const fn collation(&self) -> Collation {
        self.collation
    }

    /// Normalize a lookup key: collation first, then a single-scalar wrap
    /// when a composite index is probed with a bare scalar (a one-part
    /// partial key).
    #[must_use]
    pub fn collate(&self, key: Key) -> Key {
        let key = self.collation.apply(key);

        if self.arity > 1 && !key.is_composite() {
            Key::Composite(vec![key])
        } else {
            key
        }
    }
}

///
/// TESTS
///
