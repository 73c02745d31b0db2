//! Core runtime for TarnDB's transactional index read overlay: key
//! vocabulary, the per-transaction change log, and the plain/overlay read
//! surfaces exported via the `prelude`.
#![warn(unreachable_pub)]

pub mod db;
pub mod obs;

///
/// CONSTANTS
///

/// Maximum number of parts in a composite index key.
///
/// This limit keeps composite keys within bounded, comparable sizes and
/// simplifies sizing decisions in the stores.
pub const MAX_COMPOSITE_KEY_PARTS: usize = 4;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No cursors, stores internals, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::db::{
        Direction,
        index::{
            Collation, IndexConfig, IndexEntry, IndexReader, IndexTxChanges, Key, OverlayIndex,
            PlainIndex, RecordId, TxState,
        },
    };
}
