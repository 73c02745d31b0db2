//! Module: index::contracts
//! Responsibility: the read capability shared by plain and overlay readers,
//! and the record-level read-filter boundary.
//! Does not own: merge semantics or storage layout.
//! Boundary: callers program against `IndexReader`; which implementation
//! answers is a composition decision, not an inheritance one.

use crate::db::{
    Direction,
    index::{IndexEntry, Key, RecordId},
};

/// Lazy, finite, non-restartable stream of index entries. Abandoning a
/// cursor before exhaustion is always safe.
pub type EntryCursor<'a> = Box<dyn Iterator<Item = IndexEntry> + 'a>;

///
/// IndexReader
///
/// Point and ranged read operations over one multi-valued index. `get`
/// distinguishes "no result" (`None`) from an empty result set, which the
/// plain reader may legitimately return.
///

pub trait IndexReader {
    /// All record ids currently valid for `key`.
    fn get(&self, key: &Key) -> Option<Vec<RecordId>>;

    /// True iff `get` yields at least one record id.
    fn contains(&self, key: &Key) -> bool {
        self.get(key).is_some_and(|ids| !ids.is_empty())
    }

    /// Ordered scan over `[from, to]` honoring the inclusivity flags.
    fn entries_between(
        &self,
        from: &Key,
        from_inclusive: bool,
        to: &Key,
        to_inclusive: bool,
        direction: Direction,
    ) -> EntryCursor<'_>;

    /// Ordered scan with an open upper bound.
    fn entries_major(&self, from: &Key, from_inclusive: bool, direction: Direction)
    -> EntryCursor<'_>;

    /// Ordered scan with an open lower bound.
    fn entries_minor(&self, to: &Key, to_inclusive: bool, direction: Direction)
    -> EntryCursor<'_>;

    /// Ordered scan over an explicit key set.
    fn entries_for_keys(&self, keys: &[Key], direction: Direction) -> EntryCursor<'_>;
}

///
/// RecordReadFilter
///
/// Record-level visibility filter applied as the last step of every read
/// path. Opaque to this crate; the engine's security layer implements it.
///

pub trait RecordReadFilter {
    fn allows(&self, id: RecordId) -> bool;
}

///
/// AllowAll
///

#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl RecordReadFilter for AllowAll {
    fn allows(&self, _id: RecordId) -> bool {
        true
    }
}
