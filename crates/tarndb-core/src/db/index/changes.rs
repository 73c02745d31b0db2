//! Module: index::changes
//! Responsibility: the transaction-local pending-operation log for one index
//! and its ordered key navigation, plus the per-transaction index registry.
//! Does not own: replay semantics (resolver/survival) or merge ordering.
//! Boundary: read paths consult the log, never mutate it; the log must stay
//! unchanged while any cursor over it is live.

use crate::db::index::{
    entry::RecordId,
    key::{Key, LowerEdge, UpperEdge, envelope_is_empty},
};
use std::{collections::BTreeMap, ops::Bound};

///
/// PendingOp
///
/// One pending operation in a key's log, in insertion order. A removal
/// without an id cancels every value the key holds at that point of the
/// replay; a removal with an id cancels one occurrence of that value.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PendingOp {
    Put(RecordId),
    Remove(Option<RecordId>),
}

///
/// KeyChanges
///
/// Insertion-ordered pending-operation list for exactly one key.
///

#[derive(Clone, Debug, Default)]
pub struct KeyChanges {
    entries: Vec<PendingOp>,
}

static EMPTY_CHANGES: KeyChanges = KeyChanges {
    entries: Vec::new(),
};

impl KeyChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PendingOp> + '_ {
        self.entries.iter().copied()
    }

    fn push(&mut self, op: PendingOp) {
        self.entries.push(op);
    }
}

///
/// IndexTxChanges
///
/// Pending changes one transaction holds against one index: a per-key
/// operation log plus the index-wide `cleared` marker. Keys navigate in
/// canonical order so pending-only cursors can walk the touched-key set
/// without materializing it.
///

#[derive(Debug, Default)]
pub struct IndexTxChanges {
    per_key: BTreeMap<Key, KeyChanges>,
    cleared: bool,
}

impl IndexTxChanges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the transaction issued an index-wide clear; durable contents
    /// are invisible to reads while this holds.
    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// True if this log carries any effect at all.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.cleared || !self.per_key.is_empty()
    }

    // --- write-side recorders (driven by the transaction, not by reads) ---

    pub fn record_put(&mut self, key: Key, id: RecordId) {
        self.per_key.entry(key).or_default().push(PendingOp::Put(id));
    }

    pub fn record_remove(&mut self, key: Key, id: RecordId) {
        self.per_key
            .entry(key)
            .or_default()
            .push(PendingOp::Remove(Some(id)));
    }

    pub fn record_remove_key(&mut self, key: Key) {
        self.per_key
            .entry(key)
            .or_default()
            .push(PendingOp::Remove(None));
    }

    /// Drop every per-key log and mark the index cleared; later operations
    /// keep accumulating on top of the cleared state.
    pub fn record_clear(&mut self) {
        self.per_key.clear();
        self.cleared = true;
    }

    // --- ordered key navigation ---

    /// The per-key log, empty when the key is untouched.
    #[must_use]
    pub fn changes_per_key(&self, key: &Key) -> &KeyChanges {
        self.per_key.get(key).unwrap_or(&EMPTY_CHANGES)
    }

    #[must_use]
    pub fn first_key(&self) -> Option<&Key> {
        self.per_key.keys().next()
    }

    #[must_use]
    pub fn last_key(&self) -> Option<&Key> {
        self.per_key.keys().next_back()
    }

    /// Smallest touched key strictly greater than `key`.
    #[must_use]
    pub fn higher_key(&self, key: &Key) -> Option<&Key> {
        self.per_key
            .range((Bound::Excluded(key), Bound::Unbounded))
            .map(|(k, _)| k)
            .next()
    }

    /// Greatest touched key strictly less than `key`.
    #[must_use]
    pub fn lower_key(&self, key: &Key) -> Option<&Key> {
        self.per_key
            .range((Bound::Unbounded, Bound::Excluded(key)))
            .map(|(k, _)| k)
            .next_back()
    }

    /// First and last touched keys admitted by the widened range edges,
    /// or `None` when no touched key falls inside the range.
    pub(crate) fn first_and_last_in_range(
        &self,
        lower: &LowerEdge,
        upper: &UpperEdge,
    ) -> Option<(Key, Key)> {
        if envelope_is_empty(lower, upper) {
            return None;
        }

        let span = (lower.range_bound(), upper.range_bound());

        let first = self
            .per_key
            .range::<Key, _>(span)
            .map(|(key, _)| key)
            .find(|key| lower.admits(key))
            .filter(|key| upper.admits(key))?
            .clone();

        let last = self
            .per_key
            .range::<Key, _>(span)
            .rev()
            .map(|(key, _)| key)
            .find(|key| upper.admits(key))
            .filter(|key| lower.admits(key))?
            .clone();

        Some((first, last))
    }
}

///
/// TxState
///
/// Per-transaction registry of index change logs. Read paths receive this
/// explicitly (or `None` when no transaction is open); there is no ambient
/// transaction lookup anywhere in the crate.
///

#[derive(Debug, Default)]
pub struct TxState {
    indexes: BTreeMap<String, IndexTxChanges>,
}

impl TxState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The change log for `index`, created empty on first touch.
    pub fn index_changes_mut(&mut self, index: &str) -> &mut IndexTxChanges {
        self.indexes.entry(index.to_string()).or_default()
    }

    /// The change log for `index`, if the transaction actually touched it.
    #[must_use]
    pub fn index_changes(&self, index: &str) -> Option<&IndexTxChanges> {
        self.indexes.get(index).filter(|c| c.has_changes())
    }

    /// True if any index in this transaction has pending operations.
    #[must_use]
    pub fn has_index_ops(&self) -> bool {
        self.indexes.values().any(IndexTxChanges::has_changes)
    }
}

///
/// TESTS
///
