//! Module: index::overlay::resolve
//! Responsibility: replaying one key's pending-operation log — the net
//! value set a transaction contributes, and whether one durable value
//! survives the log.
//! Does not own: cursor state or merge ordering.

use crate::db::index::{
    IndexEntry, IndexTxChanges, Key, KeyChanges, PendingOp, RecordId, RecordSet,
};

/// Net value set contributed purely by the transaction for one key.
///
/// Replays the log in insertion order: a put appends one occurrence, a
/// keyless remove drops everything accumulated so far, a keyed remove
/// cancels one occurrence if present (cancelling what was never added is a
/// no-op). Returns `None` when the log is empty or the replay nets to
/// nothing — callers must not conclude anything about durable values from
/// that alone.
#[must_use]
pub(crate) fn resolve_pending_values(changes: &KeyChanges) -> Option<Vec<RecordId>> {
    if changes.is_empty() {
        return None;
    }

    let mut replay: Vec<RecordId> = Vec::new();
    for op in changes.iter() {
        match op {
            PendingOp::Put(id) => replay.push(id),
            PendingOp::Remove(None) => replay.clear(),
            PendingOp::Remove(Some(id)) => {
                if let Some(pos) = replay.iter().position(|v| *v == id) {
                    replay.remove(pos);
                }
            }
        }
    }

    if replay.is_empty() {
        return None;
    }

    // Dedup to a set, keeping first-appearance order.
    let mut seen = RecordSet::with_capacity(replay.len());
    let mut out = Vec::with_capacity(replay.len());
    for id in replay {
        if seen.insert(id) {
            out.push(id);
        }
    }

    Some(out)
}

/// Whether one durable value remains valid under the key's pending log.
///
/// Counts occurrences starting from the single durable one: a put of the
/// same value adds an occurrence, a keyless remove cancels everything seen
/// so far, a keyed remove of the same value cancels one occurrence.
/// Removes with nothing left to cancel have no effect, so a malformed log
/// cannot underflow the count.
#[must_use]
pub(crate) fn survives(key: &Key, id: RecordId, changes: &IndexTxChanges) -> Option<IndexEntry> {
    let per_key = changes.changes_per_key(key);
    if per_key.is_empty() {
        return Some(IndexEntry::new(key.clone(), id));
    }

    let mut occurrences: u32 = 1;
    for op in per_key.iter() {
        match op {
            PendingOp::Put(v) if v == id => occurrences += 1,
            PendingOp::Remove(None) => occurrences = 0,
            PendingOp::Remove(Some(v)) if v == id && occurrences > 0 => occurrences -= 1,
            _ => {}
        }
    }

    (occurrences > 0).then(|| IndexEntry::new(key.clone(), id))
}

///
/// TESTS
///
