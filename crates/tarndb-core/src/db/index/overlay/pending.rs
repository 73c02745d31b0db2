//! Module: index::overlay::pending
//! Responsibility: lazy cursors over keys the transaction touched — by
//! range (walking the change log's key order) or by explicit key list —
//! flattening each key's net value set one entry at a time.
//! Does not own: durable data; these cursors see only the pending log.

use crate::db::{
    Direction,
    index::{
        IndexEntry, IndexTxChanges, RecordId,
        key::{Key, LowerEdge, UpperEdge},
        overlay::resolve::resolve_pending_values,
    },
};

///
/// PendingRangeCursor
///
/// Two-level walk: advance to the next touched key inside the range, then
/// stream that key's resolved values. Keys whose pending log nets to empty
/// are skipped without being materialized. Non-restartable.
///

pub(crate) struct PendingRangeCursor<'a> {
    changes: &'a IndexTxChanges,
    direction: Direction,
    first_key: Option<Key>,
    last_key: Option<Key>,
    next_key: Option<Key>,
    current: Option<(Key, std::vec::IntoIter<RecordId>)>,
}

impl<'a> PendingRangeCursor<'a> {
    pub(crate) fn new(
        changes: &'a IndexTxChanges,
        lower: LowerEdge,
        upper: UpperEdge,
        direction: Direction,
    ) -> Self {
        let (first_key, last_key) = changes
            .first_and_last_in_range(&lower, &upper)
            .map_or((None, None), |(first, last)| (Some(first), Some(last)));

        let next_key = match direction {
            Direction::Asc => first_key.clone(),
            Direction::Desc => last_key.clone(),
        };

        Self {
            changes,
            direction,
            first_key,
            last_key,
            next_key,
            current: None,
        }
    }

    /// A cursor that is exhausted from birth; used when a range bound does
    /// not exist (e.g. an open-ended scan over an empty change log).
    pub(crate) const fn exhausted(changes: &'a IndexTxChanges, direction: Direction) -> Self {
        Self {
            changes,
            direction,
            first_key: None,
            last_key: None,
            next_key: None,
            current: None,
        }
    }

    /// Next touched key in scan order, clamped to the range endpoints.
    fn following_key(&self, key: &Key) -> Option<Key> {
        match self.direction {
            Direction::Asc => {
                let last = self.last_key.as_ref()?;
                self.changes
                    .higher_key(key)
                    .filter(|next| *next <= last)
                    .cloned()
            }
            Direction::Desc => {
                let first = self.first_key.as_ref()?;
                self.changes
                    .lower_key(key)
                    .filter(|next| *next >= first)
                    .cloned()
            }
        }
    }
}

impl Iterator for PendingRangeCursor<'_> {
    type Item = IndexEntry;

    fn next(&mut self) -> Option<IndexEntry> {
        loop {
            if let Some((key, values)) = &mut self.current {
                if let Some(id) = values.next() {
                    return Some(IndexEntry::new(key.clone(), id));
                }
                self.current = None;
            }

            let key = self.next_key.take()?;
            self.next_key = self.following_key(&key);

            if let Some(values) = resolve_pending_values(self.changes.changes_per_key(&key)) {
                self.current = Some((key, values.into_iter()));
            }
        }
    }
}

///
/// PendingKeysCursor
///
/// The explicit-key-list variant: walks a pre-sorted, pre-collated key
/// list instead of the change log's own key order.
///

pub(crate) struct PendingKeysCursor<'a> {
    changes: &'a IndexTxChanges,
    keys: std::vec::IntoIter<Key>,
    current: Option<(Key, std::vec::IntoIter<RecordId>)>,
}

impl<'a> PendingKeysCursor<'a> {
    pub(crate) fn new(changes: &'a IndexTxChanges, sorted_keys: Vec<Key>) -> Self {
        Self {
            changes,
            keys: sorted_keys.into_iter(),
            current: None,
        }
    }
}

impl Iterator for PendingKeysCursor<'_> {
    type Item = IndexEntry;

    fn next(&mut self) -> Option<IndexEntry> {
        loop {
            if let Some((key, values)) = &mut self.current {
                if let Some(id) = values.next() {
                    return Some(IndexEntry::new(key.clone(), id));
                }
                self.current = None;
            }

            let key = self.keys.next()?;

            if let Some(values) = resolve_pending_values(self.changes.changes_per_key(&key)) {
                self.current = Some((key, values.into_iter()));
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{PendingKeysCursor, PendingRangeCursor};
    use crate::db::{
        Direction,
        index::{
            IndexTxChanges, Key, RecordId,
            key::{LowerEdge, UpperEdge},
        },
    };

    fn id(slot: u64) -> RecordId {
        RecordId::new(0, slot)
    }

    fn changes_with_keys(keys: &[i64]) -> IndexTxChanges {
        let mut changes = IndexTxChanges::new();
        for &k in keys {
            changes.record_put(Key::Int(k), id(u64::try_from(k).expect("positive key")));
        }
        changes
    }

    fn edges(from: i64, to: i64) -> (LowerEdge, UpperEdge) {
        (
            LowerEdge::new(Key::Int(from), true, 1),
            UpperEdge::new(Key::Int(to), true, 1),
        )
    }

    #[test]
    fn range_cursor_walks_touched_keys_in_both_directions() {
        let changes = changes_with_keys(&[2, 4, 6, 8]);

        let (lower, upper) = edges(3, 7);
        let asc: Vec<Key> = PendingRangeCursor::new(&changes, lower, upper, Direction::Asc)
            .map(|entry| entry.key().clone())
            .collect();
        assert_eq!(asc, vec![Key::Int(4), Key::Int(6)]);

        let (lower, upper) = edges(3, 7);
        let desc: Vec<Key> = PendingRangeCursor::new(&changes, lower, upper, Direction::Desc)
            .map(|entry| entry.key().clone())
            .collect();
        assert_eq!(desc, vec![Key::Int(6), Key::Int(4)]);
    }

    #[test]
    fn range_cursor_skips_keys_whose_log_nets_to_empty() {
        let mut changes = changes_with_keys(&[1, 2, 3]);
        changes.record_remove(Key::Int(2), id(2));

        let (lower, upper) = edges(1, 3);
        let keys: Vec<Key> = PendingRangeCursor::new(&changes, lower, upper, Direction::Asc)
            .map(|entry| entry.key().clone())
            .collect();

        assert_eq!(keys, vec![Key::Int(1), Key::Int(3)]);
    }

    #[test]
    fn range_cursor_flattens_multiple_values_per_key() {
        let mut changes = IndexTxChanges::new();
        changes.record_put(Key::Int(1), id(10));
        changes.record_put(Key::Int(1), id(11));

        let (lower, upper) = edges(1, 1);
        let entries: Vec<_> =
            PendingRangeCursor::new(&changes, lower, upper, Direction::Asc).collect();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| entry.key() == &Key::Int(1)));
    }

    #[test]
    fn range_cursor_is_exhausted_when_no_touched_key_is_in_range() {
        let changes = changes_with_keys(&[1, 9]);
        let (lower, upper) = edges(3, 7);

        let mut cursor = PendingRangeCursor::new(&changes, lower, upper, Direction::Asc);
        assert!(cursor.next().is_none());
        assert!(cursor.next().is_none());

        let mut born_dead = PendingRangeCursor::exhausted(&changes, Direction::Desc);
        assert!(born_dead.next().is_none());
    }

    #[test]
    fn keys_cursor_follows_the_given_list_order() {
        let changes = changes_with_keys(&[1, 2, 3]);

        let keys: Vec<Key> = PendingKeysCursor::new(
            &changes,
            vec![Key::Int(3), Key::Int(2), Key::Int(5)],
        )
        .map(|entry| entry.key().clone())
        .collect();

        // Untouched key 5 contributes nothing; order is the list's own.
        assert_eq!(keys, vec![Key::Int(3), Key::Int(2)]);
    }
}
