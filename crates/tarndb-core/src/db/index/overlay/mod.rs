//! Module: index::overlay
//! Responsibility: the transaction-consistent read surface — every
//! operation merges durable contents with the pending change log, pending
//! operations taking precedence.
//! Does not own: the durable store or the change log's population.
//! Boundary: composes over a plain reader; transaction state arrives as an
//! explicit argument, so "no open transaction" is ordinary data.

mod merge;
mod pending;
mod resolve;

#[cfg(test)]
mod tests;

use crate::{
    db::{
        Direction,
        index::{
            EntryCursor, IndexReader, IndexTxChanges, Key, PlainIndex, RecordId, RecordSet,
            TxState,
            key::{LowerEdge, UpperEdge},
        },
    },
    obs::sink::{self, MetricsEvent, ReadKind},
};
use merge::MergeCursor;
use pending::{PendingKeysCursor, PendingRangeCursor};
use resolve::{resolve_pending_values, survives};

///
/// OverlayIndex
///
/// Transaction-aware reader over a plain one. While the transaction has no
/// changes for this index, every operation delegates wholesale; otherwise
/// reads see durable survivors plus the log's net contributions, in key
/// order, without materializing the merged view.
///

pub struct OverlayIndex<'a> {
    base: &'a PlainIndex,
    tx: Option<&'a TxState>,
}

impl<'a> OverlayIndex<'a> {
    #[must_use]
    pub const fn new(base: &'a PlainIndex, tx: Option<&'a TxState>) -> Self {
        Self { base, tx }
    }

    fn changes(&self) -> Option<&'a IndexTxChanges> {
        self.tx
            .and_then(|tx| tx.index_changes(self.base.config().name()))
    }

    fn filtered(&self, cursor: EntryCursor<'a>) -> EntryCursor<'a> {
        let filter = self.base.filter();

        Box::new(cursor.filter(move |entry| filter.allows(entry.id())))
    }
}

impl IndexReader for OverlayIndex<'_> {
    fn get(&self, key: &Key) -> Option<Vec<RecordId>> {
        sink::record(MetricsEvent::ReadStart {
            kind: ReadKind::Get,
        });

        let Some(changes) = self.changes() else {
            sink::record(MetricsEvent::ReadDelegated {
                kind: ReadKind::Get,
            });
            let result = self.base.get(key);

            // Legacy shim, kept for callers that distinguish "no result"
            // from an empty collection: an open transaction with pending
            // index operations anywhere turns an empty durable result into
            // no result. Candidate for removal.
            if self.tx.is_some_and(TxState::has_index_ops)
                && result.as_ref().is_some_and(Vec::is_empty)
            {
                return None;
            }

            return result;
        };

        let key = self.base.config().collate(key.clone());

        let mut out: Vec<RecordId> = Vec::new();
        let mut seen = RecordSet::new();

        if !changes.is_cleared() {
            if let Some(ids) = self.base.get(&key) {
                for id in ids {
                    if survives(&key, id, changes).is_some() && seen.insert(id) {
                        out.push(id);
                    }
                }
            }
        }

        if let Some(pending) = resolve_pending_values(changes.changes_per_key(&key)) {
            for id in pending {
                if seen.insert(id) {
                    out.push(id);
                }
            }
        }

        if out.is_empty() {
            return None;
        }

        out.retain(|id| self.base.filter().allows(*id));

        Some(out)
    }

    fn entries_between(
        &self,
        from: &Key,
        from_inclusive: bool,
        to: &Key,
        to_inclusive: bool,
        direction: Direction,
    ) -> EntryCursor<'_> {
        sink::record(MetricsEvent::ReadStart {
            kind: ReadKind::Between,
        });

        let Some(changes) = self.changes() else {
            sink::record(MetricsEvent::ReadDelegated {
                kind: ReadKind::Between,
            });
            return self
                .base
                .entries_between(from, from_inclusive, to, to_inclusive, direction);
        };

        let config = self.base.config();
        let from = config.collate(from.clone());
        let to = config.collate(to.clone());

        let lower = LowerEdge::new(from.clone(), from_inclusive, config.arity());
        let upper = UpperEdge::new(to.clone(), to_inclusive, config.arity());
        let pending = PendingRangeCursor::new(changes, lower, upper, direction);

        if changes.is_cleared() {
            return self.filtered(Box::new(pending));
        }

        let durable = self
            .base
            .entries_between(&from, from_inclusive, &to, to_inclusive, direction);

        self.filtered(Box::new(MergeCursor::new(
            pending, durable, direction, changes,
        )))
    }

    fn entries_major(
        &self,
        from: &Key,
        from_inclusive: bool,
        direction: Direction,
    ) -> EntryCursor<'_> {
        sink::record(MetricsEvent::ReadStart {
            kind: ReadKind::Major,
        });

        let Some(changes) = self.changes() else {
            sink::record(MetricsEvent::ReadDelegated {
                kind: ReadKind::Major,
            });
            return self.base.entries_major(from, from_inclusive, direction);
        };

        let config = self.base.config();
        let from = config.collate(from.clone());
        let lower = LowerEdge::new(from.clone(), from_inclusive, config.arity());

        // The pending side is bounded above by the log's own last key.
        let pending = match changes.last_key() {
            Some(last) => {
                let upper = UpperEdge::new(last.clone(), true, config.arity());
                PendingRangeCursor::new(changes, lower, upper, direction)
            }
            None => PendingRangeCursor::exhausted(changes, direction),
        };

        if changes.is_cleared() {
            return self.filtered(Box::new(pending));
        }

        let durable = self.base.entries_major(&from, from_inclusive, direction);

        self.filtered(Box::new(MergeCursor::new(
            pending, durable, direction, changes,
        )))
    }

    fn entries_minor(
        &self,
        to: &Key,
        to_inclusive: bool,
        direction: Direction,
    ) -> EntryCursor<'_> {
        sink::record(MetricsEvent::ReadStart {
            kind: ReadKind::Minor,
        });

        let Some(changes) = self.changes() else {
            sink::record(MetricsEvent::ReadDelegated {
                kind: ReadKind::Minor,
            });
            return self.base.entries_minor(to, to_inclusive, direction);
        };

        let config = self.base.config();
        let to = config.collate(to.clone());
        let upper = UpperEdge::new(to.clone(), to_inclusive, config.arity());

        // The pending side is bounded below by the log's own first key.
        let pending = match changes.first_key() {
            Some(first) => {
                let lower = LowerEdge::new(first.clone(), true, config.arity());
                PendingRangeCursor::new(changes, lower, upper, direction)
            }
            None => PendingRangeCursor::exhausted(changes, direction),
        };

        if changes.is_cleared() {
            return self.filtered(Box::new(pending));
        }

        let durable = self.base.entries_minor(&to, to_inclusive, direction);

        self.filtered(Box::new(MergeCursor::new(
            pending, durable, direction, changes,
        )))
    }

    fn entries_for_keys(&self, keys: &[Key], direction: Direction) -> EntryCursor<'_> {
        sink::record(MetricsEvent::ReadStart {
            kind: ReadKind::Keys,
        });

        let Some(changes) = self.changes() else {
            sink::record(MetricsEvent::ReadDelegated {
                kind: ReadKind::Keys,
            });
            return self.base.entries_for_keys(keys, direction);
        };

        let config = self.base.config();
        let mut sorted: Vec<Key> = keys.iter().map(|key| config.collate(key.clone())).collect();
        sorted.sort_unstable();
        sorted.dedup();
        if direction == Direction::Desc {
            sorted.reverse();
        }

        let pending = PendingKeysCursor::new(changes, sorted);

        if changes.is_cleared() {
            return self.filtered(Box::new(pending));
        }

        // The plain reader collates, sorts, and dedups the same way, so
        // both sides of the merge walk the same key sequence.
        let durable = self.base.entries_for_keys(keys, direction);

        self.filtered(Box::new(MergeCursor::new(
            pending, durable, direction, changes,
        )))
    }
}
