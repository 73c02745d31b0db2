//! Module: index::overlay::merge
//! Responsibility: ordered merge of a pending-only cursor with a durable
//! cursor over the same bound, filtering durable entries through the
//! survival check.
//! Does not own: range construction or collation; both inputs arrive
//! already bounded and ordered.

use crate::db::{
    Direction,
    index::{EntryCursor, IndexEntry, IndexTxChanges, overlay::resolve::survives},
};

///
/// MergeState
///
/// Explicit cursor state: look-aheads are primed on the first pull, not at
/// construction, so building a merge cursor never touches either source.
///

enum MergeState {
    Fresh,
    Scanning {
        next_pending: Option<IndexEntry>,
        next_durable: Option<IndexEntry>,
    },
    Exhausted,
}

///
/// MergeCursor
///
/// One look-ahead entry per source. When both sources offer an entry, the
/// durable side wins ties (ascending: durable key <= pending key takes
/// durable; descending mirrors). Durable entries must pass the survival
/// check; suppressed ones are replaced by the source's next entry without
/// emitting anything. Pending entries pass through untouched — the
/// resolver already made them net contributions, so the two streams are
/// value-disjoint and no key-level dedup is needed.
///

pub(crate) struct MergeCursor<'a, P> {
    pending: P,
    durable: EntryCursor<'a>,
    direction: Direction,
    changes: &'a IndexTxChanges,
    state: MergeState,
}

impl<'a, P> MergeCursor<'a, P>
where
    P: Iterator<Item = IndexEntry>,
{
    pub(crate) fn new(
        pending: P,
        durable: EntryCursor<'a>,
        direction: Direction,
        changes: &'a IndexTxChanges,
    ) -> Self {
        Self {
            pending,
            durable,
            direction,
            changes,
            state: MergeState::Fresh,
        }
    }

    fn durable_first(&self, durable: &IndexEntry, pending: &IndexEntry) -> bool {
        match self.direction {
            Direction::Asc => durable.key() <= pending.key(),
            Direction::Desc => durable.key() >= pending.key(),
        }
    }
}

impl<P> Iterator for MergeCursor<'_, P>
where
    P: Iterator<Item = IndexEntry>,
{
    type Item = IndexEntry;

    fn next(&mut self) -> Option<IndexEntry> {
        loop {
            match std::mem::replace(&mut self.state, MergeState::Exhausted) {
                MergeState::Fresh => {
                    self.state = MergeState::Scanning {
                        next_pending: self.pending.next(),
                        next_durable: self.durable.next(),
                    };
                }
                MergeState::Scanning {
                    next_pending,
                    next_durable,
                } => match (next_pending, next_durable) {
                    (None, None) => return None,
                    (Some(pending), None) => {
                        self.state = MergeState::Scanning {
                            next_pending: self.pending.next(),
                            next_durable: None,
                        };
                        return Some(pending);
                    }
                    (None, Some(durable)) => {
                        let checked = survives(durable.key(), durable.id(), self.changes);
                        self.state = MergeState::Scanning {
                            next_pending: None,
                            next_durable: self.durable.next(),
                        };
                        if let Some(entry) = checked {
                            return Some(entry);
                        }
                    }
                    (Some(pending), Some(durable)) => {
                        if self.durable_first(&durable, &pending) {
                            let checked = survives(durable.key(), durable.id(), self.changes);
                            self.state = MergeState::Scanning {
                                next_pending: Some(pending),
                                next_durable: self.durable.next(),
                            };
                            if let Some(entry) = checked {
                                return Some(entry);
                            }
                        } else {
                            self.state = MergeState::Scanning {
                                next_pending: self.pending.next(),
                                next_durable: Some(durable),
                            };
                            return Some(pending);
                        }
                    }
                },
                MergeState::Exhausted => return None,
            }
        }
    }
}

///
/// TESTS
///
