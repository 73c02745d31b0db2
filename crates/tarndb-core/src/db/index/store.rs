//! Module: index::store
//! Responsibility: the in-memory durable index collaborator and the plain
//! (transaction-unaware) reader over it.
//! Does not own: pending-change semantics; the overlay composes on top.
//! Boundary: cursors expose a consistent snapshot for their own lifetime.

use crate::db::{
    Direction,
    index::{
        IndexConfig,
        contracts::{AllowAll, EntryCursor, IndexReader, RecordReadFilter},
        entry::{IndexEntry, RecordId, RecordSet},
        key::{Key, LowerEdge, UpperEdge, envelope_is_empty},
    },
};
use std::{collections::BTreeMap, ops::Bound};

///
/// MemoryIndexStore
///
/// Committed index contents: a sorted map from key to the unordered set of
/// record ids indexed under it. Stands in for the storage engine's durable
/// index structure; reads treat it as an already-consistent snapshot.
///

#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    entries: BTreeMap<Key, RecordSet>,
}

impl MemoryIndexStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Key, id: RecordId) -> bool {
        self.entries.entry(key).or_default().insert(id)
    }

    pub fn remove(&mut self, key: &Key, id: RecordId) -> bool {
        let Some(set) = self.entries.get_mut(key) else {
            return false;
        };

        let removed = set.remove(&id);
        if set.is_empty() {
            self.entries.remove(key);
        }

        removed
    }

    /// Number of distinct keys currently stored.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn values(&self, key: &Key) -> Option<&RecordSet> {
        self.entries.get(key)
    }

    /// Lazy ordered walk over the keys admitted by the given edges; an
    /// absent edge leaves that side of the range open.
    pub(crate) fn scan(
        &self,
        lower: Option<LowerEdge>,
        upper: Option<UpperEdge>,
        direction: Direction,
    ) -> Box<dyn Iterator<Item = (&Key, &RecordSet)> + '_> {
        if let (Some(lower), Some(upper)) = (&lower, &upper)
            && envelope_is_empty(lower, upper)
        {
            return Box::new(std::iter::empty());
        }

        let span = (
            lower
                .as_ref()
                .map_or(Bound::Unbounded, |edge| edge.range_bound().cloned()),
            upper
                .as_ref()
                .map_or(Bound::Unbounded, |edge| edge.range_bound().cloned()),
        );

        match direction {
            Direction::Asc => Box::new(
                self.entries
                    .range::<Key, _>(span)
                    .skip_while(move |(key, _)| {
                        lower.as_ref().is_some_and(|edge| !edge.admits(key))
                    })
                    .take_while(move |(key, _)| {
                        upper.as_ref().is_none_or(|edge| edge.admits(key))
                    }),
            ),
            Direction::Desc => Box::new(
                self.entries
                    .range::<Key, _>(span)
                    .rev()
                    .skip_while(move |(key, _)| {
                        upper.as_ref().is_some_and(|edge| !edge.admits(key))
                    })
                    .take_while(move |(key, _)| {
                        lower.as_ref().is_none_or(|edge| edge.admits(key))
                    }),
            ),
        }
    }
}

///
/// PlainIndex
///
/// Transaction-unaware reader: serves every operation straight from the
/// durable store, collating keys and filtering records on the way out.
///

pub struct PlainIndex {
    config: IndexConfig,
    store: MemoryIndexStore,
    filter: Box<dyn RecordReadFilter>,
}

impl PlainIndex {
    #[must_use]
    pub fn new(config: IndexConfig) -> Self {
        Self::with_filter(config, Box::new(AllowAll))
    }

    #[must_use]
    pub fn with_filter(config: IndexConfig, filter: Box<dyn RecordReadFilter>) -> Self {
        Self {
            config,
            store: MemoryIndexStore::new(),
            filter,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub(crate) fn filter(&self) -> &dyn RecordReadFilter {
        self.filter.as_ref()
    }

    /// Index a record under `key` (collated first).
    pub fn insert(&mut self, key: Key, id: RecordId) -> bool {
        let key = self.config.collate(key);
        self.store.insert(key, id)
    }

    /// Drop one record from `key` (collated first).
    pub fn remove(&mut self, key: &Key, id: RecordId) -> bool {
        let key = self.config.collate(key.clone());
        self.store.remove(&key, id)
    }

    fn scan_cursor(
        &self,
        lower: Option<LowerEdge>,
        upper: Option<UpperEdge>,
        direction: Direction,
    ) -> EntryCursor<'_> {
        let filter = self.filter.as_ref();

        Box::new(
            self.store
                .scan(lower, upper, direction)
                .flat_map(|(key, ids)| {
                    ids.iter().map(move |id| IndexEntry::new(key.clone(), *id))
                })
                .filter(move |entry| filter.allows(entry.id())),
        )
    }
}

impl IndexReader for PlainIndex {
    fn get(&self, key: &Key) -> Option<Vec<RecordId>> {
        let key = self.config.collate(key.clone());
        let ids = self.store.values(&key).map_or_else(Vec::new, |set| {
            set.iter()
                .copied()
                .filter(|id| self.filter.allows(*id))
                .collect()
        });

        // Plain lookups always yield a collection; only the overlay maps
        // emptiness to "no result".
        Some(ids)
    }

    fn entries_between(
        &self,
        from: &Key,
        from_inclusive: bool,
        to: &Key,
        to_inclusive: bool,
        direction: Direction,
    ) -> EntryCursor<'_> {
        let arity = self.config.arity();
        let lower = LowerEdge::new(self.config.collate(from.clone()), from_inclusive, arity);
        let upper = UpperEdge::new(self.config.collate(to.clone()), to_inclusive, arity);

        self.scan_cursor(Some(lower), Some(upper), direction)
    }

    fn entries_major(
        &self,
        from: &Key,
        from_inclusive: bool,
        direction: Direction,
    ) -> EntryCursor<'_> {
        let arity = self.config.arity();
        let lower = LowerEdge::new(self.config.collate(from.clone()), from_inclusive, arity);

        self.scan_cursor(Some(lower), None, direction)
    }

    fn entries_minor(
        &self,
        to: &Key,
        to_inclusive: bool,
        direction: Direction,
    ) -> EntryCursor<'_> {
        let arity = self.config.arity();
        let upper = UpperEdge::new(self.config.collate(to.clone()), to_inclusive, arity);

        self.scan_cursor(None, Some(upper), direction)
    }

    fn entries_for_keys(&self, keys: &[Key], direction: Direction) -> EntryCursor<'_> {
        let mut sorted: Vec<Key> = keys
            .iter()
            .map(|key| self.config.collate(key.clone()))
            .collect();
        sorted.sort_unstable();
        sorted.dedup();
        if direction == Direction::Desc {
            sorted.reverse();
        }

        let filter = self.filter.as_ref();

        Box::new(
            sorted
                .into_iter()
                .flat_map(move |key| {
                    let ids: Vec<RecordId> = self
                        .store
                        .values(&key)
                        .map(|set| set.iter().copied().collect())
                        .unwrap_or_default();

                    ids.into_iter()
                        .map(move |id| IndexEntry::new(key.clone(), id))
                })
                .filter(move |entry| filter.allows(entry.id())),
        )
    }
}

///
/// TESTS
///
