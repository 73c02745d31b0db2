//! End-to-end overlay behavior: every read path against combinations of
//! durable content, pending logs, the cleared flag, and the read filter.

use crate::db::{
    Direction,
    index::{
        Collation, IndexConfig, IndexEntry, IndexReader, Key, OverlayIndex, PlainIndex, RecordId,
        RecordReadFilter, TxState,
    },
};

const IDX: &str = "idx_scores";

fn config() -> IndexConfig {
    IndexConfig::new(IDX, 1, Collation::Cs)
}

fn id(slot: u64) -> RecordId {
    RecordId::new(0, slot)
}

fn keys_of(entries: Vec<IndexEntry>) -> Vec<Key> {
    entries.iter().map(|entry| entry.key().clone()).collect()
}

#[test]
fn merged_scan_interleaves_durable_and_pending_keys() {
    let mut plain = PlainIndex::new(config());
    for k in [1, 3, 5] {
        plain.insert(Key::Int(k), id(u64::try_from(k).expect("positive key") * 10));
    }

    let mut tx = TxState::new();
    let changes = tx.index_changes_mut(IDX);
    changes.record_put(Key::Int(2), id(20));
    changes.record_put(Key::Int(3), id(31));
    changes.record_put(Key::Int(4), id(40));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    let asc: Vec<IndexEntry> = overlay
        .entries_between(&Key::Int(0), true, &Key::Int(9), true, Direction::Asc)
        .collect();
    assert_eq!(
        keys_of(asc.clone()),
        [1, 2, 3, 3, 4, 5].map(Key::Int).to_vec()
    );

    // At the shared key, the durable-sourced entry is emitted first.
    assert_eq!(asc[2].id(), id(30));
    assert_eq!(asc[3].id(), id(31));

    let desc: Vec<IndexEntry> = overlay
        .entries_between(&Key::Int(0), true, &Key::Int(9), true, Direction::Desc)
        .collect();
    assert_eq!(
        keys_of(desc),
        [5, 4, 3, 3, 2, 1].map(Key::Int).to_vec()
    );
}

#[test]
fn pending_removal_suppresses_durable_entries_end_to_end() {
    let mut plain = PlainIndex::new(config());
    plain.insert(Key::Int(10), id(1)); // A
    plain.insert(Key::Int(20), id(2)); // B

    let mut tx = TxState::new();
    let changes = tx.index_changes_mut(IDX);
    changes.record_put(Key::Int(10), id(3)); // C
    changes.record_remove(Key::Int(20), id(2));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    let entries: Vec<IndexEntry> = overlay
        .entries_between(&Key::Int(0), true, &Key::Int(30), true, Direction::Asc)
        .collect();

    assert_eq!(
        entries,
        vec![
            IndexEntry::new(Key::Int(10), id(1)),
            IndexEntry::new(Key::Int(10), id(3)),
        ]
    );
}

#[test]
fn round_trip_put_then_remove_is_absent_from_every_read_path() {
    let plain = PlainIndex::new(config());

    let mut tx = TxState::new();
    let changes = tx.index_changes_mut(IDX);
    changes.record_put(Key::Int(7), id(70));
    changes.record_remove(Key::Int(7), id(70));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    assert_eq!(overlay.get(&Key::Int(7)), None);
    assert!(!overlay.contains(&Key::Int(7)));
    assert_eq!(
        overlay
            .entries_between(&Key::Int(0), true, &Key::Int(10), true, Direction::Asc)
            .count(),
        0
    );
    assert_eq!(
        overlay
            .entries_for_keys(&[Key::Int(7)], Direction::Asc)
            .count(),
        0
    );
}

#[test]
fn single_key_range_returns_exactly_that_keys_net_values() {
    let plain = PlainIndex::new(config());

    let mut tx = TxState::new();
    let changes = tx.index_changes_mut(IDX);
    changes.record_put(Key::Int(1), id(10));
    changes.record_put(Key::Int(2), id(20));
    changes.record_put(Key::Int(2), id(21));
    changes.record_put(Key::Int(3), id(30));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    let entries: Vec<IndexEntry> = overlay
        .entries_between(&Key::Int(2), true, &Key::Int(2), true, Direction::Asc)
        .collect();

    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| entry.key() == &Key::Int(2)));

    let ids: Vec<RecordId> = entries.iter().map(IndexEntry::id).collect();
    assert!(ids.contains(&id(20)) && ids.contains(&id(21)));
}

#[test]
fn cleared_index_hides_all_durable_content() {
    let mut plain = PlainIndex::new(config());
    plain.insert(Key::Int(1), id(10));
    plain.insert(Key::Int(2), id(20));

    let mut tx = TxState::new();
    let changes = tx.index_changes_mut(IDX);
    changes.record_clear();
    changes.record_put(Key::Int(2), id(21));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    assert_eq!(overlay.get(&Key::Int(1)), None);
    assert_eq!(overlay.get(&Key::Int(2)), Some(vec![id(21)]));

    let keys = keys_of(
        overlay
            .entries_between(&Key::Int(0), true, &Key::Int(9), true, Direction::Asc)
            .collect(),
    );
    assert_eq!(keys, vec![Key::Int(2)]);

    let keys = keys_of(
        overlay
            .entries_for_keys(&[Key::Int(1), Key::Int(2)], Direction::Asc)
            .collect(),
    );
    assert_eq!(keys, vec![Key::Int(2)]);
}

#[test]
fn untouched_index_delegates_and_applies_the_legacy_empty_result_shim() {
    let mut plain = PlainIndex::new(config());
    plain.insert(Key::Int(1), id(10));

    // No transaction at all: plain semantics, including the empty collection.
    let overlay = OverlayIndex::new(&plain, None);
    assert_eq!(overlay.get(&Key::Int(1)), Some(vec![id(10)]));
    assert_eq!(overlay.get(&Key::Int(42)), Some(Vec::new()));

    // Open transaction with pending operations on a different index: the
    // empty durable result collapses to "no result".
    let mut tx = TxState::new();
    tx.index_changes_mut("idx_other")
        .record_put(Key::Int(9), id(9));

    let overlay = OverlayIndex::new(&plain, Some(&tx));
    assert_eq!(overlay.get(&Key::Int(1)), Some(vec![id(10)]));
    assert_eq!(overlay.get(&Key::Int(42)), None);
    assert!(!overlay.contains(&Key::Int(42)));

    // Scans delegate wholesale.
    let keys = keys_of(
        overlay
            .entries_between(&Key::Int(0), true, &Key::Int(9), true, Direction::Asc)
            .collect(),
    );
    assert_eq!(keys, vec![Key::Int(1)]);
}

#[test]
fn open_ended_scans_merge_pending_tails() {
    let mut plain = PlainIndex::new(config());
    for k in [1, 5] {
        plain.insert(Key::Int(k), id(u64::try_from(k).expect("positive key") * 10));
    }

    let mut tx = TxState::new();
    let changes = tx.index_changes_mut(IDX);
    changes.record_put(Key::Int(3), id(30));
    changes.record_put(Key::Int(8), id(80));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    let major = keys_of(
        overlay
            .entries_major(&Key::Int(3), true, Direction::Asc)
            .collect(),
    );
    assert_eq!(major, [3, 5, 8].map(Key::Int).to_vec());

    let minor = keys_of(
        overlay
            .entries_minor(&Key::Int(5), true, Direction::Desc)
            .collect(),
    );
    assert_eq!(minor, [5, 3, 1].map(Key::Int).to_vec());
}

#[test]
fn key_set_scan_merges_and_suppresses_per_key() {
    let mut plain = PlainIndex::new(config());
    plain.insert(Key::Int(1), id(10));
    plain.insert(Key::Int(2), id(20));

    let mut tx = TxState::new();
    let changes = tx.index_changes_mut(IDX);
    changes.record_put(Key::Int(3), id(30));
    changes.record_remove(Key::Int(2), id(20));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    let asc = keys_of(
        overlay
            .entries_for_keys(&[Key::Int(3), Key::Int(1), Key::Int(2)], Direction::Asc)
            .collect(),
    );
    assert_eq!(asc, vec![Key::Int(1), Key::Int(3)]);

    let desc = keys_of(
        overlay
            .entries_for_keys(&[Key::Int(3), Key::Int(1), Key::Int(2)], Direction::Desc)
            .collect(),
    );
    assert_eq!(desc, vec![Key::Int(3), Key::Int(1)]);
}

struct EvenSlotsOnly;

impl RecordReadFilter for EvenSlotsOnly {
    fn allows(&self, id: RecordId) -> bool {
        id.slot().is_multiple_of(2)
    }
}

#[test]
fn read_filter_applies_to_durable_and_pending_results() {
    let mut plain = PlainIndex::with_filter(config(), Box::new(EvenSlotsOnly));
    plain.insert(Key::Int(1), id(1));
    plain.insert(Key::Int(1), id(2));

    let mut tx = TxState::new();
    let changes = tx.index_changes_mut(IDX);
    changes.record_put(Key::Int(2), id(3));
    changes.record_put(Key::Int(2), id(4));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    assert_eq!(overlay.get(&Key::Int(1)), Some(vec![id(2)]));
    assert_eq!(overlay.get(&Key::Int(2)), Some(vec![id(4)]));

    let ids: Vec<RecordId> = overlay
        .entries_between(&Key::Int(0), true, &Key::Int(9), true, Direction::Asc)
        .map(|entry| entry.id())
        .collect();
    assert_eq!(ids, vec![id(2), id(4)]);
}

#[test]
fn case_insensitive_index_merges_across_key_spellings() {
    let mut plain = PlainIndex::new(IndexConfig::new(IDX, 1, Collation::Ci));
    plain.insert(Key::from("Ada"), id(1));

    let mut tx = TxState::new();
    tx.index_changes_mut(IDX)
        .record_put(Key::from("ada"), id(2));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    let ids = overlay.get(&Key::from("ADA")).expect("merged result");
    assert_eq!(ids, vec![id(1), id(2)]);
}

#[test]
fn composite_range_scan_honors_partial_key_widening() {
    let dept = |d: i64| Key::composite([Key::Int(d)]).expect("composite key");
    let pair = |d: i64, n: &str| Key::composite([Key::Int(d), Key::from(n)]).expect("composite key");

    let mut plain = PlainIndex::new(IndexConfig::new(IDX, 2, Collation::Cs));
    plain.insert(pair(1, "a"), id(1));
    plain.insert(pair(2, "b"), id(2));

    let mut tx = TxState::new();
    let changes = tx.index_changes_mut(IDX);
    changes.record_put(pair(2, "c"), id(3));
    changes.record_put(pair(3, "d"), id(4));

    let overlay = OverlayIndex::new(&plain, Some(&tx));

    // Inclusive partial bounds cover the whole [2, *] subtree.
    let keys = keys_of(
        overlay
            .entries_between(&dept(2), true, &dept(2), true, Direction::Asc)
            .collect(),
    );
    assert_eq!(keys, vec![pair(2, "b"), pair(2, "c")]);

    // An exclusive partial lower bound skips the subtree entirely.
    let keys = keys_of(
        overlay
            .entries_between(&dept(2), false, &dept(3), true, Direction::Asc)
            .collect(),
    );
    assert_eq!(keys, vec![pair(3, "d")]);
}
