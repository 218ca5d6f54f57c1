//! Integrity properties of the index under sequential and concurrent use.

use std::sync::Arc;
use std::thread;

use hubro::index::{Index, IndexEntry, IndexError, SortMode};

fn entry(id: &str) -> IndexEntry {
    IndexEntry {
        id: id.to_string(),
        slug: format!("slug-{id}"),
        title: format!("Title {id}"),
        path: format!("/{id}"),
        ..Default::default()
    }
}

#[test]
fn count_tracks_successful_adds() {
    let idx = Index::new("pages", "/page", SortMode::SortOrder);

    let mut successes = 0;
    for id in ["a", "b", "c", "", "a", "d"] {
        if idx.add_entry(entry(id)).is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 4);
    assert_eq!(idx.count(), 4);
    for id in ["a", "b", "c", "d"] {
        let got = idx.get_entry(id).unwrap();
        assert_eq!(got.id, id);
        assert_eq!(got.title, format!("Title {id}"));
    }
}

#[test]
fn failed_adds_leave_state_untouched() {
    let idx = Index::new("pages", "/", SortMode::SortOrder);
    idx.add_entry(entry("a")).unwrap();
    let before = idx.entries();

    assert_eq!(idx.add_entry(entry("")), Err(IndexError::EmptyId));
    assert!(matches!(
        idx.add_entry(entry("a")),
        Err(IndexError::DuplicateId { .. })
    ));

    let after = idx.entries();
    assert_eq!(before.len(), after.len());
    assert_eq!(before[0].id, after[0].id);
}

#[test]
fn concurrent_adds_with_unique_ids_all_succeed() {
    const THREADS: usize = 10;
    const ENTRIES_PER_THREAD: usize = 100;

    let idx = Arc::new(Index::new("concurrent", "/", SortMode::SortOrder));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let idx = Arc::clone(&idx);
            thread::spawn(move || {
                for e in 0..ENTRIES_PER_THREAD {
                    idx.add_entry(entry(&format!("entry-{t}-{e}"))).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(idx.count(), THREADS * ENTRIES_PER_THREAD);

    // Every id resolves through both lookup paths; no map corruption.
    for t in 0..THREADS {
        for e in 0..ENTRIES_PER_THREAD {
            let id = format!("entry-{t}-{e}");
            assert_eq!(idx.get_entry(&id).unwrap().id, id);
            assert_eq!(idx.get_entry_by_slug(&format!("slug-{id}")).unwrap().id, id);
        }
    }
}

#[test]
fn concurrent_readers_see_consistent_lookups_during_writes() {
    let idx = Arc::new(Index::new("mixed", "/", SortMode::SortOrder));
    for n in 0..50 {
        idx.add_entry(entry(&format!("base-{n}"))).unwrap();
    }

    let writer = {
        let idx = Arc::clone(&idx);
        thread::spawn(move || {
            for n in 0..200 {
                idx.add_entry(entry(&format!("new-{n}"))).unwrap();
                idx.sort();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let idx = Arc::clone(&idx);
            thread::spawn(move || {
                for _ in 0..200 {
                    let view = idx.read();
                    // The sequence and lookup maps must agree inside one guard.
                    for e in view.entries() {
                        assert_eq!(view.get_entry(&e.id).unwrap().id, e.id);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(idx.count(), 250);
}

#[test]
fn sorted_sequences_are_monotonic() {
    let by_order = Index::new("pages", "/", SortMode::SortOrder);
    let by_date = Index::new("blog", "/", SortMode::Date);

    for n in 0..20i64 {
        let mut e = entry(&format!("p-{n}"));
        e.sort_order = (97 * n) % 13;
        by_order.add_entry(e).unwrap();

        let mut e = entry(&format!("b-{n}"));
        e.date = chrono::DateTime::from_timestamp(1_700_000_000 + (31 * n) % 17, 0).unwrap();
        by_date.add_entry(e).unwrap();
    }

    by_order.sort();
    let orders: Vec<_> = by_order.entries().iter().map(|e| e.sort_order).collect();
    assert!(orders.windows(2).all(|w| w[0] <= w[1]));

    by_date.sort();
    let dates: Vec<_> = by_date.entries().iter().map(|e| e.date).collect();
    assert!(dates.windows(2).all(|w| w[0] >= w[1]));
}
