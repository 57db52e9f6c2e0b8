// ChainedHashMap public API suite.
//
// Each test documents what behavior is being verified. The core invariants
// exercised:
// - Uniqueness: one entry per key; count = distinct keys put minus removed.
// - Round-trip: get returns the last value put until overwrite/removal.
// - Cleanup: exactly once per discarded value (overwrite, remove, drop).
// - Growth: rehashing past the load factor keeps every entry and value.
// - Traversal: first/next yields each key once; cursors go stale on
//   structural change and are rejected by other maps.
use chained_hashmap::{
    ChainedHashMap, Cursor, Growth, MapError, PolynomialState, PutOutcome, DEFAULT_CAPACITY,
};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn collect_keys<V>(m: &ChainedHashMap<V>) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = m.first();
    while let Some(c) = cur {
        out.push(c.key(m).unwrap().to_string());
        cur = m.next(c).unwrap();
    }
    out
}

// Test: the reference growth scenario.
// Verifies: 20 sequential keys into 4 buckets trigger growth, values survive,
// removal is visible in count and lookups.
#[test]
fn twenty_sequential_keys_grow_and_remove() {
    init_logging();
    let mut m: ChainedHashMap<i32> = ChainedHashMap::with_capacity(4);
    for i in 0..20 {
        m.put(&i.to_string(), i);
    }
    assert_eq!(m.count(), 20);
    assert!(m.bucket_count() > 4, "a rehash should have happened");
    assert_eq!(m.get("17"), Some(&17));

    assert!(m.remove("17"));
    assert_eq!(m.count(), 19);
    assert_eq!(m.get("17"), None);
}

// Test: many inserts into a modest table.
// Verifies: count tracks every insert; every value retrievable afterwards.
#[test]
fn bulk_insert_counts_each_key() {
    init_logging();
    let mut m: ChainedHashMap<(i32, i32)> = ChainedHashMap::with_capacity(100);
    for x in 0..20_000 {
        m.put(&x.to_string(), (x, x + 1));
        assert_eq!(m.len(), x as usize + 1);
    }
    for x in (0..20_000).step_by(997) {
        assert_eq!(m.get(&x.to_string()), Some(&(x, x + 1)));
    }
    assert!(m.load_factor() <= 1.5);
}

// Test: repeated lookups through keys gathered by traversal.
// Verifies: the same key always yields the same value.
#[test]
fn lookups_are_consistent() {
    let mut m: ChainedHashMap<u64> = ChainedHashMap::new();
    let mut s = 0x9e37_79b9_7f4a_7c15u64;
    for x in 0..5_000 {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        m.put(&x.to_string(), s % 1000);
    }
    for k in collect_keys(&m) {
        let first = *m.get(&k).unwrap();
        for _ in 0..10 {
            assert_eq!(m.get(&k), Some(&first));
        }
    }
}

// Test: character frequency counting via get-then-put.
// Verifies: overwrite semantics accumulate correctly and traversal sums match.
#[test]
fn update_counts_characters() {
    let text = "the quick brown fox jumps over the lazy dog, Then Again.";
    let mut m: ChainedHashMap<u32> = ChainedHashMap::with_capacity(10);
    for ch in text.chars() {
        let key = ch.to_string();
        let next = m.get(&key).copied().unwrap_or(0) + 1;
        m.put(&key, next);
    }
    let mut total = 0;
    let mut cur = m.first();
    while let Some(c) = cur {
        total += *c.value(&m).unwrap();
        cur = m.next(c).unwrap();
    }
    assert_eq!(total as usize, text.chars().count());
    assert_eq!(m.get("t"), Some(&2), "case-sensitive: 'T' counted separately");
    assert_eq!(m.get("T"), Some(&1));
}

// Test: delete everything found by traversal.
// Verifies: collected keys can all be removed; the map ends empty.
#[test]
fn delete_every_traversed_key() {
    let mut m: ChainedHashMap<i32> = ChainedHashMap::with_capacity(1000);
    for x in 0..10_000 {
        m.put(&x.to_string(), 1);
    }
    let keys = collect_keys(&m);
    assert_eq!(keys.len(), 10_000);
    for k in &keys {
        assert!(m.remove(k));
    }
    assert_eq!(m.len(), 0);
    assert!(m.first().is_none());
}

// Test: values owning heap data with a cleanup hook.
// Verifies: the hook runs once per removed value, never on taken ones, and
// once per survivor at drop.
#[test]
fn cleanup_counts_match_discards() {
    let calls = Rc::new(Cell::new(0usize));
    let c = calls.clone();
    let mut m: ChainedHashMap<Box<i32>> = ChainedHashMap::with_cleanup(1000, move |v: &mut Box<i32>| {
        **v = -1;
        c.set(c.get() + 1);
    });
    for x in 0..10_000 {
        m.put(&x.to_string(), Box::new(x));
    }
    for x in 0..5_000 {
        assert!(m.remove(&x.to_string()));
    }
    assert_eq!(calls.get(), 5_000);

    let (_, v) = m.take("5000").unwrap();
    assert_eq!(*v, 5000, "taken values skip cleanup");
    assert_eq!(calls.get(), 5_000);

    m.dispose();
    assert_eq!(calls.get(), 9_999);
}

// Test: N distinct inserts then teardown.
// Verifies: exactly N cleanup calls, regardless of rehashes along the way.
#[test]
fn teardown_cleans_each_entry_once() {
    let calls = Rc::new(Cell::new(0usize));
    let c = calls.clone();
    {
        let mut m = ChainedHashMap::builder()
            .capacity_hint(2)
            .cleanup(move |_: &mut u8| c.set(c.get() + 1))
            .build();
        for x in 0..777 {
            m.put(&format!("k{x}"), 0u8);
        }
        assert!(m.bucket_count() > 2);
    }
    assert_eq!(calls.get(), 777);
}

// Test: traversal completeness with a custom multiplier.
// Verifies: every key is visited once and iter() matches first/next order.
#[test]
fn traversal_complete_with_custom_hasher() {
    let mut m = ChainedHashMap::builder()
        .capacity_hint(3)
        .hasher(PolynomialState::with_multiplier(31))
        .build();
    let mut model = BTreeMap::new();
    for x in 0..300 {
        m.put(&format!("{x:x}"), x);
        model.insert(format!("{x:x}"), x);
    }
    let mut via_cursor = Vec::new();
    let mut cur = m.first();
    while let Some(c) = cur {
        via_cursor.push((c.key(&m).unwrap().to_string(), *c.value(&m).unwrap()));
        cur = m.next(c).unwrap();
    }
    let via_iter: Vec<_> = m.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    assert_eq!(via_cursor, via_iter);
    assert_eq!(via_cursor.into_iter().collect::<BTreeMap<_, _>>(), model);
}

// Test: cursors across maps and mutations.
// Verifies: stale and foreign cursors are reported, not followed.
#[test]
fn cursor_misuse_is_detected() {
    let mut a: ChainedHashMap<i32> = ChainedHashMap::new();
    let b: ChainedHashMap<i32> = ChainedHashMap::new();
    for x in 0..5 {
        a.put(&x.to_string(), x);
    }
    let c: Cursor = a.first().unwrap();
    assert_eq!(b.next(c), Err(MapError::ForeignCursor));

    let key = c.key(&a).unwrap().to_string();
    a.remove(&key);
    assert_eq!(a.next(c), Err(MapError::StaleCursor));
    assert_eq!(
        MapError::StaleCursor.to_string(),
        "cursor is stale: the map was structurally modified after it was taken"
    );
}

// Test: default and fixed configurations.
// Verifies: hint 0 picks the default bucket count; fixed growth never rehashes.
#[test]
fn configuration_knobs() {
    let m: ChainedHashMap<()> = ChainedHashMap::default();
    assert_eq!(m.bucket_count(), DEFAULT_CAPACITY);

    let mut fixed: ChainedHashMap<i32> = ChainedHashMap::builder()
        .capacity_hint(100)
        .growth(Growth::Fixed)
        .build();
    for x in 0..20_000 {
        fixed.put(&x.to_string(), 1);
    }
    assert_eq!(fixed.bucket_count(), 100);
    assert_eq!(fixed.load_factor(), 200.0);
}

// Test: put outcomes.
// Verifies: Inserted for new keys, Replaced for existing ones; key uniqueness.
#[test]
fn put_reports_outcome_and_keeps_keys_unique() {
    let mut m: ChainedHashMap<&'static str> = ChainedHashMap::new();
    assert_eq!(m.put("binky", "a"), PutOutcome::Inserted);
    assert_eq!(m.put("BinKy", "b"), PutOutcome::Inserted);
    assert_eq!(m.put("binky", "c"), PutOutcome::Replaced);
    let keys: BTreeSet<_> = m.keys().collect();
    assert_eq!(keys, BTreeSet::from(["BinKy", "binky"]));
    assert_eq!(m.get("binky"), Some(&"c"));
}
