#![cfg(test)]

// Property tests for ChainedHashMap, kept inside the crate next to the unit
// tests so they run against the same build configuration.

use crate::chained_hash_map::{ChainedHashMap, PutOutcome};
use crate::config::Growth;
use crate::cursor::Cursor;
use crate::error::MapError;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

// Pool-indexed operations so shrinking moves toward earlier keys and shorter
// op lists.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Take(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Traverse,
    HoldCursor,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-zA-Z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            idx.clone().prop_map(Op::Remove),
            idx.clone().prop_map(Op::Take),
            idx.clone().prop_map(Op::Get),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-zA-Z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(Op::Contains),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            Just(Op::Traverse),
            Just(Op::HoldCursor),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

fn traverse<V, S>(m: &ChainedHashMap<V, S>) -> Vec<String> {
    let mut keys = Vec::new();
    let mut cur = m.first();
    while let Some(c) = cur {
        keys.push(c.key(m).expect("cursor resolves").to_string());
        cur = m.next(c).expect("no mutation during traversal");
    }
    keys
}

// Drives one scenario against `sut`, checking it against a std HashMap model.
// Invariants exercised:
// - put/get round-trip and overwrite semantics (count unchanged on overwrite).
// - remove on absent keys is a no-op; on present keys cleanup runs once.
// - take returns the model value and runs no cleanup.
// - first/next yields each live key exactly once.
// - A held cursor goes stale exactly when a structural change happens.
// - Cleanup sees exactly the values the model discards.
fn run_scenario<S: BuildHasher>(
    mut sut: ChainedHashMap<i32, S>,
    cleaned: Rc<RefCell<Vec<i32>>>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut expected_cleaned: Vec<i32> = Vec::new();
    let mut held: Option<(Cursor, bool)> = None; // (cursor, structural change since)

    for op in ops {
        let mut structural = false;
        match op {
            Op::Put(i, v) => {
                let k = &pool[i];
                let outcome = sut.put(k, v);
                match model.insert(k.clone(), v) {
                    Some(old) => {
                        prop_assert_eq!(outcome, PutOutcome::Replaced);
                        expected_cleaned.push(old);
                    }
                    None => {
                        prop_assert_eq!(outcome, PutOutcome::Inserted);
                        structural = true;
                    }
                }
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let removed = sut.remove(k);
                match model.remove(k) {
                    Some(old) => {
                        prop_assert!(removed);
                        expected_cleaned.push(old);
                        structural = true;
                    }
                    None => prop_assert!(!removed),
                }
                prop_assert!(sut.get(k).is_none());
            }
            Op::Take(i) => {
                let k = &pool[i];
                let taken = sut.take(k);
                let mv = model.remove(k);
                prop_assert_eq!(taken.as_ref().map(|(_, v)| *v), mv);
                if let Some((tk, _)) = taken {
                    prop_assert_eq!(&*tk, k.as_str());
                    structural = true;
                }
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence differs from model"),
                }
            }
            Op::Traverse => {
                let keys = traverse(&sut);
                let unique: BTreeSet<_> = keys.iter().cloned().collect();
                prop_assert_eq!(unique.len(), keys.len(), "a key was visited twice");
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(unique, m_keys);
            }
            Op::HoldCursor => {
                held = sut.first().map(|c| (c, false));
            }
        }

        if let Some((c, changed)) = held.as_mut() {
            *changed |= structural;
            let res = sut.next(*c);
            if *changed {
                prop_assert_eq!(res, Err(MapError::StaleCursor));
            } else {
                prop_assert!(res.is_ok());
            }
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.load_factor() <= 1.5 || sut.config().growth == Growth::Fixed);
        prop_assert_eq!(&*cleaned.borrow(), &expected_cleaned);
    }

    // Teardown cleans every remaining value once.
    let live: Vec<i32> = model.values().copied().collect();
    drop(sut);
    let mut got = cleaned.borrow()[expected_cleaned.len()..].to_vec();
    let mut want = live;
    got.sort();
    want.sort();
    prop_assert_eq!(got, want);
    Ok(())
}

fn recording() -> (Rc<RefCell<Vec<i32>>>, impl FnMut(&mut i32) + 'static) {
    let cleaned = Rc::new(RefCell::new(Vec::new()));
    let sink = cleaned.clone();
    (cleaned, move |v: &mut i32| sink.borrow_mut().push(*v))
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    // Small initial table so growth happens within most scenarios.
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), hint in 1usize..6) {
        let (cleaned, cleanup) = recording();
        let sut = ChainedHashMap::builder().capacity_hint(hint).cleanup(cleanup).build();
        run_scenario(sut, cleaned, &pool, ops)?;
    }

    // Same invariants with every key in one chain.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let (cleaned, cleanup) = recording();
        let sut = ChainedHashMap::builder()
            .capacity_hint(3)
            .cleanup(cleanup)
            .hasher(ConstBuildHasher)
            .build();
        run_scenario(sut, cleaned, &pool, ops)?;
    }

    // Fixed-size table: chains grow without bound, contract unchanged.
    #[test]
    fn prop_state_machine_fixed((pool, ops) in arb_scenario()) {
        let (cleaned, cleanup) = recording();
        let sut = ChainedHashMap::builder()
            .capacity_hint(2)
            .growth(Growth::Fixed)
            .cleanup(cleanup)
            .build();
        run_scenario(sut, cleaned, &pool, ops)?;
    }
}
