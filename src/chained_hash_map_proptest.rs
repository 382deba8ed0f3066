#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can check
// bucket layout after every step.

use crate::chained_hash_map::ChainedHashMap;
use crate::error::LookupError;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations: indices shrink to earlier keys, pool length
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Erase(usize),
    At(usize),
    Mutate(usize, i32),
    Contains(String),
    Clear,
    Scan,
    CloneAndCompare,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    (0usize..6, proptest::collection::vec("[a-z]{0,5}", 1..=12)).prop_flat_map(|(cap, pool)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Erase),
            1 => idx.clone().prop_map(OpI::At),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Scan),
            1 => Just(OpI::CloneAndCompare),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (cap, pool.clone(), ops))
    })
}

// Drive `sut` and a std HashMap model through the same ops. Invariants
// checked after every op:
// - First insert wins; duplicates return false and leave the value alone.
// - `erase` returns the model's value or KeyNotFound without side effects.
// - A full begin/next scan yields exactly the model's pairs, once each.
// - Clones compare equal and are unaffected by later mutation of the source.
// - Layout: each entry in its `hash % capacity` bucket, len parity.
// - Capacity never shrinks.
fn run_state_machine<S>(
    mut sut: ChainedHashMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut snapshots: Vec<(ChainedHashMap<Key, i32, S>, HashMap<Key, i32>)> = Vec::new();

    for op in ops {
        let cap_before = sut.capacity();
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let inserted = sut.insert(k.clone(), v);
                prop_assert_eq!(inserted, !already);
                model.entry(k).or_insert(v);
            }
            OpI::Erase(i) => {
                let k = key_from(pool, i);
                match model.remove(&k) {
                    Some(mv) => {
                        prop_assert_eq!(sut.erase(&k), Ok(mv));
                    }
                    None => {
                        prop_assert_eq!(sut.erase(&k), Err(LookupError::KeyNotFound));
                    }
                }
                prop_assert!(!sut.contains(&k));
            }
            OpI::At(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.at(&k).ok(), model.get(&k));
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.at_mut(&k), model.get_mut(&k)) {
                    (Ok(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (Err(LookupError::KeyNotFound), None) => {}
                    (s, m) => {
                        prop_assert!(false, "at_mut {:?} vs model {:?}", s, m);
                    }
                }
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains(s.as_str()), has_model);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap_before);
            }
            OpI::Scan => {
                let mut seen: BTreeMap<Key, i32> = BTreeMap::new();
                let (mut k, mut v) = (Key(String::new()), 0);
                sut.begin();
                while sut.next(&mut k, &mut v) {
                    prop_assert!(seen.insert(k.clone(), v).is_none(), "visited twice: {:?}", k);
                }
                let expected: BTreeMap<Key, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen, expected);
            }
            OpI::CloneAndCompare => {
                let c = sut.clone();
                prop_assert!(c == sut);
                prop_assert_eq!(c.capacity(), sut.capacity());
                c.assert_layout();
                snapshots.push((c, model.clone()));
            }
        }

        prop_assert!(sut.capacity() >= cap_before);
        prop_assert!(sut.capacity() >= 1);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.assert_layout();
    }

    // Snapshots must still reflect the model at the time they were taken.
    for (snap, snap_model) in &snapshots {
        prop_assert_eq!(snap.len(), snap_model.len());
        for (k, v) in snap_model {
            prop_assert_eq!(snap.at(k), Ok(v));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((cap, pool, ops) in arb_scenario()) {
        let sut: ChainedHashMap<Key, i32> = ChainedHashMap::with_capacity(cap);
        run_state_machine(sut, &pool, ops)?;
    }
}

// Collision variant: every key hashes to zero, so everything shares bucket 0
// and chain unlinking is exercised at every position.
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

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((cap, pool, ops) in arb_scenario()) {
        let sut: ChainedHashMap<Key, i32, ConstBuildHasher> =
            ChainedHashMap::with_capacity_and_hasher(cap, ConstBuildHasher);
        run_state_machine(sut, &pool, ops)?;
    }
}

// Property: the capacity after n distinct inserts follows the doubling rule
// from the starting capacity, independent of the keys.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_follows_doubling_rule(cap in 1usize..16, n in 0u32..200) {
        let mut sut: ChainedHashMap<u32, u32> = ChainedHashMap::with_capacity(cap);
        let mut expected = cap;
        for k in 0..n {
            if 2 * (k as usize + 1) > 3 * expected {
                expected *= 2;
            }
            sut.insert(k, k);
            prop_assert_eq!(sut.capacity(), expected);
        }
        prop_assert!(sut.load_factor() <= 1.5);
    }
}
