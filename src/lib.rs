//! chained-hashmap: a single-threaded separate-chaining HashMap with an
//! explicit, restartable begin/next cursor.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a plain hash table whose chain maintenance, growth policy and
//!   iteration state are all visible and testable.
//! - Layers:
//!   - Chain<K, V>: owning singly linked list (`Option<Box<Entry>>` links)
//!     with head insertion, tail relinking and in-place unlinking.
//!   - Cursor: `(bucket, depth)` scan position used by `begin`/`next`.
//!   - ChainedHashMap<K, V, S>: bucket array, size accounting, growth and
//!     the public API.
//!
//! Constraints
//! - Single-threaded: no locking, no atomics.
//! - Unique keys; a duplicate `insert` is a silent no-op reported through its
//!   `bool` result.
//! - Grow-only: the table doubles when `(len + 1) / capacity` would exceed
//!   1.5, checked before placement. Erase and clear never shrink it.
//! - Strict tree ownership: map -> bucket array -> chain heads -> boxed
//!   successors. No back-references, no `unsafe`.
//!
//! Hasher and rehashing invariants
//! - Each entry caches its `u64` hash. Bucket index is `hash % capacity`.
//!   Rehash relinks the existing boxes using the cached hash, appending to
//!   chain tails in old scan order, so `K: Hash` is never called there.
//!
//! Iteration
//! - `begin()` points the cursor at the first occupied bucket; `next()`
//!   copies out the current pair and advances. The cursor holds positions,
//!   not borrows, so mutation between calls is allowed by the type system
//!   but voids the scan's guarantees; restart with `begin()`.
//! - `iter()` is a borrowing iterator over the same order, independent of
//!   the cursor.
//!
//! Zero capacity
//! - `clone_from` an empty map leaves zero buckets. Lookups report absence,
//!   `erase` fails, and the next `insert` grows to one bucket.

mod chain;
pub mod chained_hash_map;
#[cfg(test)]
mod chained_hash_map_proptest;
mod cursor;
mod error;

// Public surface
pub use chained_hash_map::{ChainedHashMap, Iter, DEFAULT_CAPACITY};
pub use error::LookupError;
