//! ChainedHashMap: separate-chaining table with grow-only rehash and an
//! explicit begin/next cursor.

use crate::chain::{self, Chain};
use crate::cursor::Cursor;
use crate::error::LookupError;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use log::{debug, trace};

/// Bucket count used by [`ChainedHashMap::new`].
pub const DEFAULT_CAPACITY: usize = 10;

// Grow when (len + 1) / capacity would exceed 3/2.
const MAX_LOAD_NUMERATOR: usize = 3;
const MAX_LOAD_DENOMINATOR: usize = 2;

pub struct ChainedHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    buckets: Box<[Chain<K, V>]>,
    len: usize,
    cursor: Cursor,
}

fn empty_buckets<K, V>(capacity: usize) -> Box<[Chain<K, V>]> {
    (0..capacity).map(|_| Chain::new()).collect()
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Empty map with [`DEFAULT_CAPACITY`] buckets.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Empty map with `capacity` buckets; zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets. Zero only after `clone_from` an empty map.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        if self.buckets.is_empty() {
            return 0.0;
        }
        self.len as f64 / self.buckets.len() as f64
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drop every entry; the bucket array keeps its size.
    pub fn clear(&mut self) {
        trace!(
            "clear: dropping {} entries across {} buckets",
            self.len,
            self.buckets.len()
        );
        for chain in self.buckets.iter_mut() {
            chain.clear();
        }
        self.len = 0;
        self.cursor.reset();
    }

    /// Start a scan at the first occupied bucket. Only the cursor is touched.
    pub fn begin(&mut self) {
        self.cursor.begin(&*self.buckets);
    }

    /// Return the entry under the cursor and advance past it, or `None`
    /// once the scan is exhausted.
    pub fn next_entry(&mut self) -> Option<(&K, &V)> {
        let entry = self.cursor.advance(&*self.buckets)?;
        Some((&entry.key, &entry.value))
    }

    /// Copy the entry under the cursor into `key`/`value` and advance.
    ///
    /// Returns `false`, leaving the outputs untouched, when the scan is
    /// exhausted. Typical use:
    ///
    /// ```
    /// # use chained_hashmap::ChainedHashMap;
    /// let mut m = ChainedHashMap::new();
    /// m.insert("a".to_string(), 1);
    /// m.insert("b".to_string(), 2);
    ///
    /// let (mut k, mut v) = (String::new(), 0);
    /// let mut total = 0;
    /// m.begin();
    /// while m.next(&mut k, &mut v) {
    ///     total += v;
    /// }
    /// assert_eq!(total, 3);
    /// ```
    ///
    /// Insert, erase and clear invalidate an in-progress scan; call
    /// [`begin`](Self::begin) again afterwards.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self, key: &mut K, value: &mut V) -> bool
    where
        K: Clone,
        V: Clone,
    {
        match self.next_entry() {
            Some((k, v)) => {
                key.clone_from(k);
                value.clone_from(v);
                true
            }
            None => false,
        }
    }

    /// Borrowing iterator in scan order. Independent of the begin/next cursor.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    /// Move every entry into a fresh array of `new_capacity` buckets, appending
    /// at chain tails in old scan order. Nodes are relinked, not rebuilt.
    fn rehash(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(1);
        debug!(
            "rehash: {} -> {} buckets ({} entries)",
            self.buckets.len(),
            new_capacity,
            self.len
        );
        let mut old = core::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        for chain in old.iter_mut() {
            while let Some(node) = chain.pop_front() {
                let idx = bucket_for(node.hash, new_capacity);
                self.buckets[idx].push_back(node);
            }
        }
    }

    fn needs_grow(&self) -> bool {
        let capacity = self.buckets.len();
        capacity == 0
            || MAX_LOAD_DENOMINATOR * (self.len + 1) > MAX_LOAD_NUMERATOR * capacity
    }
}

#[cfg(test)]
impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Every entry sits in bucket `hash % capacity`, its cached hash is
    /// current, keys are unique, and `len` counts exactly the reachable
    /// entries.
    pub(crate) fn assert_layout(&self) {
        let mut total = 0;
        for (i, chain) in self.buckets.iter().enumerate() {
            for e in chain.iter() {
                assert_eq!(e.hash, self.hasher.hash_one(&e.key));
                assert_eq!(bucket_for(e.hash, self.buckets.len()), i);
                assert_eq!(chain.iter().filter(|o| o.key == e.key).count(), 1);
                total += 1;
            }
        }
        assert_eq!(total, self.len);
    }
}

#[inline]
fn bucket_for(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            buckets: empty_buckets(capacity.max(1)),
            len: 0,
            cursor: Cursor::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// `(hash, bucket index)` for `q`, or `None` when there are no buckets.
    fn locate<Q>(&self, q: &Q) -> Option<(u64, usize)>
    where
        Q: ?Sized + Hash,
    {
        if self.buckets.is_empty() {
            return None;
        }
        let hash = self.make_hash(q);
        Some((hash, bucket_for(hash, self.buckets.len())))
    }

    fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (hash, idx) = self.locate(q)?;
        self.buckets[idx].find(hash, q).map(|e| &e.value)
    }

    /// Insert `key -> value` unless `key` is already present.
    ///
    /// Returns `true` if a new entry was created. An existing mapping is left
    /// as is. The load check runs first, so a duplicate insert can still grow
    /// the table.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.needs_grow() {
            self.rehash(self.buckets.len() * 2);
        }
        let hash = self.make_hash(&key);
        let idx = bucket_for(hash, self.buckets.len());
        let chain = &mut self.buckets[idx];
        if chain.find(hash, &key).is_some() {
            return false;
        }
        chain.push_front(key, value, hash);
        self.len += 1;
        true
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).is_some()
    }

    pub fn at<Q>(&self, q: &Q) -> Result<&V, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(LookupError::KeyNotFound)
    }

    pub fn at_mut<Q>(&mut self, q: &Q) -> Result<&mut V, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (hash, idx) = self.locate(q).ok_or(LookupError::KeyNotFound)?;
        self.buckets[idx]
            .find_mut(hash, q)
            .ok_or(LookupError::KeyNotFound)
    }

    /// Remove the mapping for `q` and return its value. Other entries in the
    /// chain keep their relative order.
    pub fn erase<Q>(&mut self, q: &Q) -> Result<V, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (hash, idx) = self.locate(q).ok_or(LookupError::KeyNotFound)?;
        let (_key, value) = self.buckets[idx]
            .remove(hash, q)
            .ok_or(LookupError::KeyNotFound)?;
        self.len -= 1;
        Ok(value)
    }
}

impl<K, V, S> Clone for ChainedHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Deep copy with the same capacity and chain layout; the cursor starts unset.
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            buckets: self.buckets.clone(),
            len: self.len,
            cursor: Cursor::new(),
        }
    }

    /// Discard `self` and copy `source`. An empty source leaves `self` empty
    /// with zero buckets.
    fn clone_from(&mut self, source: &Self) {
        trace!(
            "clone_from: replacing {} entries with {}",
            self.len,
            source.len
        );
        self.buckets = Box::default();
        self.len = 0;
        self.cursor.reset();
        self.hasher = source.hasher.clone();
        if !source.is_empty() {
            self.buckets = source.buckets.clone();
            self.len = source.len;
        }
    }
}

impl<K, V, S> PartialEq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    /// Same key -> value mappings; capacity and insertion order are ignored.
    fn eq(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        if self.len != other.len {
            return false;
        }
        self.iter()
            .all(|(k, v)| other.get(k).map_or(false, |ov| ov == v))
    }
}

impl<K, V, S> Eq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

/// Iterator over `(&K, &V)` in bucket order, then chain order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Chain<K, V>>,
    chain: Option<chain::Iter<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain.as_mut().and_then(|c| c.next()) {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            self.chain = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
