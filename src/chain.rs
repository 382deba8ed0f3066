//! Chain: an owning singly linked list of entries sharing one bucket.

use core::borrow::Borrow;

pub(crate) type Link<K, V> = Option<Box<Entry<K, V>>>;

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // Cached so relocation never calls back into `K: Hash`.
    pub(crate) hash: u64,
    pub(crate) next: Link<K, V>,
}

impl<K, V> Entry<K, V> {
    fn matches<Q>(&self, hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.hash == hash && self.key.borrow() == key
    }
}

#[derive(Debug)]
pub(crate) struct Chain<K, V> {
    head: Link<K, V>,
}

impl<K, V> Chain<K, V> {
    pub(crate) const fn new() -> Self {
        Self { head: None }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Entry `depth` links past the head, if the chain is that long.
    pub(crate) fn nth(&self, depth: usize) -> Option<&Entry<K, V>> {
        self.iter().nth(depth)
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    pub(crate) fn find<Q>(&self, hash: u64, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.iter().find(|e| e.matches(hash, key))
    }

    pub(crate) fn find_mut<Q>(&mut self, hash: u64, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.head.as_deref_mut();
        while let Some(entry) = cur {
            if entry.matches(hash, key) {
                return Some(&mut entry.value);
            }
            cur = entry.next.as_deref_mut();
        }
        None
    }

    /// Allocate a new entry in front of the current head.
    pub(crate) fn push_front(&mut self, key: K, value: V, hash: u64) {
        let next = self.head.take();
        self.head = Some(Box::new(Entry {
            key,
            value,
            hash,
            next,
        }));
    }

    /// Re-link an existing node after the current tail.
    pub(crate) fn push_back(&mut self, mut node: Box<Entry<K, V>>) {
        node.next = None;
        let mut slot = &mut self.head;
        while let Some(entry) = slot {
            slot = &mut entry.next;
        }
        *slot = Some(node);
    }

    /// Detach the head node; the returned box keeps its allocation.
    pub(crate) fn pop_front(&mut self) -> Option<Box<Entry<K, V>>> {
        let mut node = self.head.take()?;
        self.head = node.next.take();
        Some(node)
    }

    /// Unlink the entry for `key`, splicing its predecessor to its successor.
    pub(crate) fn remove<Q>(&mut self, hash: u64, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut slot = &mut self.head;
        while slot.as_ref().map_or(false, |e| !e.matches(hash, key)) {
            slot = &mut slot.as_mut()?.next;
        }
        let mut node = slot.take()?;
        *slot = node.next.take();
        Some((node.key, node.value))
    }

    pub(crate) fn clear(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

impl<K: Clone, V: Clone> Clone for Chain<K, V> {
    /// Deep copy preserving chain order.
    fn clone(&self) -> Self {
        let mut out = Chain::new();
        let mut slot = &mut out.head;
        for e in self.iter() {
            let node = slot.insert(Box::new(Entry {
                key: e.key.clone(),
                value: e.value.clone(),
                hash: e.hash,
                next: None,
            }));
            slot = &mut node.next;
        }
        out
    }
}

impl<K, V> Drop for Chain<K, V> {
    // Iterative unlink; the default recursive drop can overflow on long chains.
    fn drop(&mut self) {
        self.clear();
    }
}

pub(crate) struct Iter<'a, K, V> {
    next: Option<&'a Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = self.next?;
        self.next = e.next.as_deref();
        Some(e)
    }
}
