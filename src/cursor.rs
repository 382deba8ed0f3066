//! Cursor: explicit, restartable scan position for the begin/next protocol.
//!
//! The cursor stores a `(bucket, depth)` position instead of a borrow, so the
//! table stays freely mutable between calls. Structural mutation (insert,
//! erase, clear) does not update the position: a scan that straddles one may
//! skip or repeat entries, and a position that no longer resolves ends the
//! scan. Callers restart with `begin` after mutating.

use crate::chain::{Chain, Entry};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Position {
    bucket: usize,
    depth: usize,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Cursor {
    current: Option<Position>,
}

impl Cursor {
    pub(crate) const fn new() -> Self {
        Self { current: None }
    }

    pub(crate) fn reset(&mut self) {
        self.current = None;
    }

    #[cfg(test)]
    pub(crate) fn is_unset(&self) -> bool {
        self.current.is_none()
    }

    /// Point at the head of the first non-empty bucket, or unset.
    pub(crate) fn begin<K, V>(&mut self, buckets: &[Chain<K, V>]) {
        self.current = Self::seek(buckets, 0);
    }

    /// Yield the entry under the cursor and step past it.
    pub(crate) fn advance<'a, K, V>(
        &mut self,
        buckets: &'a [Chain<K, V>],
    ) -> Option<&'a Entry<K, V>> {
        let pos = self.current?;
        let Some(entry) = buckets.get(pos.bucket).and_then(|c| c.nth(pos.depth)) else {
            self.current = None;
            return None;
        };
        self.current = if entry.next.is_some() {
            Some(Position {
                bucket: pos.bucket,
                depth: pos.depth + 1,
            })
        } else {
            Self::seek(buckets, pos.bucket + 1)
        };
        Some(entry)
    }

    fn seek<K, V>(buckets: &[Chain<K, V>], from: usize) -> Option<Position> {
        buckets
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, c)| !c.is_empty())
            .map(|(bucket, _)| Position { bucket, depth: 0 })
    }
}
