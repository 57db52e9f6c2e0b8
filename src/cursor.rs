//! Iteration tokens for [`ChainedHashMap::first`] / [`ChainedHashMap::next`].

use crate::chained_hash_map::{ChainedHashMap, EntryKey};

/// Position of one key inside a particular map.
///
/// A cursor is a plain `Copy` value; holding one does not borrow the map, so
/// several traversals can be interleaved freely. It records the map it came
/// from and the map's structural epoch, and stops resolving once either no
/// longer matches.
///
/// ```
/// use chained_hashmap::ChainedHashMap;
///
/// let mut m: ChainedHashMap<u32> = ChainedHashMap::new();
/// m.put("a", 1);
/// m.put("b", 2);
///
/// let mut total = 0;
/// let mut cur = m.first();
/// while let Some(c) = cur {
///     total += c.value(&m).unwrap();
///     cur = m.next(c).unwrap();
/// }
/// assert_eq!(total, 3);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Cursor {
    pub(crate) map_id: u64,
    pub(crate) epoch: u64,
    pub(crate) bucket: usize,
    pub(crate) entry: EntryKey,
}

impl Cursor {
    /// Bucket the key lives in.
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    pub fn key<'a, V, S>(&self, map: &'a ChainedHashMap<V, S>) -> Option<&'a str> {
        map.cursor_entry(self).map(|(k, _)| k)
    }

    pub fn value<'a, V, S>(&self, map: &'a ChainedHashMap<V, S>) -> Option<&'a V> {
        map.cursor_entry(self).map(|(_, v)| v)
    }

    /// Mutating a value in place is not a structural change; the cursor
    /// stays valid.
    pub fn value_mut<'a, V, S>(&self, map: &'a mut ChainedHashMap<V, S>) -> Option<&'a mut V> {
        map.cursor_value_mut(self)
    }
}
