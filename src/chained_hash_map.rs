//! ChainedHashMap: bucket array of singly linked chains with cleanup hooks.

use crate::config::{Builder, Cleanup, MapConfig};
use crate::cursor::Cursor;
use crate::error::MapError;
use crate::polynomial::{hash_key, PolynomialState};
use crate::reentrancy::ReentrancyCheck;
use core::fmt;
use core::hash::BuildHasher;
use core::iter::FusedIterator;
use core::sync::atomic::{AtomicU64, Ordering};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generational key of an entry in the map's storage.
    pub(crate) struct EntryKey;
}

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

/// Result of [`ChainedHashMap::put`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PutOutcome {
    /// A new entry was created.
    Inserted,
    /// The key existed; the old value went through cleanup.
    Replaced,
}

#[derive(Debug)]
struct Entry<V> {
    key: Box<str>,
    value: V,
    hash: u64,
    next: Option<EntryKey>, // chain link
}

/// Structural state: buckets and the entries they chain together.
///
/// Entries never move in `slots`; chains and rehashing only rewrite `next`
/// links and bucket heads. `epoch` changes whenever the set of entries or
/// their chain positions change.
struct Chains<V> {
    buckets: Vec<Option<EntryKey>>,
    slots: SlotMap<EntryKey, Entry<V>>,
    epoch: u64,
}

impl<V> Chains<V> {
    fn with_buckets(n: usize) -> Self {
        Self {
            buckets: vec![None; n],
            slots: SlotMap::with_key(),
            epoch: 0,
        }
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    fn load_factor(&self) -> f64 {
        self.slots.len() as f64 / self.buckets.len() as f64
    }

    fn find(&self, key: &str, hash: u64) -> Option<EntryKey> {
        let mut cur = self.buckets[self.bucket_of(hash)];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash && *e.key == *key {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    /// Splice a new entry onto the front of its bucket's chain.
    fn link(&mut self, key: &str, hash: u64, value: V) -> EntryKey {
        let bucket = self.bucket_of(hash);
        let k = self.slots.insert(Entry {
            key: key.into(),
            value,
            hash,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = Some(k);
        self.epoch += 1;
        k
    }

    /// Splice the entry for `key` out of its chain and hand it back.
    fn unlink(&mut self, key: &str, hash: u64) -> Option<Entry<V>> {
        let bucket = self.bucket_of(hash);
        let mut prev: Option<EntryKey> = None;
        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash && *e.key == *key {
                let next = e.next;
                match prev {
                    None => self.buckets[bucket] = next,
                    Some(p) => self.slots[p].next = next,
                }
                self.epoch += 1;
                return self.slots.remove(k);
            }
            prev = cur;
            cur = e.next;
        }
        None
    }

    fn rehash(&mut self, new_count: usize) {
        let old = core::mem::replace(&mut self.buckets, vec![None; new_count]);
        let old_count = old.len();
        for head in old {
            let mut cur = head;
            while let Some(k) = cur {
                let entry = &mut self.slots[k];
                cur = entry.next;
                let bucket = (entry.hash % new_count as u64) as usize;
                entry.next = self.buckets[bucket];
                self.buckets[bucket] = Some(k);
            }
        }
        self.epoch += 1;
        log::debug!(
            "rehashed {} entries from {} to {} buckets",
            self.slots.len(),
            old_count,
            new_count
        );
    }

    fn take_all(&mut self) -> SlotMap<EntryKey, Entry<V>> {
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.epoch += 1;
        core::mem::replace(&mut self.slots, SlotMap::with_key())
    }

    /// First chain head at or after bucket `start`.
    fn head_from(&self, start: usize) -> Option<(usize, EntryKey)> {
        self.buckets
            .get(start..)?
            .iter()
            .enumerate()
            .find_map(|(i, head)| head.map(|k| (start + i, k)))
    }

    /// Position after `k`: rest of the chain, then later buckets.
    fn successor(&self, bucket: usize, k: EntryKey) -> Option<(usize, EntryKey)> {
        match self.slots.get(k)?.next {
            Some(n) => Some((bucket, n)),
            None => self.head_from(bucket + 1),
        }
    }
}

/// Hash map from string keys to `V` using separate chaining.
///
/// Keys are copied into the map on insert. Values overwritten by `put`,
/// removed by `remove`/`clear`, or still present when the map is dropped are
/// passed to the optional cleanup hook exactly once before being dropped.
///
/// Traversal uses [`Cursor`] tokens from [`first`](Self::first) and
/// [`next`](Self::next): any number of traversals may be in flight at once,
/// but a structural change (a new key, a removal, a rehash) invalidates all
/// outstanding cursors and `next` reports [`MapError::StaleCursor`].
pub struct ChainedHashMap<V, S = PolynomialState> {
    hasher: S,
    chains: Chains<V>,
    config: MapConfig,
    cleanup: Option<Cleanup<V>>,
    id: u64,
    reentrancy: ReentrancyCheck,
}

impl<V> ChainedHashMap<V> {
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// `capacity_hint` buckets up front; 0 selects the default of 199.
    pub fn with_capacity(capacity_hint: usize) -> Self {
        Self::builder().capacity_hint(capacity_hint).build()
    }

    pub fn with_cleanup<F>(capacity_hint: usize, cleanup: F) -> Self
    where
        F: FnMut(&mut V) + 'static,
    {
        Self::builder()
            .capacity_hint(capacity_hint)
            .cleanup(cleanup)
            .build()
    }

    pub fn builder() -> Builder<V> {
        Builder::new()
    }
}

impl<V> Default for ChainedHashMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S: BuildHasher> ChainedHashMap<V, S> {
    pub(crate) fn from_parts(config: MapConfig, hasher: S, cleanup: Option<Cleanup<V>>) -> Self {
        config.validate();
        let buckets = config.initial_buckets();
        let id = NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed);
        log::trace!("chained map #{id}: {buckets} buckets, {config:?}");
        Self {
            hasher,
            chains: Chains::with_buckets(buckets),
            config,
            cleanup,
            id,
            reentrancy: ReentrancyCheck::new(),
        }
    }

    pub fn with_hasher(hasher: S) -> Self {
        Self::from_parts(MapConfig::default(), hasher, None)
    }

    /// Associate `key` with `value`. An existing value is replaced in place
    /// and handed to the cleanup hook; a new key may trigger a rehash.
    pub fn put(&mut self, key: &str, value: V) -> PutOutcome {
        let replaced = {
            let _s = self.reentrancy.section();
            let hash = hash_key(&self.hasher, key);
            match self.chains.find(key, hash) {
                Some(k) => Some(core::mem::replace(&mut self.chains.slots[k].value, value)),
                None => {
                    self.chains.link(key, hash, value);
                    if self.chains.load_factor() > self.config.max_load_factor {
                        let current = self.chains.buckets.len();
                        if let Some(n) = self.config.growth.next_bucket_count(current) {
                            self.chains.rehash(n);
                        }
                    }
                    None
                }
            }
        };
        match replaced {
            Some(old) => {
                self.discard(old);
                PutOutcome::Replaced
            }
            None => PutOutcome::Inserted,
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let _s = self.reentrancy.section();
        let hash = hash_key(&self.hasher, key);
        let k = self.chains.find(key, hash)?;
        Some(&self.chains.slots[k].value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let _s = self.reentrancy.section();
        let hash = hash_key(&self.hasher, key);
        let k = self.chains.find(key, hash)?;
        Some(&mut self.chains.slots[k].value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let _s = self.reentrancy.section();
        let hash = hash_key(&self.hasher, key);
        self.chains.find(key, hash).is_some()
    }

    /// Remove `key`, running cleanup on its value. Returns whether it was
    /// present; an absent key leaves the map untouched.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.unlink(key) {
            Some(entry) => {
                self.discard(entry.value);
                true
            }
            None => false,
        }
    }

    /// Remove `key` and return ownership of its key and value. Cleanup does
    /// not run; the caller now owns the value.
    pub fn take(&mut self, key: &str) -> Option<(Box<str>, V)> {
        self.unlink(key).map(|e| (e.key, e.value))
    }

    fn unlink(&mut self, key: &str) -> Option<Entry<V>> {
        let _s = self.reentrancy.section();
        let hash = hash_key(&self.hasher, key);
        self.chains.unlink(key, hash)
    }
}

impl<V, S> ChainedHashMap<V, S> {
    pub fn len(&self) -> usize {
        self.chains.slots.len()
    }

    /// Same as [`len`](Self::len).
    pub fn count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.slots.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.chains.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.chains.load_factor()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Remove every entry, running cleanup on each value. The bucket count
    /// is kept.
    pub fn clear(&mut self) {
        let drained = {
            let _s = self.reentrancy.section();
            self.chains.take_all()
        };
        log::debug!("chained map #{}: clearing {} entries", self.id, drained.len());
        for (_, entry) in drained {
            self.discard(entry.value);
        }
    }

    /// Tear the map down. Equivalent to dropping it.
    pub fn dispose(self) {
        drop(self)
    }

    fn discard(&mut self, mut value: V) {
        if let Some(cleanup) = self.cleanup.as_mut() {
            cleanup(&mut value);
        }
    }

    /// Cursor at the first key in bucket-then-chain order, or `None` if the
    /// map is empty. The order is unrelated to insertion order.
    pub fn first(&self) -> Option<Cursor> {
        let _s = self.reentrancy.section();
        self.chains
            .head_from(0)
            .map(|(bucket, entry)| self.cursor_at(bucket, entry))
    }

    /// Cursor at the key after `prev`, or `Ok(None)` once every bucket is
    /// exhausted. `prev` must come from this map with no structural change
    /// since it was taken.
    pub fn next(&self, prev: Cursor) -> Result<Option<Cursor>, MapError> {
        let _s = self.reentrancy.section();
        self.check_cursor(&prev)?;
        Ok(self
            .chains
            .successor(prev.bucket, prev.entry)
            .map(|(bucket, entry)| self.cursor_at(bucket, entry)))
    }

    fn cursor_at(&self, bucket: usize, entry: EntryKey) -> Cursor {
        Cursor {
            map_id: self.id,
            epoch: self.chains.epoch,
            bucket,
            entry,
        }
    }

    fn check_cursor(&self, c: &Cursor) -> Result<(), MapError> {
        if c.map_id != self.id {
            return Err(MapError::ForeignCursor);
        }
        if c.epoch != self.chains.epoch {
            return Err(MapError::StaleCursor);
        }
        Ok(())
    }

    pub(crate) fn cursor_entry(&self, c: &Cursor) -> Option<(&str, &V)> {
        self.check_cursor(c).ok()?;
        self.chains.slots.get(c.entry).map(|e| (&*e.key, &e.value))
    }

    pub(crate) fn cursor_value_mut(&mut self, c: &Cursor) -> Option<&mut V> {
        self.check_cursor(c).ok()?;
        self.chains.slots.get_mut(c.entry).map(|e| &mut e.value)
    }

    /// Entries in the same order as `first`/`next`.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            chains: &self.chains,
            pos: self.chains.head_from(0),
            remaining: self.chains.slots.len(),
        }
    }

    /// Mutable access to every value. Order follows storage, not buckets.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            it: self.chains.slots.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<V, S> Drop for ChainedHashMap<V, S> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.as_mut() {
            for (_, mut entry) in self.chains.slots.drain() {
                cleanup(&mut entry.value);
            }
        }
    }
}

impl<V: fmt::Debug, S> fmt::Debug for ChainedHashMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(key, value)` in bucket-then-chain order.
pub struct Iter<'a, V> {
    chains: &'a Chains<V>,
    pos: Option<(usize, EntryKey)>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (bucket, k) = self.pos?;
        let chains = self.chains;
        let e = &chains.slots[k];
        self.pos = match e.next {
            Some(n) => Some((bucket, n)),
            None => chains.head_from(bucket + 1),
        };
        self.remaining -= 1;
        Some((&*e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// Iterator over `(key, &mut value)`.
pub struct IterMut<'a, V> {
    it: slotmap::basic::IterMut<'a, EntryKey, Entry<V>>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (&'a str, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&*e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, V, S> IntoIterator for &'a ChainedHashMap<V, S> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}
