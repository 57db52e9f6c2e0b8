//! ByteMap: type-erased values of a fixed byte size atop ChainedHashMap.
//!
//! Every value is an owned buffer of exactly `value_size` bytes. Plain-old-data
//! types can be copied in and out through the `*_pod` helpers; the buffers
//! carry no alignment guarantee, so reads go through an unaligned copy.

use crate::chained_hash_map::{ChainedHashMap, PutOutcome};
use crate::cursor::Cursor;
use crate::error::MapError;
use bytemuck::Pod;
use core::fmt;

pub struct ByteMap {
    value_size: usize,
    inner: ChainedHashMap<Box<[u8]>>,
}

impl ByteMap {
    /// Panics if `value_size` is 0.
    pub fn new(value_size: usize, capacity_hint: usize) -> Self {
        assert!(value_size > 0, "value_size must be positive");
        Self {
            value_size,
            inner: ChainedHashMap::with_capacity(capacity_hint),
        }
    }

    /// Like [`new`](Self::new), with a hook run on every discarded value.
    pub fn with_cleanup<F>(value_size: usize, capacity_hint: usize, mut cleanup: F) -> Self
    where
        F: FnMut(&mut [u8]) + 'static,
    {
        assert!(value_size > 0, "value_size must be positive");
        Self {
            value_size,
            inner: ChainedHashMap::with_cleanup(capacity_hint, move |v: &mut Box<[u8]>| {
                cleanup(&mut v[..])
            }),
        }
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    fn check_size(&self, actual: usize) -> Result<(), MapError> {
        if actual == self.value_size {
            Ok(())
        } else {
            Err(MapError::ValueSize {
                expected: self.value_size,
                actual,
            })
        }
    }

    /// Copy `value` in under `key`.
    pub fn put(&mut self, key: &str, value: &[u8]) -> Result<PutOutcome, MapError> {
        self.check_size(value.len())?;
        Ok(self.inner.put(key, value.into()))
    }

    pub fn put_pod<T: Pod>(&mut self, key: &str, value: &T) -> Result<PutOutcome, MapError> {
        self.put(key, bytemuck::bytes_of(value))
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.inner.get(key).map(|v| &v[..])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut [u8]> {
        self.inner.get_mut(key).map(|v| &mut v[..])
    }

    /// Copy the value for `key` out as a `T`.
    pub fn get_pod<T: Pod>(&self, key: &str) -> Result<Option<T>, MapError> {
        self.check_size(core::mem::size_of::<T>())?;
        Ok(self.get(key).map(bytemuck::pod_read_unaligned))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.inner.remove(key)
    }

    pub fn take(&mut self, key: &str) -> Option<(Box<str>, Box<[u8]>)> {
        self.inner.take(key)
    }

    pub fn clear(&mut self) {
        self.inner.clear()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn count(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.inner.bucket_count()
    }

    pub fn load_factor(&self) -> f64 {
        self.inner.load_factor()
    }

    pub fn first(&self) -> Option<Cursor> {
        self.inner.first()
    }

    pub fn next(&self, prev: Cursor) -> Result<Option<Cursor>, MapError> {
        self.inner.next(prev)
    }

    pub fn key_at(&self, cursor: Cursor) -> Option<&str> {
        cursor.key(&self.inner)
    }

    pub fn value_at(&self, cursor: Cursor) -> Option<&[u8]> {
        cursor.value(&self.inner).map(|v| &v[..])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> + '_ {
        self.inner.iter().map(|(k, v)| (k, &v[..]))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.keys()
    }

    pub fn dispose(self) {
        drop(self)
    }
}

impl fmt::Debug for ByteMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteMap")
            .field("value_size", &self.value_size)
            .field("len", &self.len())
            .field("buckets", &self.bucket_count())
            .finish()
    }
}
