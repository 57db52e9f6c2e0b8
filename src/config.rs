//! Construction-time knobs and the map builder.

use crate::chained_hash_map::ChainedHashMap;
use crate::polynomial::PolynomialState;
use core::hash::BuildHasher;

/// Bucket count used when the capacity hint is 0.
pub const DEFAULT_CAPACITY: usize = 199;

/// Entries per bucket above which an insert triggers a rehash.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 1.5;

/// Hook run on a value that is overwritten, removed, or torn down with the
/// map. It must not keep the reference past its return.
pub type Cleanup<V> = Box<dyn FnMut(&mut V)>;

/// What happens when the load factor is exceeded.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Growth {
    /// Grow to `3 * n + 1` buckets. Never shrinks.
    #[default]
    Multiply,
    /// Keep the initial bucket count forever; chains just get longer.
    Fixed,
}

impl Growth {
    pub(crate) fn next_bucket_count(self, current: usize) -> Option<usize> {
        match self {
            Growth::Multiply => Some(current.saturating_mul(3).saturating_add(1)),
            Growth::Fixed => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapConfig {
    /// Initial number of buckets; 0 selects [`DEFAULT_CAPACITY`].
    pub capacity_hint: usize,
    pub max_load_factor: f64,
    pub growth: Growth,
}

impl MapConfig {
    pub(crate) fn initial_buckets(&self) -> usize {
        if self.capacity_hint == 0 {
            DEFAULT_CAPACITY
        } else {
            self.capacity_hint
        }
    }

    pub(crate) fn validate(&self) {
        assert!(
            self.max_load_factor > 0.0,
            "max_load_factor must be positive, got {}",
            self.max_load_factor
        );
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            capacity_hint: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            growth: Growth::Multiply,
        }
    }
}

/// Builder for [`ChainedHashMap`].
///
/// ```
/// use chained_hashmap::{ChainedHashMap, Growth};
///
/// let mut m: ChainedHashMap<u32> = ChainedHashMap::builder()
///     .capacity_hint(8)
///     .growth(Growth::Fixed)
///     .build();
/// m.put("a", 1);
/// assert_eq!(m.bucket_count(), 8);
/// ```
pub struct Builder<V, S = PolynomialState> {
    config: MapConfig,
    hasher: S,
    cleanup: Option<Cleanup<V>>,
}

impl<V> Builder<V> {
    pub fn new() -> Self {
        Self {
            config: MapConfig::default(),
            hasher: PolynomialState::new(),
            cleanup: None,
        }
    }
}

impl<V> Default for Builder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S: BuildHasher> Builder<V, S> {
    pub fn config(mut self, config: MapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn capacity_hint(mut self, capacity_hint: usize) -> Self {
        self.config.capacity_hint = capacity_hint;
        self
    }

    /// Panics if `max_load_factor` is not a positive number.
    pub fn max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.config.max_load_factor = max_load_factor;
        self.config.validate();
        self
    }

    pub fn growth(mut self, growth: Growth) -> Self {
        self.config.growth = growth;
        self
    }

    pub fn cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: FnMut(&mut V) + 'static,
    {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    pub fn hasher<T: BuildHasher>(self, hasher: T) -> Builder<V, T> {
        Builder {
            config: self.config,
            hasher,
            cleanup: self.cleanup,
        }
    }

    pub fn build(self) -> ChainedHashMap<V, S> {
        ChainedHashMap::from_parts(self.config, self.hasher, self.cleanup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hint_selects_default_capacity() {
        let c = MapConfig::default();
        assert_eq!(c.initial_buckets(), DEFAULT_CAPACITY);
        let c = MapConfig {
            capacity_hint: 7,
            ..MapConfig::default()
        };
        assert_eq!(c.initial_buckets(), 7);
    }

    #[test]
    fn multiply_growth_is_three_n_plus_one() {
        assert_eq!(Growth::Multiply.next_bucket_count(4), Some(13));
        assert_eq!(Growth::Multiply.next_bucket_count(13), Some(40));
        assert_eq!(Growth::Fixed.next_bucket_count(13), None);
    }

    #[test]
    #[should_panic(expected = "max_load_factor must be positive")]
    fn non_positive_load_factor_panics() {
        let _ = Builder::<u8>::new().max_load_factor(0.0);
    }

    #[test]
    #[should_panic(expected = "max_load_factor must be positive")]
    fn nan_load_factor_panics() {
        let _ = Builder::<u8>::new().max_load_factor(f64::NAN);
    }
}
