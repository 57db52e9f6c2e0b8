//! Linear-congruence string hash.
//!
//! `hashcode = hashcode * MULTIPLIER + byte` accumulated over the key bytes
//! with wrapping `u64` arithmetic. The bucket index is the accumulator
//! reduced modulo the bucket count, so a given key and bucket count always
//! land in the same bucket. The hash is case-sensitive.

use core::hash::{BuildHasher, Hasher};

/// Multiplier used unless the map is built with another one.
pub const DEFAULT_MULTIPLIER: u64 = 2_630_849_305;

/// `BuildHasher` for [`PolynomialHasher`]. Stateless apart from the multiplier,
/// so two maps built with the same multiplier hash identically.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PolynomialState {
    multiplier: u64,
}

impl PolynomialState {
    pub const fn new() -> Self {
        Self::with_multiplier(DEFAULT_MULTIPLIER)
    }

    /// Any odd multiplier keeps the full accumulator in play; the value only
    /// affects distribution, never correctness.
    pub const fn with_multiplier(multiplier: u64) -> Self {
        Self { multiplier }
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }
}

impl Default for PolynomialState {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildHasher for PolynomialState {
    type Hasher = PolynomialHasher;

    fn build_hasher(&self) -> PolynomialHasher {
        PolynomialHasher {
            multiplier: self.multiplier,
            hashcode: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PolynomialHasher {
    multiplier: u64,
    hashcode: u64,
}

impl Hasher for PolynomialHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.hashcode = self
                .hashcode
                .wrapping_mul(self.multiplier)
                .wrapping_add(u64::from(b));
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hashcode
    }
}

/// Hash `key` exactly as the map does: raw bytes, no length prefix or
/// terminator (unlike `<str as Hash>::hash`).
#[inline]
pub(crate) fn hash_key<S: BuildHasher>(state: &S, key: &str) -> u64 {
    let mut h = state.build_hasher();
    h.write(key.as_bytes());
    h.finish()
}
