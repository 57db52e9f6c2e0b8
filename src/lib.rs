//! chained-hashmap: a single-threaded, separate-chaining map from string
//! keys to values, with per-value cleanup hooks and cursor-based traversal.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a hash map whose structure (buckets, chains, growth) is explicit
//!   and whose traversal needs no borrowed iterator object.
//! - Layers:
//!   - ChainedHashMap<V, S>: buckets of singly linked chains over slot
//!     storage; put/get/remove/take, rehash on growth, cleanup hooks, and
//!     `first`/`next` cursors. Includes a debug-only reentrancy check.
//!   - ByteMap: type-erased values of a fixed byte width, layered on
//!     `ChainedHashMap<Box<[u8]>>`, with `bytemuck` helpers for POD types.
//!
//! Storage
//! - Entries live in a `SlotMap`; a chain link is an `Option<EntryKey>`.
//!   Each entry keeps its owned key, its value, and the full `u64` hash
//!   computed at insertion. Entries never move; rehashing only rewrites
//!   links and bucket heads, so `K`-side hashing never runs after insert.
//! - New entries are spliced at the front of their chain.
//!
//! Hashing and growth
//! - Default hash is the linear-congruence recurrence
//!   `h = h * 2630849305 + byte` over the key bytes; the bucket is `h % n`.
//! - After inserting a new key, if `len / n` exceeds the max load factor
//!   (1.5 by default) the map grows to `3n + 1` buckets. It never shrinks.
//!   `Growth::Fixed` disables growth.
//!
//! Cleanup
//! - The optional hook runs exactly once on every value that leaves the map
//!   through overwrite, `remove`, `clear`, or drop. `take` transfers the
//!   value to the caller instead. Chains are relinked before the hook runs.
//!
//! Traversal
//! - `first()` and `next(cursor)` walk buckets in index order and each
//!   chain front to back. A `Cursor` is `Copy` and records the map's id and
//!   structural epoch; after a structural change `next` returns
//!   `MapError::StaleCursor` instead of walking freed links. Overwriting a
//!   value is not structural.
//!
//! Notes and non-goals
//! - Single-threaded: the map is `!Send`/`!Sync`.
//! - Allocation failure aborts through the global allocator; there is no
//!   recoverable out-of-memory path.

mod byte_map;
pub mod chained_hash_map;
mod chained_hash_map_proptest;
mod config;
mod cursor;
mod error;
pub mod polynomial;
mod reentrancy;

// Public surface
pub use byte_map::ByteMap;
pub use chained_hash_map::{ChainedHashMap, Iter, IterMut, PutOutcome};
pub use config::{Builder, Cleanup, Growth, MapConfig, DEFAULT_CAPACITY, DEFAULT_MAX_LOAD_FACTOR};
pub use cursor::Cursor;
pub use error::MapError;
pub use polynomial::{PolynomialHasher, PolynomialState, DEFAULT_MULTIPLIER};
