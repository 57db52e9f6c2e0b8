use thiserror::Error;

/// Recoverable failures. Precondition violations panic instead.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MapError {
    /// The cursor was minted before a structural change (insert of a new key,
    /// removal, rehash or clear) to the map.
    #[error("cursor is stale: the map was structurally modified after it was taken")]
    StaleCursor,
    /// The cursor belongs to a different map instance.
    #[error("cursor was taken from a different map")]
    ForeignCursor,
    #[error("value is {actual} bytes but this map stores {expected}-byte values")]
    ValueSize { expected: usize, actual: usize },
}
