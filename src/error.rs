//! Error types for the data-access core.
//!
//! Store adapters report [`StoreError`]. The item cache wraps those in
//! [`CacheError`] together with argument errors and partial-write reports.
//! A missing entity is never an error.

use std::fmt;

/// Errors raised by a field store or document store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A Redis operation failed.
    #[error("Redis error: {0}")]
    Redis(#[from] fred::error::Error),

    /// A MongoDB operation failed.
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A document handed to a store cannot be addressed.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// The storage tier an operation was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Flat hash store (Redis).
    FieldStore,
    /// System-of-record store (MongoDB).
    DocumentStore,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldStore => f.write_str("field store"),
            Self::DocumentStore => f.write_str("document store"),
        }
    }
}

/// Errors returned by [`ItemCache`](crate::cache::ItemCache).
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A store failed; passed through without retry.
    #[error(transparent)]
    Infrastructure(#[from] StoreError),

    /// One update write failed while the other succeeded. The successful
    /// write is not rolled back.
    #[error("partial write: {tier} update failed: {source}")]
    PartialWrite {
        /// The tier whose write failed.
        tier: Tier,
        /// The failure reported by that tier.
        source: StoreError,
    },
}

impl CacheError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_write_names_failed_tier() {
        let err = CacheError::PartialWrite {
            tier: Tier::DocumentStore,
            source: StoreError::Unavailable("connection reset".into()),
        };

        let msg = err.to_string();
        assert!(msg.contains("document store"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_infrastructure_is_transparent() {
        let err: CacheError = StoreError::Unavailable("down".into()).into();
        assert_eq!(err.to_string(), "store unavailable: down");
    }
}
