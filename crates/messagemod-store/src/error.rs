//! Error types for the store layer.

/// Errors that can occur while persisting or fetching messages.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store is not in the `Ready` state (never initialized, still
    /// initializing, or already closed). Writes fail fast with this
    /// instead of hanging.
    #[error("message store is not initialized")]
    NotInitialized,

    /// `initialize` was called on a store that already completed (or is
    /// in the middle of) initialization. The handle is created once.
    #[error("message store is already initialized")]
    AlreadyInitialized,

    /// `initialize` was called on a store that has been shut down.
    #[error("message store is closed")]
    Closed,

    /// The store is reachable but the operation failed (constraint
    /// violation, I/O error, corrupt row). The enclosing transaction is
    /// rolled back; no partial row becomes visible.
    #[error("persistence failed: {0}")]
    Persistence(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_wraps_sqlx_error() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert!(err.to_string().starts_with("persistence failed"));
    }
}
