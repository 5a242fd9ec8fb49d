//! Store error types.
//!
//! Every store failure reaches the search core as
//! `catalog_core::Error::Persistence`.

use tokio_rusqlite::rusqlite;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("DATABASE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("DATABASE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A record was rejected before reaching the database.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),
}

impl From<tokio_rusqlite::Error<StoreError>> for StoreError {
    fn from(err: tokio_rusqlite::Error<StoreError>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => StoreError::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => StoreError::Database(tokio_rusqlite::Error::Close(c)),
            _ => StoreError::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for StoreError {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        StoreError::Database(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<StoreError> for catalog_core::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidInput(msg) => catalog_core::Error::InvalidInput(msg),
            other => catalog_core::Error::Persistence(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::MigrationFailed("bad version".to_string());
        assert!(err.to_string().contains("migration failed"));
        assert!(err.to_string().contains("bad version"));
    }

    #[test]
    fn test_store_error_becomes_persistence() {
        let err: catalog_core::Error = StoreError::from(rusqlite::Error::InvalidQuery).into();
        assert!(matches!(err, catalog_core::Error::Persistence(msg) if msg.starts_with("DATABASE_ERROR")));

        let err: catalog_core::Error = StoreError::InvalidInput("empty path".into()).into();
        assert_eq!(err, catalog_core::Error::InvalidInput("empty path".into()));
    }
}
