use thiserror::Error;

/// Errors related to campaign journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("campaign '{0}' not found")]
    NotFound(String),

    #[error("campaign '{0}' already exists")]
    AlreadyExists(String),

    #[error("invalid campaign name: {0}")]
    InvalidName(String),

    #[error("filesystem error: {0}")]
    FileSystemError(String),
}

/// Errors from embedding providers and vector stores (used by trait
/// definitions in ironlog-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors that abort an indexing pass. The pass persists nothing when one
/// of these is returned.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("vector store error: {0}")]
    Store(String),

    #[error("filesystem error: {0}")]
    FileSystem(String),

    #[error("index state error: {0}")]
    State(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_error_display() {
        let err = JournalError::AlreadyExists("test-hero".to_string());
        assert_eq!(err.to_string(), "campaign 'test-hero' already exists");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("bad filter".to_string());
        assert_eq!(err.to_string(), "query error: bad filter");
    }

    #[test]
    fn test_index_error_display() {
        let err = IndexError::Embedding("model offline".to_string());
        assert!(err.to_string().contains("model offline"));
    }
}
