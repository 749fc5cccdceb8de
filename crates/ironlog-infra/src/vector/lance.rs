//! LanceDB vector store wrapper for connection management and table operations.
//!
//! Provides `LanceVectorStore` which wraps a `lancedb::Connection` and offers
//! helper methods for table lifecycle (create, open, drop) using Arrow schemas.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_schema::Schema;

/// LanceDB vector store wrapper for connection and table management.
///
/// Manages a single LanceDB connection at a filesystem path.
pub struct LanceVectorStore {
    db: lancedb::Connection,
    base_path: PathBuf,
}

impl LanceVectorStore {
    /// Open or create a LanceDB vector store at the given path.
    ///
    /// Creates the directory if it does not exist.
    pub async fn new(base_path: PathBuf) -> Result<Self, lancedb::Error> {
        tokio::fs::create_dir_all(&base_path)
            .await
            .map_err(|e| lancedb::Error::CreateDir {
                path: base_path.display().to_string(),
                source: e,
            })?;

        let uri = base_path
            .to_str()
            .ok_or_else(|| lancedb::Error::InvalidInput {
                message: format!("Path contains invalid UTF-8: {}", base_path.display()),
            })?;

        let db = lancedb::connect(uri).execute().await?;

        Ok(Self { db, base_path })
    }

    /// Ensure a table exists with the given schema.
    ///
    /// If the table already exists, opens it. If not, creates an empty table
    /// with the provided schema.
    pub async fn ensure_table(
        &self,
        table_name: &str,
        schema: Arc<Schema>,
    ) -> Result<lancedb::Table, lancedb::Error> {
        match self.db.open_table(table_name).execute().await {
            Ok(table) => Ok(table),
            Err(lancedb::Error::TableNotFound { .. }) => {
                self.db
                    .create_empty_table(table_name, schema)
                    .execute()
                    .await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn table_exists(&self, table_name: &str) -> bool {
        self.db.open_table(table_name).execute().await.is_ok()
    }

    /// Drop a table from the database.
    ///
    /// Returns Ok(()) even if the table does not exist (idempotent).
    pub async fn drop_table(&self, table_name: &str) -> Result<(), lancedb::Error> {
        match self.db.drop_table(table_name, &[]).await {
            Ok(()) => Ok(()),
            Err(lancedb::Error::TableNotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::schema::{EMBEDDING_DIMENSION, JOURNAL_MEMORY_TABLE, journal_memory_schema};

    #[tokio::test]
    async fn test_ensure_table_creates_and_reopens() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = LanceVectorStore::new(temp_dir.path().join("vectors"))
            .await
            .expect("Failed to create vector store");
        assert!(store.base_path().exists());

        let schema = Arc::new(journal_memory_schema(EMBEDDING_DIMENSION));
        let table = store
            .ensure_table(JOURNAL_MEMORY_TABLE, schema.clone())
            .await
            .expect("Failed to create table");
        assert_eq!(table.count_rows(None).await.expect("Failed to count rows"), 0);

        store
            .ensure_table(JOURNAL_MEMORY_TABLE, schema)
            .await
            .expect("Failed to reopen table");
        assert!(store.table_exists(JOURNAL_MEMORY_TABLE).await);
    }

    #[tokio::test]
    async fn test_drop_table_idempotent() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = LanceVectorStore::new(temp_dir.path().to_path_buf())
            .await
            .expect("Failed to create vector store");

        let schema = Arc::new(journal_memory_schema(EMBEDDING_DIMENSION));
        store
            .ensure_table("to_drop", schema)
            .await
            .expect("Failed to create table");

        store.drop_table("to_drop").await.expect("Failed to drop table");
        assert!(!store.table_exists("to_drop").await);
        store
            .drop_table("to_drop")
            .await
            .expect("Second drop should be idempotent");
    }
}
