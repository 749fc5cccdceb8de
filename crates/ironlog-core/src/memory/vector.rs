//! Vector store trait for journal excerpts.
//!
//! Entries are keyed by `"{campaign_id}:{exchange_index}"` and every query is
//! scoped to one campaign. The LanceDB implementation lives in ironlog-infra.

use ironlog_types::error::RepositoryError;
use ironlog_types::memory::{JournalMemoryEntry, RankedExcerpt};

/// Trait for vector-indexed journal excerpts with semantic search.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait JournalVectorStore: Send + Sync {
    /// Insert or replace entries by id. `embeddings[i]` belongs to `entries[i]`.
    fn upsert(
        &self,
        entries: &[JournalMemoryEntry],
        embeddings: &[Vec<f32>],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete entries by id. Unknown ids are ignored.
    fn delete_ids(
        &self,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete every entry of a campaign. Returns the count of deleted entries.
    fn delete_campaign(
        &self,
        campaign_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Search a campaign's entries, most similar first, dropping anything
    /// scoring below `min_score`.
    fn search(
        &self,
        campaign_id: &str,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> impl std::future::Future<Output = Result<Vec<RankedExcerpt>, RepositoryError>> + Send;

    /// Count a campaign's entries.
    fn count(
        &self,
        campaign_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
