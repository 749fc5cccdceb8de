//! Embedder trait for text-to-vector conversion.
//!
//! Journal excerpts and retrieval queries are embedded through this trait.
//! The local fastembed implementation lives in ironlog-infra.

use ironlog_types::error::RepositoryError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors.
    ///
    /// Returns one vector per input text, in input order. The indexer sends
    /// every changed exchange of a pass in a single batch.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, RepositoryError>> + Send;

    /// The model name recorded on every stored entry (e.g. "BAAI/bge-small-en-v1.5").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}
