//! FastEmbed-based local embedding generator.
//!
//! Implements the `Embedder` trait from `ironlog-core` using fastembed's
//! BGESmallENV15 model (384 dimensions) with ONNX runtime inference.
//!
//! The model is loaded on first use, so commands that never embed anything
//! do not pay for the download or the ONNX session.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use ironlog_core::memory::embedder::Embedder;
use ironlog_types::error::RepositoryError;
use tokio::sync::OnceCell;

use super::schema::EMBEDDING_DIMENSION;

const MODEL_NAME: &str = "BAAI/bge-small-en-v1.5";

/// Local embedder backed by fastembed.
///
/// Inference is synchronous, so it runs on the blocking thread pool.
pub struct FastEmbedEmbedder {
    cache_dir: Option<PathBuf>,
    model: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl FastEmbedEmbedder {
    /// `cache_dir` overrides where model files are downloaded.
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir,
            model: OnceCell::new(),
        }
    }

    async fn model(&self) -> Result<Arc<Mutex<TextEmbedding>>, RepositoryError> {
        self.model
            .get_or_try_init(|| async {
                let cache_dir = self.cache_dir.clone();
                tracing::info!(model = MODEL_NAME, "loading embedding model");
                let model = tokio::task::spawn_blocking(move || {
                    let mut options = InitOptions::new(EmbeddingModel::BGESmallENV15)
                        .with_show_download_progress(false);
                    if let Some(dir) = cache_dir {
                        options = options.with_cache_dir(dir);
                    }
                    TextEmbedding::try_new(options)
                })
                .await
                .map_err(|e| RepositoryError::Query(format!("embedding model task failed: {e}")))?
                .map_err(|e| RepositoryError::Query(format!("failed to load embedding model: {e}")))?;
                Ok(Arc::new(Mutex::new(model)))
            })
            .await
            .cloned()
    }
}

impl Embedder for FastEmbedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model().await?;
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = model.lock().unwrap_or_else(PoisonError::into_inner);
            model
                .embed(texts, None)
                .map_err(|e| RepositoryError::Query(format!("embedding failed: {e}")))
        })
        .await
        .map_err(|e| RepositoryError::Query(format!("embedding task failed: {e}")))?
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_metadata() {
        let embedder = FastEmbedEmbedder::new(None);
        assert_eq!(embedder.model_name(), MODEL_NAME);
        assert_eq!(embedder.dimension(), 384);
    }

    #[tokio::test]
    async fn test_empty_batch_does_not_load_model() {
        let embedder = FastEmbedEmbedder::new(None);
        let vectors = embedder.embed(&[]).await.expect("empty batch");
        assert!(vectors.is_empty());
        assert!(embedder.model.get().is_none());
    }
}
