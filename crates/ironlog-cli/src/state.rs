//! Application state wiring all services together.
//!
//! Services are generic over filesystem/embedder/vector-store traits; AppState
//! pins them to the concrete infra implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ironlog_core::journal::JournalLayout;
use ironlog_core::journal::service::JournalService;
use ironlog_core::memory::embedder::Embedder;
use ironlog_core::memory::indexer::IncrementalIndexer;
use ironlog_core::memory::retrieval::{MemoryRetrievalService, RetrievalSettings};
use ironlog_core::memory::scheduler::IndexScheduler;
use ironlog_core::memory::trigger::{IndexTrigger, NoopIndexTrigger};
use ironlog_infra::config::{load_global_config, resolve_journal_dir, resolve_vector_store_dir};
use ironlog_infra::crypto::hash::Sha256ContentHasher;
use ironlog_infra::filesystem::{LocalFileSystem, resolve_data_dir};
use ironlog_infra::vector::embedder::FastEmbedEmbedder;
use ironlog_infra::vector::lance::LanceVectorStore;
use ironlog_infra::vector::memory::LanceJournalStore;
use ironlog_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteJournalService = JournalService<LocalFileSystem>;

pub type ConcreteScheduler =
    IndexScheduler<LocalFileSystem, FastEmbedEmbedder, LanceJournalStore, Sha256ContentHasher>;

pub type ConcreteRetrievalService = MemoryRetrievalService<FastEmbedEmbedder, LanceJournalStore>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub journal_service: Arc<ConcreteJournalService>,
    pub retrieval_service: Arc<ConcreteRetrievalService>,
    pub scheduler: ConcreteScheduler,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize from the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        Self::init_at(&resolve_data_dir()).await
    }

    /// Load `config.toml` from `data_dir` and wire services.
    pub async fn init_at(data_dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let config = load_global_config(data_dir).await;

        let layout = JournalLayout::new(resolve_journal_dir(&config, data_dir));

        let embedder = Arc::new(FastEmbedEmbedder::new(
            config.memory.embedding_cache_dir.clone(),
        ));
        let lance = LanceVectorStore::new(resolve_vector_store_dir(&config, data_dir)).await?;
        let store = Arc::new(LanceJournalStore::new(lance, embedder.dimension()));

        let indexer = IncrementalIndexer::new(
            LocalFileSystem::new(),
            embedder.clone(),
            store.clone(),
            Sha256ContentHasher::new(),
            layout.clone(),
        );
        let scheduler = IndexScheduler::new(
            Arc::new(indexer),
            Duration::from_millis(config.memory.debounce_ms),
        );

        // Disabled memory keeps the scheduler around for `reindex` but never
        // lets journal mutations reach it.
        let trigger: Arc<dyn IndexTrigger> = if config.memory.enabled {
            Arc::new(scheduler.clone())
        } else {
            tracing::debug!("story memory disabled; index passes will not be scheduled");
            Arc::new(NoopIndexTrigger)
        };

        let journal_service = JournalService::new(LocalFileSystem::new(), layout, trigger.clone());
        let retrieval_service = MemoryRetrievalService::new(
            embedder,
            store,
            trigger,
            RetrievalSettings::from(&config.memory),
        );

        Ok(Self {
            journal_service: Arc::new(journal_service),
            retrieval_service: Arc::new(retrieval_service),
            scheduler,
            config,
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Let pending index passes finish before the process exits.
    pub async fn shutdown(&self) {
        if self.scheduler.pending_count() > 0 {
            tracing::debug!(
                pending = self.scheduler.pending_count(),
                "flushing pending index passes"
            );
        }
        self.scheduler.flush().await;
    }
}
