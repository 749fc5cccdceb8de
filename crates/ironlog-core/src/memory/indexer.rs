//! Incremental indexer keeping the vector store in step with journal files.
//!
//! A pass hashes every exchange of the narrative section and compares the
//! hash list against the one persisted by the previous pass. Only the tail
//! starting at the first differing exchange is embedded again.

use std::sync::Arc;

use dashmap::DashMap;
use ironlog_types::error::IndexError;
use ironlog_types::memory::{IndexOutcome, IndexState, JournalMemoryEntry, embedding_id};
use tokio::sync::Mutex;

use super::embedder::Embedder;
use super::vector::JournalVectorStore;
use crate::journal::{JournalLayout, narrative_section, parser};
use crate::service::fs::FileSystem;
use crate::service::hash::ContentHasher;

/// Length of the common prefix of two hash lists.
pub fn divergence_point(old: &[String], new: &[String]) -> usize {
    old.iter().zip(new).take_while(|(a, b)| a == b).count()
}

fn is_not_found(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::NotFound
}

/// Indexes campaign journals into a [`JournalVectorStore`].
///
/// Holds its own per-campaign locks, separate from the journal store's; a
/// pass reads the journal without the journal lock and relies on the
/// modification time recorded in the index state instead.
pub struct IncrementalIndexer<F, E, V, H> {
    fs: F,
    embedder: Arc<E>,
    store: Arc<V>,
    hasher: H,
    layout: JournalLayout,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<F, E, V, H> IncrementalIndexer<F, E, V, H>
where
    F: FileSystem,
    E: Embedder,
    V: JournalVectorStore,
    H: ContentHasher,
{
    pub fn new(fs: F, embedder: Arc<E>, store: Arc<V>, hasher: H, layout: JournalLayout) -> Self {
        Self {
            fs,
            embedder,
            store,
            hasher,
            layout,
            locks: DashMap::new(),
        }
    }

    pub fn embedder(&self) -> &Arc<E> {
        &self.embedder
    }

    pub fn store(&self) -> &Arc<V> {
        &self.store
    }

    fn lock_for(&self, campaign_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(campaign_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// The persisted index state, or `None` if absent or unreadable.
    pub async fn read_state(&self, campaign_id: &str) -> Option<IndexState> {
        let path = self.layout.index_state_path(campaign_id);
        let raw = self.fs.read_file(&path).await.ok()?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::debug!(campaign_id = %campaign_id, error = %e, "ignoring corrupt index state");
                None
            }
        }
    }

    async fn write_state(&self, campaign_id: &str, state: &IndexState) -> Result<(), IndexError> {
        let json =
            serde_json::to_string_pretty(state).map_err(|e| IndexError::State(e.to_string()))?;
        self.fs
            .create_dir_all(&self.layout.index_dir())
            .await
            .map_err(|e| IndexError::FileSystem(e.to_string()))?;
        self.fs
            .write_file(&self.layout.index_state_path(campaign_id), &json)
            .await
            .map_err(|e| IndexError::FileSystem(e.to_string()))
    }

    async fn remove_state(&self, campaign_id: &str) -> Result<(), IndexError> {
        match self
            .fs
            .remove_file(&self.layout.index_state_path(campaign_id))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(IndexError::FileSystem(e.to_string())),
        }
    }

    async fn clear_locked(&self, campaign_id: &str) -> Result<u64, IndexError> {
        let removed = self
            .store
            .delete_campaign(campaign_id)
            .await
            .map_err(|e| IndexError::Store(e.to_string()))?;
        self.remove_state(campaign_id).await?;
        Ok(removed)
    }

    /// Remove every embedding and the index state of a campaign.
    ///
    /// Waits for an in-flight pass to finish, then drops the campaign's lock.
    pub async fn clear_campaign(&self, campaign_id: &str) -> Result<u64, IndexError> {
        let lock = self.lock_for(campaign_id);
        let guard = lock.lock().await;
        let removed = self.clear_locked(campaign_id).await?;
        drop(guard);
        self.locks.remove(campaign_id);
        tracing::info!(campaign_id = %campaign_id, removed, "cleared story memory");
        Ok(removed)
    }

    /// Run one indexing pass for a campaign.
    ///
    /// Returns [`IndexOutcome::Busy`] without waiting if another pass for the
    /// same campaign is running. On error nothing is persisted, so the next
    /// pass recomputes the same diff.
    #[tracing::instrument(name = "index_now", skip(self), fields(campaign_id = %campaign_id))]
    pub async fn index_now(&self, campaign_id: &str) -> Result<IndexOutcome, IndexError> {
        let lock = self.lock_for(campaign_id);
        let Ok(_guard) = lock.try_lock() else {
            tracing::debug!("index pass already running");
            return Ok(IndexOutcome::Busy);
        };

        let journal_path = self.layout.journal_path(campaign_id);
        let last_modified = match self.fs.modified_millis(&journal_path).await {
            Ok(millis) => millis,
            Err(e) if is_not_found(&e) => return Ok(IndexOutcome::Missing),
            Err(e) => return Err(IndexError::FileSystem(e.to_string())),
        };

        let old_state = self.read_state(campaign_id).await;
        if old_state
            .as_ref()
            .is_some_and(|s| s.journal_last_modified_millis == last_modified)
        {
            tracing::debug!("journal unchanged since last pass");
            return Ok(IndexOutcome::Unchanged);
        }

        let content = match self.fs.read_file(&journal_path).await {
            Ok(content) => content,
            Err(e) if is_not_found(&e) => return Ok(IndexOutcome::Missing),
            Err(e) => return Err(IndexError::FileSystem(e.to_string())),
        };
        let section = narrative_section(&content);
        let exchanges = parser::parse_exchanges(&section);
        if exchanges.is_empty() {
            let removed = self.clear_locked(campaign_id).await?;
            tracing::info!(removed, "narrative section empty; cleared story memory");
            return Ok(IndexOutcome::Cleared);
        }

        let new_hashes: Vec<String> = exchanges
            .iter()
            .map(|exchange| self.hasher.compute_hash(&exchange.content))
            .collect();
        let old_hashes = old_state.map(|s| s.exchange_hashes).unwrap_or_default();
        let divergence = divergence_point(&old_hashes, &new_hashes);

        let new_state = IndexState {
            journal_last_modified_millis: last_modified,
            exchange_hashes: new_hashes,
        };

        if old_hashes.len() > divergence {
            let stale: Vec<String> = (divergence..old_hashes.len())
                .map(|i| embedding_id(campaign_id, i))
                .collect();
            tracing::debug!(count = stale.len(), "deleting stale embeddings");
            self.store
                .delete_ids(&stale)
                .await
                .map_err(|e| IndexError::Store(e.to_string()))?;
        }

        if divergence >= exchanges.len() {
            self.write_state(campaign_id, &new_state).await?;
            return Ok(IndexOutcome::HashesOnly {
                exchanges: exchanges.len(),
            });
        }

        let model = self.embedder.model_name().to_string();
        let mut entries: Vec<JournalMemoryEntry> = exchanges[divergence..]
            .iter()
            .filter_map(|exchange| {
                let text = parser::strip_markup_lines(&exchange.content);
                (!text.is_empty())
                    .then(|| JournalMemoryEntry::new(campaign_id, exchange.index, text, &model))
            })
            .collect();

        if entries.is_empty() {
            tracing::debug!(divergence, "changed exchanges are purely mechanical");
            self.write_state(campaign_id, &new_state).await?;
            return Ok(IndexOutcome::HashesOnly {
                exchanges: exchanges.len(),
            });
        }

        let texts: Vec<String> = entries.iter().map(|entry| entry.text.clone()).collect();
        let mut embeddings = self
            .embedder
            .embed(&texts)
            .await
            .map_err(|e| IndexError::Embedding(e.to_string()))?;
        if embeddings.is_empty() {
            return Err(IndexError::Embedding(
                "embedder returned no vectors".to_string(),
            ));
        }
        if embeddings.len() != entries.len() {
            tracing::warn!(
                expected = entries.len(),
                got = embeddings.len(),
                "embedding count mismatch; indexing the overlap"
            );
            let overlap = embeddings.len().min(entries.len());
            entries.truncate(overlap);
            embeddings.truncate(overlap);
        }

        self.store
            .upsert(&entries, &embeddings)
            .await
            .map_err(|e| IndexError::Store(e.to_string()))?;
        self.write_state(campaign_id, &new_state).await?;

        tracing::info!(
            embedded = entries.len(),
            exchanges = exchanges.len(),
            divergence,
            "indexed journal"
        );
        Ok(IndexOutcome::Embedded {
            embedded: entries.len(),
            exchanges: exchanges.len(),
        })
    }
}
