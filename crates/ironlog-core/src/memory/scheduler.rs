//! Debounced, per-campaign scheduling of index passes.
//!
//! Each campaign has at most one pending pass. A new request cancels the
//! pending timer and starts a fresh one, so a burst of appends produces a
//! single pass once the journal has been quiet for the debounce delay.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use ironlog_types::memory::IndexOutcome;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::embedder::Embedder;
use super::indexer::IncrementalIndexer;
use super::trigger::IndexTrigger;
use super::vector::JournalVectorStore;
use crate::service::fs::FileSystem;
use crate::service::hash::ContentHasher;

struct PendingPass {
    generation: u64,
    cancel: CancellationToken,
}

struct SchedulerInner<F, E, V, H> {
    indexer: Arc<IncrementalIndexer<F, E, V, H>>,
    debounce: Duration,
    pending: DashMap<String, PendingPass>,
    next_generation: AtomicU64,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// [`IndexTrigger`] that runs index passes on background tokio tasks.
pub struct IndexScheduler<F, E, V, H> {
    inner: Arc<SchedulerInner<F, E, V, H>>,
}

impl<F, E, V, H> Clone for IndexScheduler<F, E, V, H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F, E, V, H> IndexScheduler<F, E, V, H>
where
    F: FileSystem + 'static,
    E: Embedder + 'static,
    V: JournalVectorStore + 'static,
    H: ContentHasher + 'static,
{
    pub fn new(indexer: Arc<IncrementalIndexer<F, E, V, H>>, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                indexer,
                debounce,
                pending: DashMap::new(),
                next_generation: AtomicU64::new(0),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn indexer(&self) -> &Arc<IncrementalIndexer<F, E, V, H>> {
        &self.inner.indexer
    }

    /// Number of campaigns with a pass waiting on its timer.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Run every pending pass now and wait for background work to finish.
    pub async fn flush(&self) {
        loop {
            let ids: Vec<String> = self
                .inner
                .pending
                .iter()
                .map(|entry| entry.key().clone())
                .collect();
            for id in ids {
                if let Some((_, pass)) = self.inner.pending.remove(&id) {
                    pass.cancel.cancel();
                    self.inner.run_pass(&id).await;
                }
            }

            let tasks = std::mem::take(
                &mut *self
                    .inner
                    .tasks
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
            if tasks.is_empty() && self.inner.pending.is_empty() {
                break;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    tracing::warn!(error = %e, "index task panicked");
                }
            }
        }
    }
}

impl<F, E, V, H> SchedulerInner<F, E, V, H>
where
    F: FileSystem + 'static,
    E: Embedder + 'static,
    V: JournalVectorStore + 'static,
    H: ContentHasher + 'static,
{
    fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no tokio runtime; index request dropped");
            return;
        };
        let handle = runtime.spawn(task);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Replace any pending pass for the campaign with one firing after `delay`.
    fn schedule(self: &Arc<Self>, campaign_id: &str, delay: Duration) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let previous = self.pending.insert(
            campaign_id.to_string(),
            PendingPass {
                generation,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }

        let inner = Arc::clone(self);
        let campaign_id = campaign_id.to_string();
        self.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            let still_current = inner
                .pending
                .remove_if(&campaign_id, |_, pass| pass.generation == generation)
                .is_some();
            if still_current {
                inner.run_pass(&campaign_id).await;
            }
        });
    }

    async fn run_pass(self: &Arc<Self>, campaign_id: &str) {
        match self.indexer.index_now(campaign_id).await {
            Ok(IndexOutcome::Busy) => {
                tracing::debug!(campaign_id = %campaign_id, "indexer busy; rescheduling");
                self.schedule(campaign_id, self.debounce);
            }
            Ok(outcome) => {
                tracing::debug!(campaign_id = %campaign_id, %outcome, "index pass finished");
            }
            Err(e) => {
                tracing::warn!(
                    campaign_id = %campaign_id,
                    error = %e,
                    "index pass failed; will retry on next change"
                );
            }
        }
    }
}

impl<F, E, V, H> IndexTrigger for IndexScheduler<F, E, V, H>
where
    F: FileSystem + 'static,
    E: Embedder + 'static,
    V: JournalVectorStore + 'static,
    H: ContentHasher + 'static,
{
    fn request_index(&self, campaign_id: &str) {
        self.inner.schedule(campaign_id, self.inner.debounce);
    }

    fn warm_index(&self, campaign_id: &str) {
        self.inner.schedule(campaign_id, Duration::ZERO);
    }

    fn forget_campaign<'a>(
        &'a self,
        campaign_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        if let Some((_, pass)) = self.inner.pending.remove(campaign_id) {
            pass.cancel.cancel();
        }
        Box::pin(async move {
            if let Err(e) = self.inner.indexer.clear_campaign(campaign_id).await {
                tracing::warn!(
                    campaign_id = %campaign_id,
                    error = %e,
                    "failed to clear story memory"
                );
            }
        })
    }
}
