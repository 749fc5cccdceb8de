//! Story memory retrieval: embed a query, search the campaign's excerpts,
//! and format the hits as a bounded bullet list for prompt assembly.

use std::sync::Arc;

use ironlog_types::config::MemoryConfig;
use ironlog_types::memory::RankedExcerpt;

use super::embedder::Embedder;
use super::trigger::IndexTrigger;
use super::vector::JournalVectorStore;

/// Limits applied when searching and formatting excerpts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalSettings {
    pub enabled: bool,
    pub max_results: usize,
    pub min_score: f32,
    /// Total character budget of the formatted block.
    pub max_chars: usize,
    /// Per-excerpt character cap before the ellipsis.
    pub excerpt_chars: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self::from(&MemoryConfig::default())
    }
}

impl From<&MemoryConfig> for RetrievalSettings {
    fn from(config: &MemoryConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_results: config.max_results,
            min_score: config.min_score,
            max_chars: config.max_chars,
            excerpt_chars: config.excerpt_chars,
        }
    }
}

/// Collapse whitespace and cap at `max_chars` characters, marking the cut
/// with an ellipsis.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

/// Format hits as `- excerpt` lines, stopping before the first line that
/// would exceed the total budget.
pub fn format_excerpts(hits: &[RankedExcerpt], settings: &RetrievalSettings) -> String {
    let mut out = String::new();
    let mut used = 0;
    for hit in hits {
        let line = format!("- {}\n", excerpt(&hit.entry.text, settings.excerpt_chars));
        let len = line.chars().count();
        if used + len > settings.max_chars {
            break;
        }
        used += len;
        out.push_str(&line);
    }
    out.trim().to_string()
}

/// Retrieves relevant journal excerpts for a campaign.
///
/// Never fails: any embedding or search error yields an empty string.
pub struct MemoryRetrievalService<E, V> {
    embedder: Arc<E>,
    store: Arc<V>,
    trigger: Arc<dyn IndexTrigger>,
    settings: RetrievalSettings,
}

impl<E: Embedder, V: JournalVectorStore> MemoryRetrievalService<E, V> {
    pub fn new(
        embedder: Arc<E>,
        store: Arc<V>,
        trigger: Arc<dyn IndexTrigger>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            embedder,
            store,
            trigger,
            settings,
        }
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    /// Search hits for `query`, most relevant first.
    pub async fn search(&self, campaign_id: &str, query: &str) -> Vec<RankedExcerpt> {
        if !self.settings.enabled || query.trim().is_empty() {
            return Vec::new();
        }
        self.trigger.request_index(campaign_id);

        let embeddings = match self.embedder.embed(&[query.trim().to_string()]).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed; no memory returned");
                return Vec::new();
            }
        };
        let Some(query_embedding) = embeddings.into_iter().next() else {
            tracing::warn!("embedder returned no vector for query");
            return Vec::new();
        };

        match self
            .store
            .search(
                campaign_id,
                &query_embedding,
                self.settings.max_results,
                self.settings.min_score,
            )
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "memory search failed; no memory returned");
                Vec::new()
            }
        }
    }

    /// Formatted excerpts relevant to `query`, or `""` when there are none.
    #[tracing::instrument(name = "relevant_memory", skip(self, query), fields(campaign_id = %campaign_id))]
    pub async fn relevant_memory(&self, campaign_id: &str, query: &str) -> String {
        let hits = self.search(campaign_id, query).await;
        let formatted = format_excerpts(&hits, &self.settings);
        tracing::debug!(hits = hits.len(), chars = formatted.len(), "retrieved story memory");
        formatted
    }
}
