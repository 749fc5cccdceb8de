//! Memory index types for ironlog.
//!
//! Journal exchanges are embedded into a vector store so that older story
//! beats can be recalled when building prompts. These types describe the
//! stored entries and the persisted per-campaign index state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// Persisted indexing state for one campaign.
///
/// Stored as `{journal_dir}/.memory-index/{campaign_id}.json`.
/// `exchange_hashes[i]` is the content hash of the i-th parsed exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexState {
    pub journal_last_modified_millis: i64,
    pub exchange_hashes: Vec<String>,
}

/// Vector store id for an exchange: `"{campaign_id}:{exchange_index}"`.
pub fn embedding_id(campaign_id: &str, exchange_index: usize) -> String {
    format!("{campaign_id}:{exchange_index}")
}

/// A narrative excerpt stored alongside its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalMemoryEntry {
    /// See [`embedding_id`].
    pub id: String,
    pub campaign_id: String,
    pub exchange_index: usize,
    /// Narrative-only projection of the exchange (no player or mechanical lines).
    pub text: String,
    pub embedding_model: String,
    pub indexed_at: DateTime<Utc>,
}

impl JournalMemoryEntry {
    pub fn new(
        campaign_id: &str,
        exchange_index: usize,
        text: String,
        embedding_model: &str,
    ) -> Self {
        Self {
            id: embedding_id(campaign_id, exchange_index),
            campaign_id: campaign_id.to_string(),
            exchange_index,
            text,
            embedding_model: embedding_model.to_string(),
            indexed_at: Utc::now(),
        }
    }
}

/// A search hit with its similarity score (1.0 = identical direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedExcerpt {
    pub entry: JournalMemoryEntry,
    pub score: f32,
}

/// Result of a single indexing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IndexOutcome {
    /// No journal file exists for the campaign.
    Missing,
    /// Modification time matched the persisted state; nothing read further.
    Unchanged,
    /// The narrative section was blank; embeddings and state were removed.
    Cleared,
    /// Exchanges were rehashed but no embedding was needed.
    HashesOnly { exchanges: usize },
    /// Changed exchanges were embedded and upserted.
    Embedded { embedded: usize, exchanges: usize },
    /// Another pass held the campaign's index lock.
    Busy,
}

impl fmt::Display for IndexOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexOutcome::Missing => write!(f, "missing"),
            IndexOutcome::Unchanged => write!(f, "unchanged"),
            IndexOutcome::Cleared => write!(f, "cleared"),
            IndexOutcome::HashesOnly { exchanges } => {
                write!(f, "up to date ({exchanges} exchanges)")
            }
            IndexOutcome::Embedded { embedded, exchanges } => {
                write!(f, "embedded {embedded} of {exchanges} exchanges")
            }
            IndexOutcome::Busy => write!(f, "busy"),
        }
    }
}
