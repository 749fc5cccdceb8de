//! Global configuration types for ironlog.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls where
//! journals live and how the story memory index behaves.

use serde::{Deserialize, Serialize};

use std::path::PathBuf;

/// Top-level configuration.
///
/// Loaded from `~/.ironlog/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub journal: JournalConfig,

    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Where campaign journals are stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Journal directory. Defaults to the data directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Story memory indexing and retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// When false, no index passes are scheduled and retrieval returns nothing.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Quiet period before a requested index pass runs.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of excerpts returned by a memory search.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Minimum similarity score (0.0 to 1.0) for an excerpt to be returned.
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Total character budget of the formatted memory block.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Per-excerpt character cap.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    /// LanceDB directory. Defaults to `{data_dir}/vector_store`.
    #[serde(default)]
    pub vector_store_dir: Option<PathBuf>,

    /// Cache directory for downloaded embedding models.
    #[serde(default)]
    pub embedding_cache_dir: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_max_results() -> usize {
    6
}

fn default_min_score() -> f32 {
    0.35
}

fn default_max_chars() -> usize {
    1200
}

fn default_excerpt_chars() -> usize {
    450
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            debounce_ms: default_debounce_ms(),
            max_results: default_max_results(),
            min_score: default_min_score(),
            max_chars: default_max_chars(),
            excerpt_chars: default_excerpt_chars(),
            vector_store_dir: None,
            embedding_cache_dir: None,
        }
    }
}
