//! Journal service: the authoritative, lock-guarded store of campaign journals.
//!
//! `JournalService` is generic over `FileSystem` so it can be tested with an
//! in-memory filesystem. Every mutation of a campaign runs under that
//! campaign's lock and re-reads the file before writing; reads take no lock.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use ironlog_types::campaign::{Campaign, slugify};
use ironlog_types::character::CharacterSheet;
use ironlog_types::error::JournalError;
use ironlog_types::journal::{PLAYER_CLOSE_TAG, PLAYER_OPEN_TAG};
use tokio::sync::Mutex;

use super::{JournalLayout, header, journal_marker_line, journal_section_lines, parser};
use crate::memory::trigger::IndexTrigger;
use crate::service::fs::FileSystem;

fn fs_error(err: std::io::Error) -> JournalError {
    JournalError::FileSystemError(err.to_string())
}

fn read_error(campaign_id: &str, err: std::io::Error) -> JournalError {
    if err.kind() == std::io::ErrorKind::NotFound {
        JournalError::NotFound(campaign_id.to_string())
    } else {
        fs_error(err)
    }
}

/// Campaign ids double as file stems, so only slug characters are allowed.
fn validate_id(campaign_id: &str) -> Result<(), JournalError> {
    let valid = !campaign_id.is_empty()
        && campaign_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(JournalError::NotFound(campaign_id.to_string()))
    }
}

/// Service for creating, reading, and mutating campaign journals.
pub struct JournalService<F: FileSystem> {
    fs: F,
    layout: JournalLayout,
    trigger: Arc<dyn IndexTrigger>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<F: FileSystem> JournalService<F> {
    pub fn new(fs: F, layout: JournalLayout, trigger: Arc<dyn IndexTrigger>) -> Self {
        Self {
            fs,
            layout,
            trigger,
            locks: DashMap::new(),
        }
    }

    pub fn layout(&self) -> &JournalLayout {
        &self.layout
    }

    /// The campaign's lock, created on first use.
    ///
    /// The `Arc` is cloned out so no DashMap guard is held across an await.
    fn lock_for(&self, campaign_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(campaign_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    async fn read_journal(&self, campaign_id: &str) -> Result<String, JournalError> {
        validate_id(campaign_id)?;
        let path = self.layout.journal_path(campaign_id);
        self.fs
            .read_file(&path)
            .await
            .map_err(|e| read_error(campaign_id, e))
    }

    async fn write_journal(&self, path: &Path, content: &str) -> Result<(), JournalError> {
        self.fs.write_file(path, content).await.map_err(fs_error)
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a new campaign journal for `character`.
    ///
    /// The id is the slug of the character name. Fails with `AlreadyExists`
    /// if a journal with that id is already on disk.
    pub async fn create(
        &self,
        character: &CharacterSheet,
        backstory: Option<&str>,
    ) -> Result<Campaign, JournalError> {
        let name = character.name.trim();
        if name.is_empty() {
            return Err(JournalError::InvalidName(
                "character name cannot be empty".to_string(),
            ));
        }
        let id = slugify(name);
        let path = self.layout.journal_path(&id);

        let lock = self.lock_for(&id);
        let guard = lock.lock().await;

        if self.fs.exists(&path).await {
            return Err(JournalError::AlreadyExists(id));
        }
        self.fs
            .create_dir_all(self.layout.dir())
            .await
            .map_err(fs_error)?;

        let content = header::render_journal(character, backstory);
        self.write_journal(&path, &content).await?;
        drop(guard);

        tracing::info!(campaign_id = %id, name = %name, "created campaign journal");
        self.trigger.warm_index(&id);

        Ok(Campaign {
            id,
            name: name.to_string(),
            journal_path: path,
        })
    }

    /// Create a campaign with a default level-1 character and no backstory.
    pub async fn create_stub(&self, name: &str) -> Result<Campaign, JournalError> {
        self.create(&CharacterSheet::defaults(name), None).await
    }

    // ------------------------------------------------------------------
    // Reads (unlocked)
    // ------------------------------------------------------------------

    pub async fn get_campaign(&self, campaign_id: &str) -> Result<Campaign, JournalError> {
        let content = self.read_journal(campaign_id).await?;
        Ok(Campaign {
            id: campaign_id.to_string(),
            name: header::campaign_title(&content).unwrap_or_else(|| campaign_id.to_string()),
            journal_path: self.layout.journal_path(campaign_id),
        })
    }

    /// All campaigns in the journal directory, sorted by id.
    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>, JournalError> {
        if !self.fs.exists(self.layout.dir()).await {
            return Ok(Vec::new());
        }
        let paths = self
            .fs
            .list_dir(self.layout.dir())
            .await
            .map_err(fs_error)?;

        let mut campaigns = Vec::new();
        for path in paths {
            let Some(id) = JournalLayout::campaign_id_from_path(&path) else {
                continue;
            };
            let name = match self.fs.read_file(&path).await {
                Ok(content) => header::campaign_title(&content).unwrap_or_else(|| id.clone()),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable journal");
                    id.clone()
                }
            };
            campaigns.push(Campaign {
                id,
                name,
                journal_path: path,
            });
        }
        campaigns.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(campaigns)
    }

    pub async fn read_character(&self, campaign_id: &str) -> Result<CharacterSheet, JournalError> {
        let content = self.read_journal(campaign_id).await?;
        Ok(header::parse_character(&content))
    }

    /// A campaign is in its creation phase until the character swears a vow.
    pub async fn is_creation_phase(&self, campaign_id: &str) -> Result<bool, JournalError> {
        Ok(self.read_character(campaign_id).await?.vows.is_empty())
    }

    /// The narrative section, trimmed.
    pub async fn get_full_journal(&self, campaign_id: &str) -> Result<String, JournalError> {
        let content = self.read_journal(campaign_id).await?;
        Ok(super::narrative_section(&content))
    }

    /// The last `max_lines` lines of the narrative section, trimmed.
    pub async fn get_recent_journal(
        &self,
        campaign_id: &str,
        max_lines: usize,
    ) -> Result<String, JournalError> {
        let content = self.read_journal(campaign_id).await?;
        let Some(lines) = journal_section_lines(&content) else {
            return Ok(String::new());
        };
        let start = lines.len().saturating_sub(max_lines);
        Ok(lines[start..].join("\n").trim().to_string())
    }

    // ------------------------------------------------------------------
    // Mutations (locked)
    // ------------------------------------------------------------------

    /// Rewrite the stats, meters and vow block from `character`.
    pub async fn update_character(
        &self,
        campaign_id: &str,
        character: &CharacterSheet,
    ) -> Result<(), JournalError> {
        validate_id(campaign_id)?;
        let lock = self.lock_for(campaign_id);
        let _guard = lock.lock().await;

        let content = self.read_journal(campaign_id).await?;
        let updated = header::apply_character(&content, character);
        self.write_journal(&self.layout.journal_path(campaign_id), &updated)
            .await?;
        tracing::info!(campaign_id = %campaign_id, vows = character.vows.len(), "updated character");
        Ok(())
    }

    pub async fn append_narrative(&self, campaign_id: &str, text: &str) -> Result<(), JournalError> {
        self.append(campaign_id, text, |t| format!("\n{t}\n")).await
    }

    /// Append a dice or oracle result as a quote-marked line.
    pub async fn append_mechanical(&self, campaign_id: &str, text: &str) -> Result<(), JournalError> {
        self.append(campaign_id, text, |t| format!("\n> {t}\n")).await
    }

    /// Append the player's literal input wrapped in player tags.
    pub async fn append_player_input(
        &self,
        campaign_id: &str,
        text: &str,
    ) -> Result<(), JournalError> {
        self.append(campaign_id, text, |t| {
            format!("\n{PLAYER_OPEN_TAG}\n{t}\n{PLAYER_CLOSE_TAG}\n")
        })
        .await
    }

    async fn append(
        &self,
        campaign_id: &str,
        text: &str,
        wrap: impl FnOnce(&str) -> String,
    ) -> Result<(), JournalError> {
        validate_id(campaign_id)?;
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!(campaign_id = %campaign_id, "ignoring empty append");
            return Ok(());
        }

        let path = self.layout.journal_path(campaign_id);
        let lock = self.lock_for(campaign_id);
        let guard = lock.lock().await;
        self.fs
            .append_file(&path, &wrap(text))
            .await
            .map_err(|e| read_error(campaign_id, e))?;
        drop(guard);

        self.trigger.request_index(campaign_id);
        Ok(())
    }

    /// Backtrack: delete block `block_index` of the narrative section and
    /// everything after it, along with the blank lines that preceded it.
    ///
    /// Returns `false` (and changes nothing) when the block does not exist.
    #[tracing::instrument(name = "truncate_journal", skip(self), fields(campaign_id = %campaign_id))]
    pub async fn truncate_journal(
        &self,
        campaign_id: &str,
        block_index: usize,
    ) -> Result<bool, JournalError> {
        validate_id(campaign_id)?;
        let lock = self.lock_for(campaign_id);
        let guard = lock.lock().await;

        let content = self.read_journal(campaign_id).await?;
        let lines: Vec<&str> = content.lines().collect();
        let Some(marker) = journal_marker_line(&lines) else {
            tracing::warn!("journal has no narrative section; nothing to truncate");
            return Ok(false);
        };
        let section_start = marker + 1;
        let section = lines[section_start..].join("\n");

        let Some(offset) = parser::find_block_start_line(&section, block_index) else {
            tracing::warn!(block_index, "block not found; journal left unchanged");
            return Ok(false);
        };

        let mut cut = section_start + offset;
        while cut > section_start && lines[cut - 1].trim().is_empty() {
            cut -= 1;
        }
        let mut truncated = lines[..cut].join("\n");
        truncated.push_str("\n\n");

        self.write_journal(&self.layout.journal_path(campaign_id), &truncated)
            .await?;
        drop(guard);

        tracing::info!(block_index, removed_lines = lines.len() - cut, "truncated journal");
        self.trigger.request_index(campaign_id);
        Ok(true)
    }

    /// Replace every occurrence of `original` (trimmed) with `replacement`
    /// (trimmed) in the raw journal file.
    ///
    /// Returns `false` (and changes nothing) when `original` is not present.
    pub async fn replace_block_text(
        &self,
        campaign_id: &str,
        original: &str,
        replacement: &str,
    ) -> Result<bool, JournalError> {
        validate_id(campaign_id)?;
        let original = original.trim();
        if original.is_empty() {
            tracing::warn!(campaign_id = %campaign_id, "refusing to replace empty text");
            return Ok(false);
        }

        let lock = self.lock_for(campaign_id);
        let guard = lock.lock().await;

        let content = self.read_journal(campaign_id).await?;
        if !content.contains(original) {
            tracing::warn!(campaign_id = %campaign_id, "text to replace not found; journal left unchanged");
            return Ok(false);
        }
        let updated = content.replace(original, replacement.trim());
        self.write_journal(&self.layout.journal_path(campaign_id), &updated)
            .await?;
        drop(guard);

        tracing::info!(campaign_id = %campaign_id, "replaced journal text");
        self.trigger.request_index(campaign_id);
        Ok(true)
    }

    /// Delete the journal file and its story memory, then drop the lock.
    ///
    /// Embeddings and index state are gone by the time this returns, so a
    /// campaign re-created under the same id starts with an empty index.
    /// Returns `false` if there was no such campaign.
    pub async fn delete_campaign(&self, campaign_id: &str) -> Result<bool, JournalError> {
        validate_id(campaign_id)?;
        let path = self.layout.journal_path(campaign_id);
        let lock = self.lock_for(campaign_id);
        let guard = lock.lock().await;

        if !self.fs.exists(&path).await {
            drop(guard);
            self.locks.remove(campaign_id);
            return Ok(false);
        }
        self.fs.remove_file(&path).await.map_err(fs_error)?;
        self.trigger.forget_campaign(campaign_id).await;
        drop(guard);

        self.locks.remove(campaign_id);
        tracing::info!(campaign_id = %campaign_id, "deleted campaign");
        Ok(true)
    }
}
