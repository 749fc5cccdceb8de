//! Campaign journals: file layout, block parsing, header handling, and the
//! lock-guarded journal store.

pub mod header;
pub mod parser;
pub mod sanitize;
pub mod service;

use std::path::{Path, PathBuf};

use ironlog_types::journal::JOURNAL_MARKER;

/// Directory (inside the journal directory) holding per-campaign index state.
pub const INDEX_STATE_DIR: &str = ".memory-index";

const JOURNAL_EXTENSION: &str = "md";

/// Where journal files and index state live on disk.
///
/// ```text
/// {dir}/{campaign_id}.md
/// {dir}/.memory-index/{campaign_id}.json
/// ```
#[derive(Debug, Clone)]
pub struct JournalLayout {
    dir: PathBuf,
}

impl JournalLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn journal_path(&self, campaign_id: &str) -> PathBuf {
        self.dir.join(format!("{campaign_id}.{JOURNAL_EXTENSION}"))
    }

    pub fn index_dir(&self) -> PathBuf {
        self.dir.join(INDEX_STATE_DIR)
    }

    pub fn index_state_path(&self, campaign_id: &str) -> PathBuf {
        self.index_dir().join(format!("{campaign_id}.json"))
    }

    /// Campaign id for a journal path, if it looks like one.
    pub fn campaign_id_from_path(path: &Path) -> Option<String> {
        if path.extension().and_then(|e| e.to_str()) != Some(JOURNAL_EXTENSION) {
            return None;
        }
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
    }
}

/// Index of the `## Journal` marker line.
pub fn journal_marker_line(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| line.trim() == JOURNAL_MARKER)
}

/// Raw lines after the `## Journal` marker, or `None` if there is no marker.
pub fn journal_section_lines(content: &str) -> Option<Vec<&str>> {
    let lines: Vec<&str> = content.lines().collect();
    let marker = journal_marker_line(&lines)?;
    Some(lines[marker + 1..].to_vec())
}

/// The narrative section, trimmed. Empty when there is no marker.
pub fn narrative_section(content: &str) -> String {
    journal_section_lines(content)
        .map(|lines| lines.join("\n").trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = JournalLayout::new("/data/journals");
        assert_eq!(
            layout.journal_path("kira"),
            PathBuf::from("/data/journals/kira.md")
        );
        assert_eq!(
            layout.index_state_path("kira"),
            PathBuf::from("/data/journals/.memory-index/kira.json")
        );
    }

    #[test]
    fn test_campaign_id_from_path() {
        assert_eq!(
            JournalLayout::campaign_id_from_path(Path::new("/j/test-hero.md")),
            Some("test-hero".to_string())
        );
        assert_eq!(JournalLayout::campaign_id_from_path(Path::new("/j/notes.txt")), None);
    }

    #[test]
    fn test_narrative_section() {
        let content = "# Ironsworn: A\n\n## Journal\n\n\nFirst line.\n\nSecond.\n\n";
        assert_eq!(narrative_section(content), "First line.\n\nSecond.");
        assert_eq!(narrative_section("no marker"), "");
        assert_eq!(narrative_section("## Journal\n\n"), "");
    }
}
