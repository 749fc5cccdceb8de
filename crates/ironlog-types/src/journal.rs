//! Parsed journal structures.
//!
//! The narrative section of a journal is segmented into typed blocks and
//! coarser exchanges by the parser in `ironlog-core`.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Literal line that opens a player block.
pub const PLAYER_OPEN_TAG: &str = "<player>";
/// Literal line that closes a player block.
pub const PLAYER_CLOSE_TAG: &str = "</player>";
/// Heading that separates the header from the narrative section.
pub const JOURNAL_MARKER: &str = "## Journal";

/// Kind of a journal block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Literal player input wrapped in `<player>` tags.
    Player,
    /// Quote-marked bold line(s): move results and oracle rolls.
    Mechanical,
    /// Any other prose.
    Narrative,
}

impl BlockKind {
    /// Player and mechanical blocks start a new exchange.
    pub fn is_exchange_boundary(&self) -> bool {
        matches!(self, BlockKind::Player | BlockKind::Mechanical)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Player => write!(f, "player"),
            BlockKind::Mechanical => write!(f, "mechanical"),
            BlockKind::Narrative => write!(f, "narrative"),
        }
    }
}

/// A typed, ordinal-indexed, contiguous unit of narrative-section content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: usize,
    pub kind: BlockKind,
    /// For player blocks, the trimmed inner text; otherwise the block's lines.
    pub text: String,
    /// First line of the block, relative to the parsed text.
    pub start_line: usize,
    /// Last line of the block (inclusive).
    pub end_line: usize,
    /// False only for a player block whose closing tag never appeared.
    pub complete: bool,
}

/// A player or mechanical block plus the narrative that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub index: usize,
    /// Raw lines of the exchange, trimmed of surrounding blank lines.
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
}
