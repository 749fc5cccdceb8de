//! Character sheet types stored in the journal header.
//!
//! The header is hand-editable markdown, so these types favour defaults over
//! hard failures: a sheet always has five stats, four meters, and a (possibly
//! empty) vow list.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Maximum progress on a vow track.
pub const MAX_PROGRESS: u8 = 10;

/// Difficulty rank of a vow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Troublesome,
    Dangerous,
    Formidable,
    Extreme,
    Epic,
}

impl Rank {
    /// How many progress boxes a single "mark progress" fills.
    pub fn progress_per_mark(&self) -> u8 {
        match self {
            Rank::Troublesome => 3,
            Rank::Dangerous | Rank::Formidable => 2,
            Rank::Extreme | Rank::Epic => 1,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Troublesome => write!(f, "Troublesome"),
            Rank::Dangerous => write!(f, "Dangerous"),
            Rank::Formidable => write!(f, "Formidable"),
            Rank::Extreme => write!(f, "Extreme"),
            Rank::Epic => write!(f, "Epic"),
        }
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "troublesome" => Ok(Rank::Troublesome),
            "dangerous" => Ok(Rank::Dangerous),
            "formidable" => Ok(Rank::Formidable),
            "extreme" => Ok(Rank::Extreme),
            "epic" => Ok(Rank::Epic),
            other => Err(format!("invalid rank: '{other}'")),
        }
    }
}

/// A sworn vow with its progress track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vow {
    pub description: String,
    pub rank: Rank,
    /// Filled progress boxes, 0 to 10.
    pub progress: u8,
}

impl Vow {
    /// Create a vow, clamping progress to the 0..=10 track.
    pub fn new(description: impl Into<String>, rank: Rank, progress: u8) -> Self {
        Self {
            description: description.into(),
            rank,
            progress: progress.min(MAX_PROGRESS),
        }
    }

    /// A vow with a full track is rendered with a checked box.
    pub fn is_fulfilled(&self) -> bool {
        self.progress >= MAX_PROGRESS
    }
}

/// The character portion of a journal header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub name: String,
    pub edge: u8,
    pub heart: u8,
    pub iron: u8,
    pub shadow: u8,
    pub wits: u8,
    pub health: i32,
    pub spirit: i32,
    pub supply: i32,
    pub momentum: i32,
    pub vows: Vec<Vow>,
}

impl CharacterSheet {
    /// A fresh level-1 character: all stats 1, meters 5/5/5 with momentum 2.
    pub fn defaults(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            edge: 1,
            heart: 1,
            iron: 1,
            shadow: 1,
            wits: 1,
            health: 5,
            spirit: 5,
            supply: 5,
            momentum: 2,
            vows: Vec::new(),
        }
    }

    pub fn has_default_stats(&self) -> bool {
        [self.edge, self.heart, self.iron, self.shadow, self.wits]
            .iter()
            .all(|s| *s == 1)
    }

    /// Look up a stat by name (case-insensitive).
    pub fn stat(&self, name: &str) -> Option<u8> {
        match name.trim().to_lowercase().as_str() {
            "edge" => Some(self.edge),
            "heart" => Some(self.heart),
            "iron" => Some(self.iron),
            "shadow" => Some(self.shadow),
            "wits" => Some(self.wits),
            _ => None,
        }
    }
}
