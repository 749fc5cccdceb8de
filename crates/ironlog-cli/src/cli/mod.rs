//! CLI command definitions for the `ironlog` binary.
//!
//! Uses clap derive macros for argument parsing. Commands take the campaign
//! id (the slug of the character name) as their first argument.

pub mod campaign;
pub mod journal;
pub mod memory;
pub mod vow;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Keep an Ironsworn campaign journal with searchable story memory.
#[derive(Parser)]
#[command(name = "ironlog", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit log records as JSON lines.
    #[arg(long, global = true, env = "IRONLOG_LOG_JSON")]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "IRONLOG_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List campaigns.
    #[command(alias = "ls")]
    List,

    /// Start a new campaign for a character.
    New {
        /// Character name; its slug becomes the campaign id.
        name: String,

        /// Opening narrative written below the journal heading.
        #[arg(long)]
        backstory: Option<String>,

        #[arg(long, default_value_t = 1)]
        edge: u8,
        #[arg(long, default_value_t = 1)]
        heart: u8,
        #[arg(long, default_value_t = 1)]
        iron: u8,
        #[arg(long, default_value_t = 1)]
        shadow: u8,
        #[arg(long, default_value_t = 1)]
        wits: u8,
    },

    /// Show the character sheet and the end of the journal.
    Show {
        /// Campaign id.
        id: String,

        /// Journal lines to show.
        #[arg(short, long, default_value_t = 20)]
        lines: usize,
    },

    /// Append an entry to the journal (narrative unless a kind flag is given).
    Append {
        /// Campaign id.
        id: String,

        /// Entry text.
        text: String,

        /// Record a move or oracle result as a mechanical line.
        #[arg(long, conflicts_with = "player")]
        mechanical: bool,

        /// Record literal player input.
        #[arg(long)]
        player: bool,

        /// Narration pasted from a generator: strip stray quote markers and
        /// oracle lines that were already recorded.
        #[arg(long, conflicts_with_all = ["mechanical", "player"])]
        generated: bool,
    },

    /// Print the last exchanges of the journal.
    Context {
        /// Campaign id.
        id: String,

        /// Number of exchanges.
        #[arg(short = 'n', long, default_value_t = 3)]
        exchanges: usize,
    },

    /// List the blocks of the journal with their indices.
    Blocks {
        /// Campaign id.
        id: String,
    },

    /// Remove a block and everything after it.
    Backtrack {
        /// Campaign id.
        id: String,

        /// Index of the first block to remove (see `ironlog blocks`).
        block: usize,
    },

    /// Replace every occurrence of a passage in the journal.
    Replace {
        /// Campaign id.
        id: String,

        /// Exact text to replace.
        old: String,

        /// Replacement text.
        new: String,
    },

    /// Manage vows on the character sheet.
    Vow {
        #[command(subcommand)]
        action: vow::VowCommand,
    },

    /// Delete a campaign journal and its story memory.
    #[command(alias = "rm")]
    Delete {
        /// Campaign id.
        id: String,
    },

    /// Bring the story memory index up to date now.
    Reindex {
        /// Campaign id; all campaigns when omitted.
        id: Option<String>,
    },

    /// Search story memory for passages related to a query.
    Recall {
        /// Campaign id.
        id: String,

        /// Free-text query.
        query: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Default log directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,ironlog=debug",
            _ => "trace",
        }
    }
}

/// Styled `✓ message` line unless quiet.
pub(crate) fn success(quiet: bool, message: impl std::fmt::Display) {
    if !quiet {
        println!("  {} {message}", console::style("✓").green().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_append_kind_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "ironlog",
            "append",
            "kira",
            "text",
            "--mechanical",
            "--player",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_generated_only_applies_to_narrative() {
        let parsed = Cli::try_parse_from(["ironlog", "append", "kira", "text", "--generated"]);
        assert!(parsed.is_ok());
        let parsed =
            Cli::try_parse_from(["ironlog", "append", "kira", "text", "--generated", "--player"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_verbosity_directives() {
        let cli = Cli::try_parse_from(["ironlog", "-vv", "list"]).unwrap();
        assert_eq!(cli.log_directive(), "trace");
        let cli = Cli::try_parse_from(["ironlog", "--quiet", "list"]).unwrap();
        assert_eq!(cli.log_directive(), "error");
    }

    #[test]
    fn test_new_defaults_stats_to_one() {
        let cli = Cli::try_parse_from(["ironlog", "new", "Kira", "--iron", "3"]).unwrap();
        match cli.command {
            Commands::New { edge, iron, .. } => {
                assert_eq!(edge, 1);
                assert_eq!(iron, 3);
            }
            _ => panic!("expected new command"),
        }
    }
}
