//! Journal editing CLI commands: append, context, blocks, backtrack, replace.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use ironlog_core::journal::{parser, sanitize};
use ironlog_types::journal::BlockKind;

use super::success;
use crate::state::AppState;

/// Which kind of entry `append` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Narrative,
    /// Narration produced by a generator, cleaned before it is stored.
    GeneratedNarrative,
    Mechanical,
    Player,
}

impl EntryKind {
    pub fn from_flags(mechanical: bool, player: bool, generated: bool) -> Self {
        match (mechanical, player, generated) {
            (true, _, _) => EntryKind::Mechanical,
            (_, true, _) => EntryKind::Player,
            (_, _, true) => EntryKind::GeneratedNarrative,
            _ => EntryKind::Narrative,
        }
    }
}

/// Oracle results are appended as mechanical lines when rolled, so copies
/// of them inside generated narration are dropped.
fn clean_generated(text: &str) -> String {
    sanitize::strip_oracle_lines(&sanitize::sanitize_narrative(text))
}

pub async fn append_entry(
    state: &AppState,
    id: &str,
    text: &str,
    kind: EntryKind,
    quiet: bool,
) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Entry text cannot be empty");
    }
    let journals = &state.journal_service;
    match kind {
        EntryKind::Narrative => journals.append_narrative(id, text).await?,
        EntryKind::GeneratedNarrative => {
            journals.append_narrative(id, &clean_generated(text)).await?
        }
        EntryKind::Mechanical => journals.append_mechanical(id, text).await?,
        EntryKind::Player => journals.append_player_input(id, text).await?,
    }
    success(quiet, format!("Appended to {}", style(id).cyan()));
    Ok(())
}

/// Print the last `count` exchanges, the window a narrator prompt would use.
pub async fn show_context(state: &AppState, id: &str, count: usize, json: bool) -> Result<()> {
    let journal = state.journal_service.get_full_journal(id).await?;
    let window = parser::last_exchanges(&journal, count);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "id": id, "context": window }))?
        );
    } else {
        println!("{window}");
    }
    Ok(())
}

fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

/// Table of parsed blocks so a backtrack target can be picked by index.
pub async fn list_blocks(state: &AppState, id: &str, json: bool) -> Result<()> {
    let journal = state.journal_service.get_full_journal(id).await?;
    let blocks = parser::parse_to_blocks(&journal);

    if json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }

    if blocks.is_empty() {
        println!();
        println!("  {} The journal of {} is empty.", style("i").blue().bold(), style(id).cyan());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Lines").fg(Color::White),
        Cell::new("Text").fg(Color::White),
    ]);

    for block in &blocks {
        let kind = match block.kind {
            BlockKind::Player if !block.complete => {
                Cell::new("player (open)").fg(Color::Red)
            }
            BlockKind::Player => Cell::new(block.kind).fg(Color::Green),
            BlockKind::Mechanical => Cell::new(block.kind).fg(Color::Yellow),
            BlockKind::Narrative => Cell::new(block.kind).fg(Color::Blue),
        };
        table.add_row(vec![
            Cell::new(block.index).fg(Color::Cyan),
            kind,
            Cell::new(format!("{}-{}", block.start_line, block.end_line)).fg(Color::DarkGrey),
            Cell::new(preview(&block.text, 70)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub async fn backtrack(state: &AppState, id: &str, block: usize, json: bool, quiet: bool) -> Result<()> {
    let truncated = state.journal_service.truncate_journal(id, block).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "id": id,
                "block": block,
                "truncated": truncated,
            }))?
        );
        return Ok(());
    }

    if truncated {
        success(
            quiet,
            format!("Removed block {block} and everything after it from {}", style(id).cyan()),
        );
    } else {
        bail!("Block {block} does not exist in '{id}' (see `ironlog blocks {id}`)");
    }
    Ok(())
}

pub async fn replace_text(
    state: &AppState,
    id: &str,
    old: &str,
    new: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let replaced = state.journal_service.replace_block_text(id, old, new).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "id": id, "replaced": replaced }))?
        );
        return Ok(());
    }

    if !replaced {
        bail!("Text not found in '{id}'; journal left unchanged");
    }
    success(quiet, format!("Updated journal of {}", style(id).cyan()));
    Ok(())
}
