//! Campaign lifecycle CLI commands: list, new, show, delete.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use ironlog_core::journal::parser;
use ironlog_types::character::CharacterSheet;

use super::success;
use crate::state::AppState;

/// List all campaigns with their journal size.
pub async fn list_campaigns(state: &AppState, json: bool) -> Result<()> {
    let campaigns = state.journal_service.list_campaigns().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&campaigns)?);
        return Ok(());
    }

    if campaigns.is_empty() {
        println!();
        println!(
            "  {} No campaigns yet. Start one with: {}",
            style("i").blue().bold(),
            style("ironlog new \"<character name>\"").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Blocks").fg(Color::White),
        Cell::new("Turns").fg(Color::White),
        Cell::new("Vows").fg(Color::White),
    ]);

    for campaign in &campaigns {
        let journal = state.journal_service.get_full_journal(&campaign.id).await?;
        let vows = if state.journal_service.is_creation_phase(&campaign.id).await? {
            Cell::new("creating").fg(Color::Yellow)
        } else {
            let sheet = state.journal_service.read_character(&campaign.id).await?;
            Cell::new(sheet.vows.len()).fg(Color::Green)
        };

        table.add_row(vec![
            Cell::new(&campaign.id).fg(Color::Cyan),
            Cell::new(&campaign.name),
            Cell::new(parser::count_blocks(&journal)),
            Cell::new(parser::count_player_turns(&journal)),
            vows,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Create a campaign journal for a new character.
pub async fn new_campaign(
    state: &AppState,
    character: CharacterSheet,
    backstory: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let campaign = state
        .journal_service
        .create(&character, backstory.as_deref())
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&campaign)?);
        return Ok(());
    }

    success(
        quiet,
        format!(
            "Campaign {} created for {}",
            style(&campaign.id).cyan(),
            style(&campaign.name).bold()
        ),
    );
    if !quiet {
        println!(
            "    {}",
            style(campaign.journal_path.display().to_string()).dim()
        );
        println!(
            "    Swear your first vow: {}",
            style(format!(
                "ironlog vow add {} \"<vow>\" --rank dangerous",
                campaign.id
            ))
            .yellow()
        );
    }
    Ok(())
}

/// Show the character sheet and the tail of the journal.
pub async fn show_campaign(state: &AppState, id: &str, lines: usize, json: bool) -> Result<()> {
    let campaign = state.journal_service.get_campaign(id).await?;
    let sheet = state.journal_service.read_character(id).await?;
    let recent = state.journal_service.get_recent_journal(id, lines).await?;
    let full = state.journal_service.get_full_journal(id).await?;
    let awaiting = parser::needs_narration(&full);

    if json {
        let view = serde_json::json!({
            "campaign": campaign,
            "character": sheet,
            "recent": recent,
            "awaiting_narration": awaiting,
            "player_turn_pending": parser::ends_with_player_entry(&full),
            "last_player_input": parser::extract_last_player_input(&full),
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&sheet.name).cyan().bold());
    println!();
    println!(
        "  Edge {}  Heart {}  Iron {}  Shadow {}  Wits {}",
        sheet.edge, sheet.heart, sheet.iron, sheet.shadow, sheet.wits
    );
    println!(
        "  Health {}  Spirit {}  Supply {}  Momentum {}",
        sheet.health, sheet.spirit, sheet.supply, sheet.momentum
    );
    if sheet.has_default_stats() {
        println!("  {}", style("(stats not yet assigned)").dim());
    }
    println!();

    if sheet.vows.is_empty() {
        println!("  {} No vows sworn yet.", style("i").blue().bold());
    } else {
        println!("  {}", style("Vows").bold());
        for (i, vow) in sheet.vows.iter().enumerate() {
            let mark = if vow.is_fulfilled() {
                style("✓").green()
            } else {
                style("•").dim()
            };
            println!(
                "  {mark} {}. {} ({}, {}/10)",
                i + 1,
                vow.description,
                vow.rank,
                vow.progress
            );
        }
    }
    println!();

    if recent.is_empty() {
        println!("  {}", style("The journal is empty.").dim());
    } else {
        for line in recent.lines() {
            println!("  {line}");
        }
    }
    if awaiting {
        println!();
        println!("  {} Awaiting narration.", style("…").yellow().bold());
    }
    println!();
    Ok(())
}

/// Delete a campaign journal together with its story memory.
pub async fn delete_campaign(state: &AppState, id: &str, json: bool, quiet: bool) -> Result<()> {
    let deleted = state
        .journal_service
        .delete_campaign(id)
        .await
        .with_context(|| format!("Failed to delete campaign '{id}'"))?;
    if deleted && !state.config.memory.enabled {
        // No trigger is wired when memory is off; clear leftovers directly.
        state.scheduler.indexer().clear_campaign(id).await?;
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "id": id, "deleted": deleted }))?
        );
        return Ok(());
    }

    if deleted {
        success(quiet, format!("Campaign {} deleted", style(id).cyan()));
    } else if !quiet {
        println!(
            "  {} No campaign named {}",
            style("i").blue().bold(),
            style(id).cyan()
        );
    }
    Ok(())
}
