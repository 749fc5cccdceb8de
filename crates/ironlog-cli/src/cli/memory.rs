//! Story memory CLI commands: reindex and recall.

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use ironlog_core::memory::retrieval::excerpt;
use ironlog_types::memory::IndexOutcome;

use crate::state::AppState;

/// Run an index pass now for one campaign, or for every campaign.
///
/// Runs regardless of `memory.enabled`, so an index can be built ahead of
/// turning memory on.
pub async fn reindex(state: &AppState, id: Option<&str>, json: bool, quiet: bool) -> Result<()> {
    let ids = match id {
        Some(id) => vec![state.journal_service.get_campaign(id).await?.id],
        None => state
            .journal_service
            .list_campaigns()
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect(),
    };

    let indexer = state.scheduler.indexer();
    let mut results: Vec<(String, IndexOutcome)> = Vec::with_capacity(ids.len());
    for id in ids {
        let outcome = indexer
            .index_now(&id)
            .await
            .with_context(|| format!("Failed to index '{id}'"))?;
        results.push((id, outcome));
    }

    if json {
        let view: Vec<_> = results
            .iter()
            .map(|(id, outcome)| serde_json::json!({ "id": id, "result": outcome }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if quiet {
        return Ok(());
    }
    if results.is_empty() {
        println!("  {} No campaigns to index.", style("i").blue().bold());
        return Ok(());
    }
    for (id, outcome) in &results {
        let mark = match outcome {
            IndexOutcome::Busy => style("…").yellow(),
            _ => style("✓").green(),
        };
        println!("  {mark} {}: {outcome}", style(id).cyan());
    }
    Ok(())
}

/// Search story memory and show the ranked excerpts.
pub async fn recall(state: &AppState, id: &str, query: &str, json: bool) -> Result<()> {
    if !state.retrieval_service.settings().enabled {
        bail!("Story memory is disabled (set [memory] enabled = true in config.toml)");
    }
    state.journal_service.get_campaign(id).await?;

    let hits = state.retrieval_service.search(id, query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!();
        println!(
            "  {} Nothing in {}'s story matches that.",
            style("i").blue().bold(),
            style(id).cyan()
        );
        println!();
        return Ok(());
    }

    let excerpt_chars = state.retrieval_service.settings().excerpt_chars;
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Score").fg(Color::White),
        Cell::new("Exchange").fg(Color::White),
        Cell::new("Excerpt").fg(Color::White),
    ]);
    for hit in &hits {
        table.add_row(vec![
            Cell::new(format!("{:.2}", hit.score)).fg(Color::Yellow),
            Cell::new(hit.entry.exchange_index).fg(Color::Cyan),
            Cell::new(excerpt(&hit.entry.text, excerpt_chars)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}
