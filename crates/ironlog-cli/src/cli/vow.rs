//! Vow CLI commands: swear a vow, mark progress.

use anyhow::{Result, bail};
use clap::Subcommand;
use console::style;

use ironlog_types::character::{MAX_PROGRESS, Rank, Vow};

use super::success;
use crate::state::AppState;

#[derive(Clone, Subcommand)]
pub enum VowCommand {
    /// Swear a new vow.
    Add {
        /// Campaign id.
        id: String,

        /// What the character vows to do.
        description: String,

        /// troublesome, dangerous, formidable, extreme or epic.
        #[arg(long, default_value = "dangerous", value_parser = parse_rank)]
        rank: Rank,
    },

    /// Mark progress on a vow (one mark fills boxes according to its rank).
    Mark {
        /// Campaign id.
        id: String,

        /// Vow number as shown by `ironlog show`.
        number: usize,

        /// Number of marks to make.
        #[arg(long, default_value_t = 1)]
        times: u8,
    },
}

fn parse_rank(value: &str) -> Result<Rank, String> {
    value.parse()
}

/// Progress after `times` marks, capped at the end of the track.
fn marked_progress(vow: &Vow, times: u8) -> u8 {
    let gained = u16::from(vow.rank.progress_per_mark()) * u16::from(times);
    (u16::from(vow.progress) + gained).min(u16::from(MAX_PROGRESS)) as u8
}

pub async fn handle_vow_command(action: VowCommand, state: &AppState, json: bool, quiet: bool) -> Result<()> {
    match action {
        VowCommand::Add {
            id,
            description,
            rank,
        } => {
            if description.trim().is_empty() {
                bail!("Vow description cannot be empty");
            }
            let mut sheet = state.journal_service.read_character(&id).await?;
            sheet.vows.push(Vow::new(description.trim(), rank, 0));
            state.journal_service.update_character(&id, &sheet).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&sheet.vows)?);
            } else {
                success(
                    quiet,
                    format!("Sworn a {} vow: {}", rank, style(description.trim()).bold()),
                );
            }
        }

        VowCommand::Mark { id, number, times } => {
            let mut sheet = state.journal_service.read_character(&id).await?;
            let count = sheet.vows.len();
            let Some(vow) = number.checked_sub(1).and_then(|i| sheet.vows.get_mut(i)) else {
                bail!("Vow {number} does not exist ({count} sworn)");
            };
            vow.progress = marked_progress(vow, times);
            let updated = vow.clone();
            state.journal_service.update_character(&id, &sheet).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&updated)?);
            } else if updated.is_fulfilled() {
                success(
                    quiet,
                    format!(
                        "{} is ready to be fulfilled ({}/10)",
                        style(&updated.description).bold(),
                        updated.progress
                    ),
                );
            } else {
                success(
                    quiet,
                    format!(
                        "{}: {}/10",
                        style(&updated.description).bold(),
                        updated.progress
                    ),
                );
            }
        }
    }
    Ok(())
}
