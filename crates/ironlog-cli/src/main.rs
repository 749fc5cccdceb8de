//! ironlog CLI entry point.
//!
//! Binary name: `ironlog`
//!
//! Parses CLI arguments, wires services over the data directory, dispatches
//! to a command handler, then lets pending index passes finish.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use ironlog_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
use ironlog_types::character::CharacterSheet;

use cli::journal::EntryKind;
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(TracingOptions {
        json: cli.log_json,
        enable_otel: cli.otel,
        default_directive: cli.log_directive().to_string(),
    })
    .map_err(|e| anyhow::anyhow!("failed to initialise tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "ironlog", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = run(&cli, &state).await;

    // Index passes requested by this command run before exit, even on error.
    state.shutdown().await;
    shutdown_tracing();
    result
}

async fn run(cli: &Cli, state: &AppState) -> anyhow::Result<()> {
    let (json, quiet) = (cli.json, cli.quiet);

    match &cli.command {
        Commands::List => cli::campaign::list_campaigns(state, json).await,

        Commands::New {
            name,
            backstory,
            edge,
            heart,
            iron,
            shadow,
            wits,
        } => {
            let character = CharacterSheet {
                edge: *edge,
                heart: *heart,
                iron: *iron,
                shadow: *shadow,
                wits: *wits,
                ..CharacterSheet::defaults(name.trim())
            };
            cli::campaign::new_campaign(state, character, backstory.clone(), json, quiet).await
        }

        Commands::Show { id, lines } => cli::campaign::show_campaign(state, id, *lines, json).await,

        Commands::Append {
            id,
            text,
            mechanical,
            player,
            generated,
        } => {
            let kind = EntryKind::from_flags(*mechanical, *player, *generated);
            cli::journal::append_entry(state, id, text, kind, quiet).await
        }

        Commands::Context { id, exchanges } => {
            cli::journal::show_context(state, id, *exchanges, json).await
        }

        Commands::Blocks { id } => cli::journal::list_blocks(state, id, json).await,

        Commands::Backtrack { id, block } => {
            cli::journal::backtrack(state, id, *block, json, quiet).await
        }

        Commands::Replace { id, old, new } => {
            cli::journal::replace_text(state, id, old, new, json, quiet).await
        }

        Commands::Vow { action } => {
            cli::vow::handle_vow_command(action.clone(), state, json, quiet).await
        }

        Commands::Delete { id } => cli::campaign::delete_campaign(state, id, json, quiet).await,

        Commands::Reindex { id } => cli::memory::reindex(state, id.as_deref(), json, quiet).await,

        Commands::Recall { id, query } => cli::memory::recall(state, id, query, json).await,

        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
