use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gott_cli::commands::{annotate, cancel, edit, resume, start, status, stop, summary, track};
use gott_cli::{Cli, Commands, Config};
use gott_db::Store;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut store = Store::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let command = cli.command.unwrap_or(Commands::Status);
    let now = gott_db::now();
    let today = now.date_naive();
    let mut out = std::io::stdout().lock();

    match &command {
        Commands::Status => status::run(&mut out, &store, now)?,
        Commands::Start { tokens } => start::run(&mut out, &mut store, tokens, now)?,
        Commands::Stop => stop::run(&mut out, &mut store, now)?,
        Commands::Cancel => cancel::run(&mut out, &mut store)?,
        Commands::Annotate { tokens } => annotate::run(&mut out, &mut store, tokens, now)?,
        Commands::Continue => resume::run(&mut out, &mut store, now)?,
        Commands::Track(args) => track::run(&mut out, &mut store, args, today)?,
        Commands::Summary { filter } => summary::run(&mut out, &store, filter, now)?,
        Commands::Edit { filter } => {
            let editor = config.editor_command();
            edit::run(&mut out, &mut store, filter, &editor, today)?;
        }
    }

    if command.mutates() {
        store
            .save()
            .with_context(|| format!("failed to save {}", config.database_path.display()))?;
    }

    Ok(())
}
