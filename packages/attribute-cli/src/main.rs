//! `attrx`: extract product attributes from a spreadsheet of product links.

mod commands;
mod config;
mod context;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::key::KeyCommand;
use commands::run::RunArgs;
use context::AppContext;

#[derive(Parser, Debug)]
#[command(name = "attrx", version, about = "Extract product attributes with Gemini or Perplexity")]
struct Cli {
    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the stored API key
    #[command(subcommand)]
    Key(KeyCommand),
    /// Load a spreadsheet, fetch attributes, and export CSV in one go
    Run(RunArgs),
    /// Step through upload, selection, fetch, and export interactively (default)
    Wizard,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,attribute_extraction=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut ctx = AppContext::new(cli.quiet)?;
    tracing::debug!(store = %ctx.store.path().display(), "Configuration loaded");

    match cli.command.unwrap_or(Commands::Wizard) {
        Commands::Key(command) => commands::key::run(&mut ctx, command).await,
        Commands::Run(args) => commands::run::run(&mut ctx, args).await,
        Commands::Wizard => commands::wizard::run(&mut ctx).await,
    }
}
