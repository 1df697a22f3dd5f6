//! API key commands

use anyhow::{Context, Result};
use attribute_extraction::Credential;
use clap::Subcommand;

use super::validate_credential;
use crate::context::AppContext;

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Save an API key to the credential store
    Save {
        /// Gemini keys start with AIza, anything else is treated as Perplexity
        key: String,
    },
    /// Show the stored API key (masked) and the provider it routes to
    Show,
    /// Check an API key against its provider
    Validate {
        /// Key to check instead of the configured one
        #[arg(long)]
        key: Option<String>,
    },
}

pub async fn run(ctx: &mut AppContext, command: KeyCommand) -> Result<()> {
    match command {
        KeyCommand::Save { key } => save(ctx, &key),
        KeyCommand::Show => show(ctx),
        KeyCommand::Validate { key } => validate(ctx, key.as_deref()).await,
    }
}

fn save(ctx: &mut AppContext, key: &str) -> Result<()> {
    let credential = Credential::new(key);
    if credential.is_empty() {
        anyhow::bail!("API key is empty.");
    }

    let summary = format!("{} key {}", credential.provider(), credential.masked());
    ctx.session
        .save_credential(&ctx.store, credential)
        .context("Failed to save API key")?;

    ctx.print_success(&format!("Saved {}", summary));
    ctx.print_info(&format!("Store: {}", ctx.store.path().display()));
    Ok(())
}

fn show(ctx: &mut AppContext) -> Result<()> {
    if !ctx.session.restore_credential(&ctx.store)? {
        ctx.print_warning("No API key saved. Use `attrx key save <KEY>`.");
        return Ok(());
    }

    if let Some(credential) = ctx.session.credential() {
        ctx.print_info(&format!(
            "{} key {}",
            credential.provider(),
            credential.masked()
        ));
    }
    Ok(())
}

async fn validate(ctx: &mut AppContext, key: Option<&str>) -> Result<()> {
    if !ctx.resolve_credential(key)? {
        anyhow::bail!("Please enter and save an API key before fetching attributes.");
    }

    ctx.print_header("Validating API key");
    validate_credential(ctx).await
}
