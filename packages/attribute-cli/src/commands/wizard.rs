//! Interactive upload, choose, fetch, and export flow

use std::path::{Path, PathBuf};

use anyhow::Result;
use attribute_extraction::{Credential, ExtractionSchema, ProductId, DEFAULT_EXPORT_FILE};
use console::style;
use dialoguer::{Input, MultiSelect, Password, Select};

use super::{print_products, print_report, validate_credential};
use crate::context::AppContext;

const MODES: [&str; 2] = ["On the fly", "Schema master"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Upload,
    Mode,
    Select,
    Fetch,
    Results,
    Export,
    ChangeKey,
    Quit,
}

impl Action {
    const ALL: [Action; 8] = [
        Action::Upload,
        Action::Mode,
        Action::Select,
        Action::Fetch,
        Action::Results,
        Action::Export,
        Action::ChangeKey,
        Action::Quit,
    ];

    fn label(self) -> &'static str {
        match self {
            Action::Upload => "Upload spreadsheet",
            Action::Mode => "Choose extraction mode",
            Action::Select => "Select products",
            Action::Fetch => "Fetch attributes",
            Action::Results => "Show results",
            Action::Export => "Export CSV",
            Action::ChangeKey => "Change API key",
            Action::Quit => "Quit",
        }
    }
}

pub async fn run(ctx: &mut AppContext) -> Result<()> {
    ctx.print_header("Product Attribute Extractor");

    ensure_credential(ctx).await?;

    loop {
        print_status(ctx);

        let labels: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
        let selection = Select::with_theme(&ctx.theme())
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(default_action(ctx) as usize)
            .interact()?;

        // Step failures are shown and the menu comes back
        let result = match Action::ALL[selection] {
            Action::Upload => upload(ctx),
            Action::Mode => choose_mode(ctx),
            Action::Select => select_products(ctx),
            Action::Fetch => fetch(ctx).await,
            Action::Results => {
                print_products(ctx);
                Ok(())
            }
            Action::Export => export(ctx),
            Action::ChangeKey => change_key(ctx).await,
            Action::Quit => break,
        };

        if let Err(e) = result {
            ctx.print_error(&format!("{:#}", e));
        }
    }

    Ok(())
}

/// Next sensible step given the session state.
fn default_action(ctx: &AppContext) -> Action {
    let session = &ctx.session;
    if session.products().is_empty() {
        Action::Upload
    } else if session.selected().is_empty() {
        Action::Select
    } else if session.products().iter().any(|p| p.attributes().is_some() || p.error().is_some()) {
        Action::Export
    } else {
        Action::Fetch
    }
}

fn print_status(ctx: &AppContext) {
    if ctx.quiet {
        return;
    }

    let session = &ctx.session;
    let key = match (session.credential(), session.is_validated()) {
        (Some(c), true) => style(format!("{} {} (validated)", c.provider(), c.masked())).green(),
        (Some(c), false) => style(format!("{} {} (not validated)", c.provider(), c.masked())).yellow(),
        (None, _) => style("none".to_string()).red(),
    };
    let mode = match session.choice().category() {
        Some(category) => format!("Schema master: {}", category),
        None => MODES[0].to_string(),
    };

    println!();
    println!("  API key:  {}", key);
    println!(
        "  Products: {} loaded, {} selected",
        session.products().len(),
        session.selected().len()
    );
    println!("  Mode:     {}", mode);
}

/// Restore or ask for a key, then validate it. Declining to retry leaves the
/// key unvalidated; fetching will refuse until it is fixed.
async fn ensure_credential(ctx: &mut AppContext) -> Result<()> {
    if !ctx.resolve_credential(None)? {
        ctx.print_info("No API key saved yet.");
        prompt_for_key(ctx)?;
    }

    loop {
        match validate_credential(ctx).await {
            Ok(()) => return Ok(()),
            Err(e) => ctx.print_error(&e.to_string()),
        }
        if !ctx.confirm("Enter a different API key?", true)? {
            ctx.print_warning("Continuing without a validated API key.");
            return Ok(());
        }
        prompt_for_key(ctx)?;
    }
}

fn prompt_for_key(ctx: &mut AppContext) -> Result<()> {
    let key = Password::with_theme(&ctx.theme())
        .with_prompt("API key (Gemini keys start with AIza, others use Perplexity)")
        .interact()?;

    let credential = Credential::new(key);
    let provider = credential.provider();
    ctx.session.save_credential(&ctx.store, credential)?;
    ctx.print_info(&format!("Saved {} key.", provider));
    Ok(())
}

async fn change_key(ctx: &mut AppContext) -> Result<()> {
    prompt_for_key(ctx)?;
    validate_credential(ctx).await
}

fn upload(ctx: &mut AppContext) -> Result<()> {
    let path: String = Input::with_theme(&ctx.theme())
        .with_prompt("Spreadsheet path (.csv or .xlsx)")
        .interact_text()?;

    let path = PathBuf::from(path.trim());
    let count = ctx.session.load_spreadsheet(&path)?;
    ctx.print_success(&format!("Loaded {} product(s).", count));
    Ok(())
}

fn choose_mode(ctx: &mut AppContext) -> Result<()> {
    let current = usize::from(ctx.session.choice().category().is_some());
    let mode = Select::with_theme(&ctx.theme())
        .with_prompt("How should attributes be extracted?")
        .items(&MODES)
        .default(current)
        .interact()?;

    if mode == 0 {
        ctx.session.use_unconstrained();
        ctx.print_success("Attributes will be extracted on the fly.");
        return Ok(());
    }

    let reuse = ctx.session.schema().is_some()
        && ctx.confirm("Keep the loaded schema file?", true)?;
    if !reuse {
        let path: String = Input::with_theme(&ctx.theme())
            .with_prompt("Schema file (.json)")
            .interact_text()?;
        let schema = ExtractionSchema::load(Path::new(path.trim()))?;
        ctx.session.set_schema(schema)?;
    }

    let categories: Vec<String> = match ctx.session.schema() {
        Some(schema) => schema.categories().map(str::to_string).collect(),
        None => return Ok(()),
    };
    let current = ctx
        .session
        .choice()
        .category()
        .and_then(|c| categories.iter().position(|k| k == c))
        .unwrap_or(0);

    let index = Select::with_theme(&ctx.theme())
        .with_prompt("Category")
        .items(&categories)
        .default(current)
        .interact()?;
    ctx.session.choose_category(&categories[index])?;

    ctx.print_success(&format!("Extraction constrained to '{}'.", categories[index]));
    Ok(())
}

fn select_products(ctx: &mut AppContext) -> Result<()> {
    if ctx.session.products().is_empty() {
        anyhow::bail!("Upload a spreadsheet first.");
    }

    let (ids, items, defaults): (Vec<ProductId>, Vec<String>, Vec<bool>) = ctx
        .session
        .products()
        .iter()
        .map(|p| {
            (
                p.id,
                format!("{}  {}  {}", p.sku, p.part_number, p.link),
                ctx.session.is_selected(p.id),
            )
        })
        .fold((Vec::new(), Vec::new(), Vec::new()), |mut acc, (id, item, on)| {
            acc.0.push(id);
            acc.1.push(item);
            acc.2.push(on);
            acc
        });

    let chosen = MultiSelect::with_theme(&ctx.theme())
        .with_prompt("Products to fetch (space toggles, enter confirms)")
        .items(&items)
        .defaults(&defaults)
        .interact()?;

    ctx.session.clear_selection();
    ctx.session.select(chosen.into_iter().map(|i| ids[i]));
    ctx.print_info(&format!("{} product(s) selected.", ctx.session.selected().len()));
    Ok(())
}

async fn fetch(ctx: &mut AppContext) -> Result<()> {
    ctx.print_info(&format!(
        "Fetching attributes for {} product(s)...",
        ctx.session.selected().len()
    ));
    let report = ctx.session.fetch().await?;
    print_products(ctx);
    print_report(ctx, &report);
    Ok(())
}

fn export(ctx: &mut AppContext) -> Result<()> {
    let path: String = Input::with_theme(&ctx.theme())
        .with_prompt("Export to")
        .default(DEFAULT_EXPORT_FILE.to_string())
        .interact_text()?;

    let path = PathBuf::from(path.trim());
    let rows = ctx.session.write_csv(&path)?;
    ctx.print_success(&format!("Exported {} row(s) to {}", rows, path.display()));
    Ok(())
}
