//! Non-interactive batch: load, validate, fetch, export

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use attribute_extraction::{ExportError, ExtractionError, ExtractionSchema, DEFAULT_EXPORT_FILE};
use clap::Args;

use super::{parse_selection, print_products, print_report, validate_credential};
use crate::context::AppContext;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Spreadsheet with SKU, part number, and product link columns (.csv or .xlsx)
    #[arg(short, long)]
    pub input: PathBuf,

    /// JSON schema file mapping categories to attribute structures
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Category to constrain extraction to (defaults to the schema's first)
    #[arg(short, long, requires = "schema")]
    pub category: Option<String>,

    /// Products to fetch, by number, e.g. `0,2-4` (defaults to all)
    #[arg(long, conflicts_with = "all")]
    pub select: Option<String>,

    /// Fetch every product
    #[arg(long)]
    pub all: bool,

    /// Where to write the CSV export
    #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
    pub output: PathBuf,

    /// API key to use instead of the configured one
    #[arg(long)]
    pub key: Option<String>,
}

pub async fn run(ctx: &mut AppContext, args: RunArgs) -> Result<()> {
    let count = ctx
        .session
        .load_spreadsheet(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    ctx.print_success(&format!("Loaded {} product(s) from {}", count, args.input.display()));

    if let Some(path) = &args.schema {
        let schema = ExtractionSchema::load(path)
            .with_context(|| format!("Failed to load schema {}", path.display()))?;
        ctx.session.set_schema(schema)?;
        if let Some(category) = &args.category {
            ctx.session.choose_category(category)?;
        }
    }
    match ctx.session.choice().category() {
        Some(category) => ctx.print_info(&format!("Schema category: {}", category)),
        None => ctx.print_info("Extracting attributes on the fly"),
    }

    if !ctx.resolve_credential(args.key.as_deref())? {
        return Err(ExtractionError::MissingCredential.into());
    }
    validate_credential(ctx).await?;

    match args.select.as_deref() {
        Some(selection) if !args.all => {
            let ids = parse_selection(selection)?;
            let unknown: Vec<String> = ids
                .iter()
                .filter(|id| ctx.session.product(**id).is_none())
                .map(ToString::to_string)
                .collect();
            if !unknown.is_empty() {
                bail!("No product numbered {}", unknown.join(", "));
            }
            ctx.session.select(ids);
        }
        _ => ctx.session.select_all(),
    }

    ctx.print_header(&format!(
        "Fetching attributes for {} product(s)",
        ctx.session.selected().len()
    ));
    let report = ctx.session.fetch().await?;
    print_products(ctx);
    print_report(ctx, &report);

    export(ctx, &args.output)
}

/// Write the CSV export. A batch where nothing succeeded is reported, not
/// treated as a failure of the command.
fn export(ctx: &AppContext, output: &Path) -> Result<()> {
    match ctx.session.write_csv(output) {
        Ok(rows) => {
            ctx.print_success(&format!("Exported {} row(s) to {}", rows, output.display()));
            Ok(())
        }
        Err(ExtractionError::Export(ExportError::NothingToExport)) => {
            ctx.print_warning(&format!(
                "No product was processed successfully; {} was not written.",
                output.display()
            ));
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to write {}", output.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use attribute_extraction::{Attribute, Outcome, Product, ProductId};
    use std::collections::HashMap;

    fn context(dir: &tempfile::TempDir) -> AppContext {
        let config = Config {
            store_path: Some(dir.path().join("store.json")),
            ..Config::default()
        };
        let mut ctx = AppContext::with_config(true, config).unwrap();
        ctx.session.load_products(vec![
            Product::new(ProductId(0), "S-0", "P-0", "https://shop.example/0"),
            Product::new(ProductId(1), "S-1", "P-1", "https://shop.example/1"),
        ]);
        ctx
    }

    #[test]
    fn test_all_failed_batch_exports_nothing_and_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        ctx.session.apply_outcomes(HashMap::from([
            (ProductId(0), Outcome::Error("Failed to fetch attributes from Gemini: timed out".into())),
            (ProductId(1), Outcome::Error("Failed to fetch attributes from Gemini: timed out".into())),
        ]));
        let output = dir.path().join("out.csv");

        export(&ctx, &output).unwrap();

        assert!(!output.exists());
    }

    #[test]
    fn test_partial_batch_is_exported() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        ctx.session.apply_outcomes(HashMap::from([
            (ProductId(0), Outcome::Done(vec![Attribute::new("Color", "Red")])),
            (ProductId(1), Outcome::Error("Failed to fetch attributes from Gemini: timed out".into())),
        ]));
        let output = dir.path().join("out.csv");

        export(&ctx, &output).unwrap();

        let csv = std::fs::read_to_string(&output).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_write_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        ctx.session.apply_outcomes(HashMap::from([(
            ProductId(0),
            Outcome::Done(vec![Attribute::new("Color", "Red")]),
        )]));

        let err = export(&ctx, &dir.path().join("missing").join("out.csv")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to write"));
    }
}
