//! Command implementations

pub mod key;
pub mod run;
pub mod wizard;

use anyhow::{anyhow, bail, Result};
use attribute_extraction::{BatchReport, ProductId, ProductState};
use console::style;

use crate::context::AppContext;

/// Parse a selection such as `0,2-4` into product ids.
///
/// Ranges are inclusive. Duplicates are kept once, in first-seen order.
pub fn parse_selection(text: &str) -> Result<Vec<ProductId>> {
    let mut ids: Vec<ProductId> = Vec::new();

    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let range = match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_index(start, token)?;
                let end = parse_index(end, token)?;
                if start > end {
                    bail!("Invalid range '{}': start is after end", token);
                }
                start..=end
            }
            None => {
                let index = parse_index(token, token)?;
                index..=index
            }
        };

        for id in range.map(ProductId) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    if ids.is_empty() {
        bail!("Selection is empty");
    }
    Ok(ids)
}

fn parse_index(text: &str, token: &str) -> Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| anyhow!("Invalid product number '{}' in '{}'", text.trim(), token))
}

/// Validate the session's credential and report the outcome.
pub async fn validate_credential(ctx: &mut AppContext) -> Result<()> {
    let outcome = ctx.session.validate_credential().await;

    if outcome.is_valid {
        let provider = outcome
            .provider
            .map(|p| p.to_string())
            .unwrap_or_default();
        ctx.print_success(&format!("{} API key is valid.", provider));
        return Ok(());
    }

    let message = outcome
        .error
        .unwrap_or_else(|| "API key validation failed.".to_string());
    bail!(message)
}

/// Print every loaded product with its status and result.
pub fn print_products(ctx: &AppContext) {
    if ctx.quiet {
        return;
    }

    for product in ctx.session.products() {
        let marker = if ctx.session.is_selected(product.id) {
            style("*").cyan()
        } else {
            style(" ")
        };
        let status = match product.state() {
            ProductState::Done(_) => style(product.status().to_string()).green(),
            ProductState::Error(_) => style(product.status().to_string()).red(),
            ProductState::Processing => style(product.status().to_string()).yellow(),
            ProductState::Pending => style(product.status().to_string()).dim(),
        };

        println!(
            "{} {:>4}  {:<10}  {}  {}  {}",
            marker,
            product.id,
            status,
            style(&product.sku).bold(),
            product.part_number,
            style(&product.link).dim()
        );

        match product.state() {
            ProductState::Done(attributes) if attributes.is_empty() => {
                println!("        {}", style("(no attributes found)").dim());
            }
            ProductState::Done(attributes) => {
                for attribute in attributes {
                    println!("        {}: {}", attribute.name, attribute.value);
                }
            }
            ProductState::Error(message) => {
                println!("        {}", style(message).red());
            }
            _ => {}
        }
    }
}

/// One-line batch summary.
pub fn print_report(ctx: &AppContext, report: &BatchReport) {
    let summary = format!(
        "Fetched {} product(s): {} succeeded, {} failed",
        report.total(),
        report.succeeded,
        report.failed
    );
    if report.failed == 0 {
        ctx.print_success(&summary);
    } else {
        ctx.print_warning(&summary);
    }
}
