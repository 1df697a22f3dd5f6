//! CSV export of extraction results.

use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::types::product::Product;

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "product_attributes.csv";

/// Render every product as one CSV row.
///
/// Columns are `SKU ID, Part Number, Product Link` followed by one
/// `Attribute i, Value i` pair per attribute, up to the largest attribute
/// count among `Done` products. Shorter rows are padded with empty cells.
/// Every cell is quoted and lines end with `\n`.
pub fn to_csv(products: &[Product]) -> Result<String, ExportError> {
    let width = products
        .iter()
        .filter_map(|p| p.attributes().map(<[_]>::len))
        .max()
        .ok_or(ExportError::NothingToExport)?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut header = vec![
        "SKU ID".to_string(),
        "Part Number".to_string(),
        "Product Link".to_string(),
    ];
    for i in 1..=width {
        header.push(format!("Attribute {}", i));
        header.push(format!("Value {}", i));
    }
    writer.write_record(&header)?;

    let columns = header.len();
    for product in products {
        let mut row = vec![
            product.sku.as_str(),
            product.part_number.as_str(),
            product.link.as_str(),
        ];
        for attr in product.attributes().unwrap_or_default() {
            row.push(&attr.name);
            row.push(&attr.value);
        }
        row.resize(columns, "");
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Write(e.to_string()))
}

/// Write the CSV export to `path`, returning the number of product rows.
pub fn write_csv(products: &[Product], path: &Path) -> Result<usize, ExportError> {
    let csv = to_csv(products)?;
    std::fs::write(path, csv).map_err(|e| ExportError::Write(e.to_string()))?;

    info!(path = %path.display(), rows = products.len(), "Exported CSV");
    Ok(products.len())
}
