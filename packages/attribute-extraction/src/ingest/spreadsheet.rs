//! Header matching and row-to-product mapping.

use std::path::Path;

use tracing::{debug, info};

use super::xlsx::read_xlsx;
use crate::error::SpreadsheetError;
use crate::types::product::{Product, ProductId};

/// Headers accepted for the SKU column, in priority order.
pub const SKU_SYNONYMS: &[&str] = &[
    "sku id",
    "sku",
    "sku_id",
    "product sku",
    "item id",
    "product id",
    "identifier",
    "hgg product code (internal sku)",
    "supplier sku",
    "hginternalcode",
];

/// Headers accepted for the part number column, in priority order.
pub const PART_NUMBER_SYNONYMS: &[&str] = &[
    "part number",
    "part no",
    "part #",
    "part_number",
    "model",
    "model number",
    "mpn",
    "manufacturers part number (mpn)",
    "pt_mpn_1",
];

/// Headers accepted for the product link column, in priority order.
pub const LINK_SYNONYMS: &[&str] = &[
    "product link",
    "link",
    "url",
    "product url",
    "product_link",
    "product page",
    "website",
    "pt_data source url_1",
    "pt_data source url_2",
    "pt_third party url 1",
];

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Csv,
    Xlsx,
}

impl SpreadsheetFormat {
    pub fn from_path(path: &Path) -> Result<Self, SpreadsheetError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(SpreadsheetError::UnsupportedFormat(if ext.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", ext)
            })),
        }
    }
}

/// Read a spreadsheet file into products.
pub fn load_products(path: &Path) -> Result<Vec<Product>, SpreadsheetError> {
    let format = SpreadsheetFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let products = parse_spreadsheet(&bytes, format)?;

    info!(path = %path.display(), products = products.len(), "Spreadsheet loaded");
    Ok(products)
}

/// Parse spreadsheet bytes of a known format into products.
pub fn parse_spreadsheet(
    bytes: &[u8],
    format: SpreadsheetFormat,
) -> Result<Vec<Product>, SpreadsheetError> {
    let rows = match format {
        SpreadsheetFormat::Csv => read_csv(bytes)?,
        SpreadsheetFormat::Xlsx => read_xlsx(bytes)?,
    };
    products_from_rows(&rows)
}

/// Read CSV bytes into a grid. Ragged rows are accepted.
pub fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>, SpreadsheetError> {
    // Strip UTF-8 BOM if present
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    reader
        .records()
        .map(|record| -> Result<Vec<String>, SpreadsheetError> {
            Ok(record?.iter().map(str::to_string).collect())
        })
        .collect()
}

/// Map a grid (header row first) onto products.
///
/// Product ids are data-row positions, assigned before rows lacking a SKU or
/// link are dropped.
pub fn products_from_rows(rows: &[Vec<String>]) -> Result<Vec<Product>, SpreadsheetError> {
    if rows.len() < 2 {
        return Err(SpreadsheetError::Empty);
    }

    let headers: Vec<String> = rows[0].iter().map(|h| h.trim().to_string()).collect();

    let sku = find_header(&headers, SKU_SYNONYMS);
    let part_number = find_header(&headers, PART_NUMBER_SYNONYMS);
    let link = find_header(&headers, LINK_SYNONYMS);

    let (sku, part_number, link) = match (sku, part_number, link) {
        (Some(s), Some(p), Some(l)) => (s, p, l),
        _ => {
            let missing = [
                (sku, "SKU ID"),
                (part_number, "Part Number"),
                (link, "Product Link"),
            ]
            .into_iter()
            .filter(|(index, _)| index.is_none())
            .map(|(_, name)| name)
            .collect();

            return Err(SpreadsheetError::MissingColumns {
                missing,
                found: headers,
            });
        }
    };

    debug!(sku, part_number, link, "Matched spreadsheet columns");

    let products: Vec<Product> = rows[1..]
        .iter()
        .enumerate()
        .map(|(index, row)| {
            Product::new(
                ProductId(index),
                cell(row, sku),
                cell(row, part_number),
                cell(row, link),
            )
        })
        .filter(|p| !p.sku.is_empty() && !p.link.is_empty())
        .collect();

    if products.is_empty() {
        return Err(SpreadsheetError::NoValidRows);
    }

    Ok(products)
}

/// Index of the first synonym present among `headers`, trying synonyms in order.
fn find_header(headers: &[String], synonyms: &[&str]) -> Option<usize> {
    synonyms
        .iter()
        .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).map(|v| v.trim().to_string()).unwrap_or_default()
}
