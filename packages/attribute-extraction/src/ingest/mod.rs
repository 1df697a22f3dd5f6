//! Spreadsheet ingest.
//!
//! Both input formats are reduced to a grid of string rows; the first row is
//! the header. [`spreadsheet::products_from_rows`] maps that grid onto
//! products.

pub mod spreadsheet;
pub mod xlsx;

pub use spreadsheet::{load_products, parse_spreadsheet, products_from_rows, SpreadsheetFormat};
