//! Products and their extraction lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::attribute::Attribute;

/// Process-local product ordinal: the zero-based data-row index in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub usize);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    Pending,
    Processing,
    Done,
    Error,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Done => "Done",
            Self::Error => "Error",
        };
        f.write_str(s)
    }
}

/// Lifecycle state. Attributes exist only in `Done`, the message only in `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductState {
    Pending,
    Processing,
    Done(Vec<Attribute>),
    Error(String),
}

/// One spreadsheet row to enrich.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub part_number: String,
    pub link: String,
    state: ProductState,
}

impl Product {
    /// New pending product.
    pub fn new(
        id: ProductId,
        sku: impl Into<String>,
        part_number: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            id,
            sku: sku.into(),
            part_number: part_number.into(),
            link: link.into(),
            state: ProductState::Pending,
        }
    }

    pub fn status(&self) -> ProductStatus {
        match self.state {
            ProductState::Pending => ProductStatus::Pending,
            ProductState::Processing => ProductStatus::Processing,
            ProductState::Done(_) => ProductStatus::Done,
            ProductState::Error(_) => ProductStatus::Error,
        }
    }

    pub fn state(&self) -> &ProductState {
        &self.state
    }

    /// Extracted attributes; `Some` only when `Done`.
    pub fn attributes(&self) -> Option<&[Attribute]> {
        match &self.state {
            ProductState::Done(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Failure message; `Some` only when `Error`.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ProductState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Enter `Processing`, dropping any previous result.
    pub(crate) fn mark_processing(&mut self) {
        self.state = ProductState::Processing;
    }

    pub(crate) fn complete(&mut self, attributes: Vec<Attribute>) {
        self.state = ProductState::Done(attributes);
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.state = ProductState::Error(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product::new(ProductId(0), "SKU-1", "PN-1", "https://example.com/1")
    }

    #[test]
    fn test_new_product_is_pending_without_result() {
        let p = product();
        assert_eq!(p.status(), ProductStatus::Pending);
        assert!(p.attributes().is_none());
        assert!(p.error().is_none());
    }

    #[test]
    fn test_done_clears_error() {
        let mut p = product();
        p.fail("boom");
        p.mark_processing();
        assert!(p.error().is_none());

        p.complete(vec![Attribute::new("Color", "Red")]);
        assert_eq!(p.status(), ProductStatus::Done);
        assert_eq!(p.attributes().unwrap().len(), 1);
        assert!(p.error().is_none());
    }

    #[test]
    fn test_error_clears_attributes() {
        let mut p = product();
        p.complete(vec![Attribute::new("Color", "Red")]);
        p.fail("Network error");

        assert_eq!(p.status(), ProductStatus::Error);
        assert_eq!(p.error(), Some("Network error"));
        assert!(p.attributes().is_none());
    }
}
