//! Fan-out extraction over a batch of products.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::providers::ExtractionProvider;
use crate::types::{
    attribute::Attribute,
    product::{Product, ProductId},
    schema::SchemaChoice,
};

/// Message for a selected id with no matching product.
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Settled result of one product's extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done(Vec<Attribute>),
    Error(String),
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Per-batch tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: &HashMap<ProductId, Outcome>) -> Self {
        let succeeded = outcomes.values().filter(|o| o.is_done()).count();
        Self {
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Extract attributes for every selected product concurrently.
///
/// All calls start together and the function returns only once every call has
/// settled; one failure never cancels the others. Each selected id gets
/// exactly one outcome.
pub async fn fetch_all(
    selected: &[ProductId],
    products: &[Product],
    provider: &dyn ExtractionProvider,
    choice: &SchemaChoice,
) -> HashMap<ProductId, Outcome> {
    let identity = provider.identity();
    let mut outcomes = HashMap::with_capacity(selected.len());
    let mut targets = Vec::with_capacity(selected.len());

    for id in selected {
        match products.iter().find(|p| p.id == *id) {
            Some(product) => targets.push(product),
            None => {
                outcomes.insert(*id, Outcome::Error(PRODUCT_NOT_FOUND.to_string()));
            }
        }
    }

    info!(
        provider = %identity,
        products = targets.len(),
        category = choice.category().unwrap_or("on the fly"),
        "Fetching attributes"
    );

    let futures = targets.iter().map(|product| async move {
        debug!(id = %product.id, link = %product.link, "Extracting");
        (product.id, provider.extract(&product.link, choice).await)
    });

    for (id, result) in join_all(futures).await {
        let outcome = match result {
            Ok(attributes) => Outcome::Done(attributes),
            Err(e) => {
                warn!(id = %id, error = %e, "Extraction failed");
                Outcome::Error(e.to_string())
            }
        };
        outcomes.insert(id, outcome);
    }

    let report = BatchReport::from_outcomes(&outcomes);
    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "Batch complete"
    );

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::testing::MockProvider;
    use crate::types::provider::ProviderIdentity;

    fn products() -> Vec<Product> {
        (0..3)
            .map(|i| {
                Product::new(
                    ProductId(i),
                    format!("SKU-{}", i),
                    format!("PN-{}", i),
                    format!("https://shop.example/{}", i),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_each_selected_id_gets_one_outcome() {
        let provider = MockProvider::new(ProviderIdentity::Perplexity)
            .with_attributes("https://shop.example/0", vec![Attribute::new("Color", "Red")])
            .with_failure(
                "https://shop.example/2",
                ProviderError::Transport {
                    provider: ProviderIdentity::Perplexity,
                    message: "connection reset".into(),
                },
            );

        let selected = [ProductId(0), ProductId(2)];
        let outcomes = fetch_all(&selected, &products(), &provider, &SchemaChoice::Unconstrained).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[&ProductId(0)],
            Outcome::Done(vec![Attribute::new("Color", "Red")])
        );
        assert_eq!(
            outcomes[&ProductId(2)],
            Outcome::Error("Failed to fetch attributes from Perplexity: connection reset".into())
        );
        assert!(!outcomes.contains_key(&ProductId(1)));

        let mut links = provider.extracted_links();
        links.sort();
        assert_eq!(links, vec!["https://shop.example/0", "https://shop.example/2"]);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found_without_a_call() {
        let provider = MockProvider::new(ProviderIdentity::Gemini);
        let outcomes = fetch_all(
            &[ProductId(42)],
            &products(),
            &provider,
            &SchemaChoice::Unconstrained,
        )
        .await;

        assert_eq!(outcomes[&ProductId(42)], Outcome::Error("Product not found".into()));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_batch_report() {
        let outcomes = HashMap::from([
            (ProductId(0), Outcome::Done(vec![])),
            (ProductId(1), Outcome::Error("x".into())),
            (ProductId(2), Outcome::Error("y".into())),
        ]);
        let report = BatchReport::from_outcomes(&outcomes);
        assert_eq!(report, BatchReport { succeeded: 1, failed: 2 });
        assert_eq!(report.total(), 3);
    }
}
