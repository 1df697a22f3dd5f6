//! Session state for the upload, choose, fetch, and export flow.
//!
//! A [`Session`] owns everything the flow needs: the loaded products, the
//! selection, the credential and whether it was validated, and the schema
//! choice. It is mutated only through `&mut self`, between awaits.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::{ExtractionError, Result};
use crate::export;
use crate::ingest::spreadsheet;
use crate::pipeline::{fetch_all, validate, BatchReport, Outcome, ValidationOutcome};
use crate::providers::ProviderFactory;
use crate::security::Credential;
use crate::stores::{self, KeyValueStore};
use crate::types::{
    product::{Product, ProductId},
    provider::ProviderIdentity,
    schema::{ExtractionSchema, SchemaChoice},
};

/// State of one extraction session.
pub struct Session {
    factory: Arc<dyn ProviderFactory>,
    products: Vec<Product>,
    selected: BTreeSet<ProductId>,
    credential: Option<Credential>,
    validated: bool,
    schema: Option<ExtractionSchema>,
    choice: SchemaChoice,
}

impl Session {
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            factory,
            products: Vec::new(),
            selected: BTreeSet::new(),
            credential: None,
            validated: false,
            schema: None,
            choice: SchemaChoice::Unconstrained,
        }
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Replace the product list. Clears the selection.
    pub fn load_products(&mut self, products: Vec<Product>) {
        self.products = products;
        self.selected.clear();
    }

    /// Load products from a `.csv` or `.xlsx` file.
    ///
    /// On failure the session is left exactly as it was.
    pub fn load_spreadsheet(&mut self, path: &Path) -> Result<usize> {
        let products = spreadsheet::load_products(path)?;
        let count = products.len();
        self.load_products(products);
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selected(&self) -> &BTreeSet<ProductId> {
        &self.selected
    }

    pub fn is_selected(&self, id: ProductId) -> bool {
        self.selected.contains(&id)
    }

    /// Flip selection of one product. Returns the new state; unknown ids stay
    /// unselected.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        if self.selected.remove(&id) {
            return false;
        }
        if self.product(id).is_none() {
            return false;
        }
        self.selected.insert(id)
    }

    /// Replace the selection with the known ids among `ids`.
    pub fn select(&mut self, ids: impl IntoIterator<Item = ProductId>) {
        let known: Vec<ProductId> = ids
            .into_iter()
            .filter(|id| self.product(*id).is_some())
            .collect();
        self.selected = known.into_iter().collect();
    }

    pub fn select_all(&mut self) {
        self.selected = self.products.iter().map(|p| p.id).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // ------------------------------------------------------------------
    // Credential
    // ------------------------------------------------------------------

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Use a credential for this session. Any earlier validation is void.
    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
        self.validated = false;
    }

    /// Load the persisted credential, if any. Validation is still required.
    pub fn restore_credential(&mut self, store: &dyn KeyValueStore) -> Result<bool> {
        match stores::load_credential(store)? {
            Some(credential) => {
                self.set_credential(credential);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persist a credential and make it the session's credential.
    pub fn save_credential(
        &mut self,
        store: &dyn KeyValueStore,
        credential: Credential,
    ) -> Result<()> {
        stores::save_credential(store, &credential)?;
        self.set_credential(credential);
        Ok(())
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Provider the current credential routes to.
    pub fn provider(&self) -> Option<ProviderIdentity> {
        self.credential
            .as_ref()
            .filter(|c| !c.is_empty())
            .map(Credential::provider)
    }

    /// Check the current credential against its provider and remember the
    /// result.
    pub async fn validate_credential(&mut self) -> ValidationOutcome {
        let credential = self.credential.clone().unwrap_or_else(|| Credential::new(""));
        let outcome = validate(&credential, self.factory.as_ref()).await;
        self.validated = outcome.is_valid;
        outcome
    }

    // ------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------

    pub fn schema(&self) -> Option<&ExtractionSchema> {
        self.schema.as_ref()
    }

    pub fn choice(&self) -> &SchemaChoice {
        &self.choice
    }

    /// Install a schema and select its first category.
    pub fn set_schema(&mut self, schema: ExtractionSchema) -> Result<()> {
        let choice = schema.choose(schema.default_category())?;
        self.schema = Some(schema);
        self.choice = choice;
        Ok(())
    }

    /// Constrain extraction to one category of the installed schema.
    pub fn choose_category(&mut self, category: &str) -> Result<()> {
        let schema = self.schema.as_ref().ok_or_else(|| {
            crate::error::SchemaError::UnknownCategory(category.to_string())
        })?;
        self.choice = schema.choose(category)?;
        Ok(())
    }

    /// Go back to "on the fly" extraction. The schema stays installed.
    pub fn use_unconstrained(&mut self) {
        self.choice = SchemaChoice::Unconstrained;
    }

    // ------------------------------------------------------------------
    // Fetch
    // ------------------------------------------------------------------

    /// Check fetch preconditions and mark the selection `Processing`.
    ///
    /// Nothing changes when a precondition fails.
    pub fn begin_batch(&mut self) -> Result<Vec<ProductId>> {
        match &self.credential {
            Some(c) if !c.is_empty() => {}
            _ => return Err(ExtractionError::MissingCredential),
        }
        if !self.validated {
            return Err(ExtractionError::CredentialNotValidated);
        }
        if self.selected.is_empty() {
            return Err(ExtractionError::NothingSelected);
        }

        for product in &mut self.products {
            if self.selected.contains(&product.id) {
                product.mark_processing();
            }
        }

        Ok(self.selected.iter().copied().collect())
    }

    /// Merge settled outcomes into the products they belong to.
    pub fn apply_outcomes(&mut self, outcomes: HashMap<ProductId, Outcome>) -> BatchReport {
        let report = BatchReport::from_outcomes(&outcomes);

        for product in &mut self.products {
            match outcomes.get(&product.id) {
                Some(Outcome::Done(attributes)) => product.complete(attributes.clone()),
                Some(Outcome::Error(message)) => product.fail(message.clone()),
                None => {}
            }
        }

        report
    }

    /// Extract attributes for every selected product.
    ///
    /// Per-product failures end up in those products' state; only unmet
    /// preconditions are returned as errors.
    pub async fn fetch(&mut self) -> Result<BatchReport> {
        let ids = self.begin_batch()?;

        // begin_batch guarantees a credential
        let credential = self
            .credential
            .clone()
            .ok_or(ExtractionError::MissingCredential)?;
        let provider = self.factory.provider_for(&credential);

        let outcomes = fetch_all(&ids, &self.products, provider.as_ref(), &self.choice).await;
        let report = self.apply_outcomes(outcomes);

        info!(
            provider = %provider.identity(),
            succeeded = report.succeeded,
            failed = report.failed,
            "Fetch finished"
        );
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    pub fn export_csv(&self) -> Result<String> {
        Ok(export::to_csv(&self.products)?)
    }

    pub fn write_csv(&self, path: &Path) -> Result<usize> {
        Ok(export::write_csv(&self.products, path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{FailingStore, MockProviderFactory};
    use crate::types::{attribute::Attribute, product::ProductStatus};

    fn session() -> (Session, MockProviderFactory) {
        let factory = MockProviderFactory::new();
        let mut session = Session::new(Arc::new(factory.clone()));
        session.load_products(
            (0..3)
                .map(|i| {
                    Product::new(
                        ProductId(i),
                        format!("SKU-{}", i),
                        "",
                        format!("https://shop.example/{}", i),
                    )
                })
                .collect(),
        );
        (session, factory)
    }

    #[test]
    fn test_toggle_and_select_all() {
        let (mut s, _) = session();

        assert!(s.toggle(ProductId(1)));
        assert!(s.is_selected(ProductId(1)));
        assert!(!s.toggle(ProductId(1)));
        assert!(!s.toggle(ProductId(99)));
        assert!(s.selected().is_empty());

        s.select_all();
        assert_eq!(s.selected().len(), 3);
        s.clear_selection();
        assert!(s.selected().is_empty());
    }

    #[test]
    fn test_begin_batch_checks_preconditions_in_order() {
        let (mut s, _) = session();
        s.select_all();

        assert!(matches!(s.begin_batch(), Err(ExtractionError::MissingCredential)));

        s.set_credential(Credential::new("   "));
        assert!(matches!(s.begin_batch(), Err(ExtractionError::MissingCredential)));

        s.set_credential(Credential::new("pplx-1"));
        assert!(matches!(s.begin_batch(), Err(ExtractionError::CredentialNotValidated)));

        assert!(s
            .products()
            .iter()
            .all(|p| p.status() == ProductStatus::Pending));
    }

    #[tokio::test]
    async fn test_nothing_selected() {
        let (mut s, factory) = session();
        s.set_credential(Credential::new("pplx-1"));
        assert!(s.validate_credential().await.is_valid);

        let err = s.fetch().await.unwrap_err();
        assert_eq!(err.to_string(), "Select at least one product to fetch.");
        assert!(factory.provider().extracted_links().is_empty());
    }

    #[tokio::test]
    async fn test_new_credential_voids_validation() {
        let (mut s, _) = session();
        let store = MemoryStore::new();

        s.save_credential(&store, Credential::new("AIzaSyD-1")).unwrap();
        assert!(s.validate_credential().await.is_valid);
        assert!(s.is_validated());
        assert_eq!(s.provider(), Some(ProviderIdentity::Gemini));

        s.save_credential(&store, Credential::new("pplx-2")).unwrap();
        assert!(!s.is_validated());
        assert_eq!(s.provider(), Some(ProviderIdentity::Perplexity));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_validated_credential() {
        let (mut s, _) = session();
        s.set_credential(Credential::new("AIzaSyD-1"));
        assert!(s.validate_credential().await.is_valid);

        let err = s
            .save_credential(&FailingStore, Credential::new("pplx-2"))
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Store(_)));
        assert!(s.is_validated());
        assert_eq!(s.credential().unwrap().expose(), "AIzaSyD-1");
        assert!(!s.restore_credential(&FailingStore).unwrap());
    }

    #[test]
    fn test_begin_batch_marks_only_selected() {
        let (mut s, _) = session();
        s.set_credential(Credential::new("pplx-1"));
        s.validated = true;
        s.select([ProductId(0), ProductId(2)]);

        let ids = s.begin_batch().unwrap();
        assert_eq!(ids, vec![ProductId(0), ProductId(2)]);

        let statuses: Vec<ProductStatus> = s.products().iter().map(|p| p.status()).collect();
        assert_eq!(
            statuses,
            vec![ProductStatus::Processing, ProductStatus::Pending, ProductStatus::Processing]
        );
    }

    #[test]
    fn test_apply_outcomes_leaves_others_untouched() {
        let (mut s, _) = session();
        let report = s.apply_outcomes(HashMap::from([
            (ProductId(0), Outcome::Done(vec![Attribute::new("Color", "Red")])),
            (ProductId(2), Outcome::Error("boom".into())),
        ]));

        assert_eq!(report, BatchReport { succeeded: 1, failed: 1 });
        assert_eq!(s.product(ProductId(0)).unwrap().status(), ProductStatus::Done);
        assert_eq!(s.product(ProductId(1)).unwrap().status(), ProductStatus::Pending);
        assert_eq!(s.product(ProductId(2)).unwrap().error(), Some("boom"));
    }

    #[test]
    fn test_choose_category() {
        let (mut s, _) = session();
        assert!(s.choose_category("Laptops").is_err());

        s.set_schema(ExtractionSchema::parse(r#"{"Chairs": {"Material": ""}, "Laptops": {"CPU": ""}}"#).unwrap())
            .unwrap();
        assert_eq!(s.choice().category(), Some("Chairs"));

        s.choose_category("Laptops").unwrap();
        assert_eq!(s.choice().category(), Some("Laptops"));

        let err = s.choose_category("Tablets").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema Error: Category 'Tablets' is not defined in the schema."
        );
        assert_eq!(s.choice().category(), Some("Laptops"));

        s.use_unconstrained();
        assert_eq!(s.choice(), &SchemaChoice::Unconstrained);
    }
}
