//! End-to-end batch behavior: validate, fan out, merge, export.

use std::sync::Arc;

use attribute_extraction::testing::{MockProvider, MockProviderFactory};
use attribute_extraction::{
    Attribute, Credential, ExtractionError, HttpProviderFactory, Product, ProductId,
    ProductStatus, ProviderEndpoints, ProviderError, ProviderIdentity, Session,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn link(i: usize) -> String {
    format!("https://shop.example/p/{}", i)
}

fn products(n: usize) -> Vec<Product> {
    (0..n)
        .map(|i| Product::new(ProductId(i), format!("SKU-{}", i), format!("PN-{}", i), link(i)))
        .collect()
}

async fn mount_extraction(server: &MockServer, i: usize, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(link(i).as_str()))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn attributes_reply(attrs: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [ { "message": { "role": "assistant", "content": attrs.to_string() } } ]
    }))
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let server = MockServer::start().await;

    // Credential probe
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "max_tokens": 5 })))
        .respond_with(attributes_reply(json!("hi")))
        .expect(1)
        .mount(&server)
        .await;

    for i in 0..3 {
        mount_extraction(
            &server,
            i,
            attributes_reply(json!([{ "attribute": "Index", "value": i.to_string() }])),
        )
        .await;
    }
    mount_extraction(&server, 3, ResponseTemplate::new(500).set_body_string("upstream")).await;
    mount_extraction(&server, 4, attributes_reply(json!({ "not": "an array" }))).await;

    let factory = HttpProviderFactory::new(ProviderEndpoints::single(server.uri()));
    let mut session = Session::new(Arc::new(factory));
    session.load_products(products(6));
    session.set_credential(Credential::new("pplx-test-key"));

    let outcome = session.validate_credential().await;
    assert!(outcome.is_valid, "{:?}", outcome.error);

    session.select((0..5).map(ProductId));
    let report = session.fetch().await.unwrap();

    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 2);

    for i in 0..3 {
        let product = session.product(ProductId(i)).unwrap();
        assert_eq!(product.status(), ProductStatus::Done);
        assert_eq!(
            product.attributes().unwrap(),
            &[Attribute::new("Index", i.to_string())][..]
        );
        assert!(product.error().is_none());
    }

    let failed = session.product(ProductId(3)).unwrap();
    assert_eq!(failed.status(), ProductStatus::Error);
    assert_eq!(
        failed.error(),
        Some("Failed to fetch attributes from Perplexity: Perplexity API request failed with status 500.")
    );
    assert!(failed.attributes().is_none());

    assert_eq!(
        session.product(ProductId(4)).unwrap().error(),
        Some("Failed to fetch attributes from Perplexity: Perplexity API returned data in an unexpected format.")
    );

    // Never selected, never touched
    assert_eq!(session.product(ProductId(5)).unwrap().status(), ProductStatus::Pending);
}

#[tokio::test]
async fn test_refetch_replaces_previous_result() {
    let provider = MockProvider::new(ProviderIdentity::Gemini)
        .with_failure(
            link(0),
            ProviderError::Transport {
                provider: ProviderIdentity::Gemini,
                message: "timed out".into(),
            },
        );
    let factory = MockProviderFactory::with_provider(provider.clone());

    let mut session = Session::new(Arc::new(factory));
    session.load_products(products(1));
    session.set_credential(Credential::new("AIzaSyD-1"));
    assert!(session.validate_credential().await.is_valid);
    session.select_all();

    session.fetch().await.unwrap();
    assert_eq!(
        session.product(ProductId(0)).unwrap().status(),
        ProductStatus::Error
    );

    let provider = provider.with_attributes(link(0), vec![Attribute::new("Color", "Red")]);
    session.fetch().await.unwrap();

    let product = session.product(ProductId(0)).unwrap();
    assert_eq!(product.status(), ProductStatus::Done);
    assert!(product.error().is_none());
    assert_eq!(provider.extracted_links().len(), 2);
}

#[tokio::test]
async fn test_fetch_requires_validation_and_makes_no_calls() {
    let factory = MockProviderFactory::new();
    let mut session = Session::new(Arc::new(factory.clone()));
    session.load_products(products(2));
    session.select_all();

    let err = session.fetch().await.unwrap_err();
    assert!(matches!(err, ExtractionError::MissingCredential));
    assert_eq!(
        err.to_string(),
        "Please enter and save an API key before fetching attributes."
    );

    session.set_credential(Credential::new("pplx-1"));
    let err = session.fetch().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please validate your API key before fetching attributes."
    );

    assert!(factory.provider().calls().is_empty());
    assert!(session
        .products()
        .iter()
        .all(|p| p.status() == ProductStatus::Pending));
}

#[tokio::test]
async fn test_export_pads_rows_to_widest_result() {
    let provider = MockProvider::new(ProviderIdentity::Perplexity)
        .with_attributes(
            link(0),
            vec![Attribute::new("Color", "Red"), Attribute::new("Size", "L")],
        )
        .with_attributes(
            link(1),
            vec![
                Attribute::new("Color", "Blue"),
                Attribute::new("Size", "M"),
                Attribute::new("Material", "Wool"),
                Attribute::new("Fit", "Slim"),
            ],
        );

    let mut session = Session::new(Arc::new(MockProviderFactory::with_provider(provider)));
    session.load_products(products(3));
    session.set_credential(Credential::new("pplx-1"));
    session.validate_credential().await;
    session.select([ProductId(0), ProductId(1)]);
    session.fetch().await.unwrap();

    let csv = session.export_csv().unwrap();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(csv.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.len() == 11));
    assert_eq!(&rows[0][9], "Attribute 4");
    assert_eq!(&rows[1][3], "Color");
    assert_eq!(&rows[1][7], "");
    assert_eq!(&rows[2][9], "Fit");
    assert_eq!(&rows[3][0], "SKU-2");
    assert_eq!(&rows[3][3], "");
}
