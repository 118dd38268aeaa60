mod test_utils;

use std::sync::Arc;

use miette::Result;
use moneybird_rs::{Contact, Invoice, Model, Payment, Repository};
use serde_json::json;
use test_utils::{MockClient, fields};

#[test]
fn create_fills_without_network() {
    let client = Arc::new(MockClient::new());
    let contacts: Repository<MockClient, Contact> = Repository::new(Arc::clone(&client));

    let contact = contacts.create([
        ("company_name", json!("Weblab")),
        ("id", json!("1")),
    ]);

    assert_eq!(contact.get("company_name"), Some(&json!("Weblab")));
    assert!(contact.id().is_none());
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn find_returns_hydrated_model() -> Result<()> {
    test_utils::do_setup();
    let client = Arc::new(MockClient::new());
    client.respond(200, json!({"id": "6", "reference": "2024-001"}));
    let invoices: Repository<MockClient, Invoice> = Repository::new(Arc::clone(&client));

    let invoice = invoices.find("6").await?.expect("invoice should be found");

    assert_eq!(invoice.get("reference"), Some(&json!("2024-001")));
    assert_eq!(client.last_request().unwrap().path, "sales_invoices/6");
    Ok(())
}

#[tokio::test]
async fn find_returns_none_when_missing() -> Result<()> {
    test_utils::do_setup();
    let client = Arc::new(MockClient::new());
    let invoices: Repository<MockClient, Invoice> = Repository::new(client);

    assert!(invoices.find("404").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn find_propagates_transport_errors() {
    test_utils::do_setup();
    let client = Arc::new(MockClient::new());
    client.rate_limited();
    let contacts: Repository<MockClient, Contact> = Repository::new(client);

    assert!(contacts.find("1").await.unwrap_err().is_rate_limited());
}

#[tokio::test]
async fn search_passes_query() -> Result<()> {
    test_utils::do_setup();
    let client = Arc::new(MockClient::new());
    client.respond(
        200,
        json!([
            {"id": "1", "company_name": "Weblab"},
            {"id": "2", "company_name": "Weblab Hosting"}
        ]),
    );
    let contacts: Repository<MockClient, Contact> = Repository::new(Arc::clone(&client));

    let found = contacts.search("Weblab").await?;

    assert_eq!(found.len(), 2);
    assert_eq!(found[1].get("company_name"), Some(&json!("Weblab Hosting")));
    let request = client.last_request().unwrap();
    assert_eq!(request.path, "contacts");
    assert_eq!(request.query, [("query".to_string(), "Weblab".to_string())]);
    Ok(())
}

#[tokio::test]
async fn search_reads_failure_as_no_matches() -> Result<()> {
    test_utils::do_setup();
    let client = Arc::new(MockClient::new());
    client.respond(500, json!("internal server error"));
    let contacts: Repository<MockClient, Contact> = Repository::new(client);

    assert!(contacts.search("Weblab").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn payments_for_invoice() -> Result<()> {
    test_utils::do_setup();
    let client = Arc::new(MockClient::new());
    client.respond(200, json!([{"id": "77", "price": "20.0"}]));
    let payments: Repository<MockClient, Payment> = Repository::new(Arc::clone(&client));
    let invoice = Invoice::from_api(fields(json!({"id": "6"})));

    let listed = payments.for_invoice(&invoice).await?;

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id().as_deref(), Some("77"));
    assert_eq!(client.last_request().unwrap().path, "sales_invoices/6/payments");

    client.respond(404, json!({"error": "not found"}));
    assert!(payments.for_invoice(&invoice).await?.is_empty());
    Ok(())
}
