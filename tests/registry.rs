mod test_utils;

use std::sync::Arc;

use moneybird_rs::registry::AVAILABLE_REPOSITORIES;
use moneybird_rs::{Error, Registry};
use test_utils::MockClient;

#[test]
fn returns_the_same_instance_per_name() {
    let registry = Registry::new(MockClient::new());

    let first = registry.get("invoices").unwrap();
    let second = registry.get("invoices").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.invoices().is_some());
    assert!(first.contacts().is_none());
}

#[test]
fn every_available_name_resolves() {
    let registry = Registry::new(MockClient::new());

    for name in AVAILABLE_REPOSITORIES {
        assert_eq!(registry.get(name).unwrap().name(), *name);
    }
    assert!(registry.get("contacts").unwrap().contacts().is_some());
    assert!(registry.get("payments").unwrap().payments().is_some());
}

#[test]
fn unknown_names_are_rejected() {
    let registry = Registry::new(MockClient::new());

    let err = registry.get("bogus").unwrap_err();

    assert!(matches!(&err, Error::UnknownRepository(name) if name == "bogus"));
    assert_eq!(err.to_string(), "unknown repository: bogus");
    assert!(registry.get("Invoices").is_err());
}

#[test]
fn repositories_share_the_registry_client() {
    let client = Arc::new(MockClient::new());
    let registry = Registry::from_shared(Arc::clone(&client));

    let contacts = registry.get("contacts").unwrap();
    let repository = contacts.contacts().unwrap();

    assert!(std::ptr::eq(repository.api(), client.as_ref()));
}
