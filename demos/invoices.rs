//! Creates a contact and a draft invoice, registers a payment and sends the invoice.
//!
//! Needs the `MONEYBIRD_*` variables read by [`moneybird_rs::Config::from_env`].

#[macro_use]
extern crate tracing;

use anyhow::{Context, Result};
use moneybird_rs::{
    Client, CompositeEntity, Config, Detail, Model, Payment, Registry, Resource, SendSettings,
};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let client = Client::from_config(&Config::from_env()?)?;
    let registry = Registry::new(client);
    let api = registry.api().as_ref();

    let contacts = registry.get("contacts")?;
    let contacts = contacts.contacts().context("contacts repository")?;
    let mut contact = match contacts.search("Weblab").await?.into_iter().next() {
        Some(contact) => contact,
        None => {
            let mut contact = contacts.create([
                ("company_name", json!("Weblab")),
                ("city", json!("Enschede")),
                ("send_invoices_to_email", json!("info@example.com")),
            ]);
            contact.save(api).await?;
            contact
        }
    };
    info!("using contact {:?}", contact.id());

    contact.set("phone", "053 123 4567");
    contact.save(api).await?;

    let invoices = registry.get("invoices")?;
    let mut invoice = invoices.invoices().context("invoices repository")?.create([
        ("contact_id", json!(contact.id())),
        ("reference", json!("Hosting 2024")),
    ]);
    let mut detail = Detail::default();
    detail
        .set("description", "Hosting")
        .set("amount", "12")
        .set("price", "10.00");
    invoice.add_child(detail);
    invoice.save(api).await?;
    info!(
        "created invoice {:?} with {} line items",
        invoice.id(),
        invoice.children().len()
    );

    let mut settings = SendSettings::default();
    settings.set("delivery_method", "Manual");
    invoice.send(api, &settings).await?;
    info!("invoice state: {:?}", invoice.get("state"));

    let mut payment = Payment::default();
    payment
        .set("payment_date", "2024-03-01")
        .set("price", invoice.get("total_price_incl_tax").cloned().unwrap_or(json!("121.00")));
    invoice.add_payment(api, &mut payment).await?;

    let payments = registry.get("payments")?;
    let listed = payments
        .payments()
        .context("payments repository")?
        .for_invoice(&invoice)
        .await?;
    info!("invoice has {} payments", listed.len());

    Ok(())
}
