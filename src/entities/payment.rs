use super::{Invoice, Model, Record, Resource, record_model};
use crate::client::ApiClient;
use crate::endpoints::Endpoint;
use crate::error::Result;

/// A payment registered on a sales invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment(Record);

pub const MUTABLE: &[&str] = &[
    "id",
    "payment_date",
    "price",
    "price_base",
    "financial_account_id",
    "financial_mutation_id",
];

record_model!(Payment, "payment", MUTABLE);

impl Resource for Payment {
    const ENDPOINT: &'static str = "payments";
}

/// Lists the payments of a persisted invoice. Any status other than 200 reads as no payments.
#[instrument(skip(client, invoice))]
pub(crate) async fn list_for_invoice<C: ApiClient>(
    client: &C,
    invoice: &Invoice,
) -> Result<Vec<Payment>> {
    let endpoint = Endpoint::nested(Invoice::ENDPOINT, invoice.require_id()?, Payment::ENDPOINT);
    let result = client.get(&endpoint.path(), &[]).await?;
    if !result.is(200) {
        debug!(%endpoint, status = result.status, "no payments listed");
        return Ok(Vec::new());
    }

    Ok(result
        .into_objects()
        .into_iter()
        .map(Payment::from_api)
        .collect())
}
