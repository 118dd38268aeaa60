use super::composite::composite_model;
use super::{
    Composite, Detail, Model, Note, Payment, Resource, SendSettings, note, payment, send_settings,
};
use crate::client::ApiClient;
use crate::endpoints::Endpoint;
use crate::error::{Error, Result};

/// A sales invoice with its line items.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice(Composite<Detail>);

pub const MUTABLE: &[&str] = &[
    "contact_id",
    "original_estimate_id",
    "document_style_id",
    "workflow_id",
    "reference",
    "invoice_sequence_id",
    "remove_invoice_sequence_id",
    "invoice_date",
    "first_due_interval",
    "currency",
    "prices_are_incl_tax",
    "payment_conditions",
    "discount",
];

composite_model!(Invoice, Detail, "sales_invoice", MUTABLE);

impl Resource for Invoice {
    const ENDPOINT: &'static str = "sales_invoices";
}

impl Invoice {
    /// Edits line items in place. Adding new ones goes through
    /// [`CompositeEntity::add_child`](super::CompositeEntity::add_child).
    pub fn details_mut(&mut self) -> &mut [Detail] {
        self.0.children_mut()
    }

    /// Registers a payment on this invoice and hydrates `payment` from the response.
    #[instrument(skip_all)]
    pub async fn add_payment<C: ApiClient>(&self, client: &C, payment: &mut Payment) -> Result<()> {
        let endpoint = Endpoint::nested(Self::ENDPOINT, self.require_id()?, Payment::ENDPOINT);
        let result = client
            .post(&endpoint.path(), &payment.to_wire_format(false)?)
            .await?;
        if !result.is(201) {
            error!(%endpoint, status = result.status, "payment rejected");
            return Err(Error::CreationFailed {
                entity: Payment::ENTITY,
                response: result,
            });
        }

        payment.hydrate(result.into_object(Payment::ENTITY)?);
        Ok(())
    }

    /// Deletes every payment registered on this invoice.
    #[instrument(skip_all)]
    pub async fn delete_payments<C: ApiClient>(&self, client: &C) -> Result<()> {
        let id = self.require_id()?;
        for listed in payment::list_for_invoice(client, self).await? {
            let Some(payment_id) = listed.id() else {
                warn!("skipping listed payment without identifier");
                continue;
            };

            let endpoint = Endpoint::nested_item(Self::ENDPOINT, &id, Payment::ENDPOINT, payment_id);
            let result = client.delete(&endpoint.path()).await?;
            if !result.is(204) {
                error!(%endpoint, status = result.status, "payment delete rejected");
                return Err(Error::DeleteFailed {
                    entity: Payment::ENTITY,
                    response: result,
                });
            }
            debug!(%endpoint, "payment deleted");
        }
        Ok(())
    }

    /// Sends the invoice with the given delivery settings and hydrates from the updated invoice.
    #[instrument(skip_all)]
    pub async fn send<C: ApiClient>(&mut self, client: &C, settings: &SendSettings) -> Result<()> {
        let endpoint = Endpoint::nested(Self::ENDPOINT, self.require_id()?, send_settings::ENDPOINT);
        let result = client
            .patch(&endpoint.path(), &settings.to_wire_format(false)?)
            .await?;
        if !result.is(200) {
            error!(%endpoint, status = result.status, "sending rejected");
            return Err(Error::UpdateFailed {
                entity: SendSettings::ENTITY,
                response: result,
            });
        }

        self.hydrate(result.into_object(Self::ENTITY)?);
        Ok(())
    }

    /// Attaches a note to this invoice and hydrates `note` from the response.
    #[instrument(skip_all)]
    pub async fn add_note<C: ApiClient>(&self, client: &C, note: &mut Note) -> Result<()> {
        let endpoint = Endpoint::nested(Self::ENDPOINT, self.require_id()?, note::ENDPOINT);
        let result = client
            .post(&endpoint.path(), &note.to_wire_format(false)?)
            .await?;
        if !result.is(201) {
            error!(%endpoint, status = result.status, "note rejected");
            return Err(Error::CreationFailed {
                entity: Note::ENTITY,
                response: result,
            });
        }

        note.hydrate(result.into_object(Note::ENTITY)?);
        Ok(())
    }
}
