use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::client::ApiClient;
use crate::entities::{Contact, Invoice, Model, Payment, Resource, payment};
use crate::error::Result;
use crate::handle_api_response;

/// Creates and finds models of one type, so callers never name the model's constructor.
pub struct Repository<C, M> {
    api: Arc<C>,
    model: PhantomData<fn() -> M>,
}

impl<C, M> Repository<C, M>
where
    C: ApiClient,
    M: Resource,
{
    #[must_use]
    pub fn new(api: Arc<C>) -> Self {
        Self {
            api,
            model: PhantomData,
        }
    }

    #[must_use]
    pub fn api(&self) -> &C {
        &self.api
    }

    /// Builds an unsaved model from `data`. Immutable fields are dropped and nothing is sent.
    pub fn create<I, K, V>(&self, data: I) -> M
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut model = M::default();
        model.fill(data);
        model
    }

    /// Reads a model by identifier, `None` if MoneyBird does not know it.
    #[instrument(skip(self), fields(entity = M::ENTITY))]
    pub async fn find(&self, id: &str) -> Result<Option<M>> {
        handle_api_response!(M::find(self.api.as_ref(), id).await, M::ENTITY)
    }
}

impl<C: ApiClient> Repository<C, Contact> {
    /// Searches contacts by name, email and other free-text fields. Any status other than 200
    /// reads as no matches.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Contact>> {
        let result = handle_api_response!(
            self.api.get(Contact::ENDPOINT, &[("query", query)]).await,
            Contact::ENTITY
        )?;
        if !result.is(200) {
            debug!(status = result.status, "contact search returned nothing");
            return Ok(Vec::new());
        }

        Ok(result
            .into_objects()
            .into_iter()
            .map(Contact::from_api)
            .collect())
    }
}

impl<C: ApiClient> Repository<C, Payment> {
    /// Lists the payments registered on a persisted invoice.
    pub async fn for_invoice(&self, invoice: &Invoice) -> Result<Vec<Payment>> {
        handle_api_response!(
            payment::list_for_invoice(self.api.as_ref(), invoice).await,
            Payment::ENTITY
        )
    }
}

impl<C, M> Clone for Repository<C, M> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            model: PhantomData,
        }
    }
}

impl<C, M: Model> fmt::Debug for Repository<C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &M::ENTITY)
            .finish_non_exhaustive()
    }
}
