//! Active-record models for MoneyBird resources.
//!
//! Every model embeds a [`Record`], a field bag that tracks both the live state and the last
//! payload received from the API. [`Model`] covers the field access and serialization shared by
//! all of them, [`Resource`] adds the REST operations for models with an endpoint of their own,
//! and [`CompositeEntity`] those that carry line items.

use std::fmt;

use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::endpoints::Endpoint;
use crate::error::{Error, Result};

pub use self::{
    composite::{CHILDREN_ATTRIBUTES_KEY, CHILDREN_KEY, Composite, CompositeEntity},
    contact::Contact,
    detail::Detail,
    invoice::Invoice,
    note::Note,
    payment::Payment,
    record::{Fields, IDENTIFIER, Record},
    recurring_invoice::RecurringInvoice,
    send_settings::SendSettings,
};

/// Implements [`Model`] for a newtype around [`Record`] with the given mutable fields.
macro_rules! record_model {
    ($model:ident, $entity:literal, $mutable:expr) => {
        impl Default for $model {
            fn default() -> Self {
                Self($crate::entities::Record::new($mutable))
            }
        }

        impl $crate::entities::Model for $model {
            const ENTITY: &'static str = $entity;

            fn record(&self) -> &$crate::entities::Record {
                &self.0
            }

            fn record_mut(&mut self) -> &mut $crate::entities::Record {
                &mut self.0
            }
        }
    };
}

pub(crate) use record_model;

pub mod composite;
pub mod contact;
pub mod detail;
pub mod invoice;
pub mod note;
pub mod payment;
pub mod record;
pub mod recurring_invoice;
pub mod send_settings;

/// Field access and wire serialization shared by every MoneyBird model.
pub trait Model: Default {
    /// Key wrapping the fields in request bodies, e.g. `contact`.
    const ENTITY: &'static str;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    /// Builds a model from an API payload.
    #[must_use]
    fn from_api(data: Fields) -> Self {
        let mut model = Self::default();
        model.hydrate(data);
        model
    }

    /// Returns the current value of a field. Unset and `null` fields both read as `None`.
    fn get(&self, field: &str) -> Option<&Value> {
        self.record().get(field)
    }

    /// Sets a mutable field. Writes to immutable fields are ignored.
    fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.record_mut().set(field, value);
        self
    }

    /// Replaces the current fields, keeping only the mutable ones.
    fn fill<I, K, V>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.record_mut().fill(data);
        self
    }

    /// Loads a payload from the API, making it the new baseline.
    fn hydrate(&mut self, data: Fields) {
        self.record_mut().hydrate(data);
    }

    fn serialize(&self, changes_only: bool) -> Fields {
        self.record().serialize(changes_only)
    }

    /// The request body: the serialized fields wrapped under [`Model::ENTITY`].
    fn to_wire_format(&self, changes_only: bool) -> Result<String> {
        let mut envelope = Map::new();
        envelope.insert(
            Self::ENTITY.to_string(),
            Value::Object(self.serialize(changes_only)),
        );
        Ok(serde_json::to_string(&envelope)?)
    }

    fn is_changed(&self, field: &str) -> bool {
        self.record().is_changed(field)
    }

    /// The identifier, if the model has been persisted.
    fn id(&self) -> Option<String> {
        self.record().identifier()
    }

    /// The identifier, or [`Error::MissingIdentifier`].
    fn require_id(&self) -> Result<String> {
        self.id().ok_or(Error::MissingIdentifier {
            entity: Self::ENTITY,
        })
    }
}

/// A model with its own collection endpoint.
///
/// Saving creates the resource when it has no identifier and patches the changed fields
/// otherwise. A failed save or delete leaves the model untouched.
#[allow(async_fn_in_trait)]
pub trait Resource: Model {
    /// Collection path segment, e.g. `contacts`.
    const ENDPOINT: &'static str;

    fn item_endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::item(Self::ENDPOINT, self.require_id()?))
    }

    /// Reads a resource by identifier. Any status other than 200 reads as not found.
    async fn find<C: ApiClient>(client: &C, id: impl fmt::Display) -> Result<Option<Self>> {
        let endpoint = Endpoint::item(Self::ENDPOINT, id);
        let result = client.get(&endpoint.path(), &[]).await?;
        if !result.is(200) {
            debug!(entity = Self::ENTITY, %endpoint, status = result.status, "not found");
            return Ok(None);
        }
        Ok(Some(Self::from_api(result.into_object(Self::ENTITY)?)))
    }

    /// Creates or updates the resource and hydrates from the response.
    async fn save<C: ApiClient>(&mut self, client: &C) -> Result<()> {
        let result = if let Some(id) = self.id() {
            let endpoint = Endpoint::item(Self::ENDPOINT, id);
            let body = self.to_wire_format(true)?;
            debug!(entity = Self::ENTITY, %endpoint, "updating");
            let result = client.patch(&endpoint.path(), &body).await?;
            if !result.is(200) {
                error!(entity = Self::ENTITY, status = result.status, "update rejected");
                return Err(Error::UpdateFailed {
                    entity: Self::ENTITY,
                    response: result,
                });
            }
            result
        } else {
            let body = self.to_wire_format(false)?;
            debug!(entity = Self::ENTITY, endpoint = Self::ENDPOINT, "creating");
            let result = client.post(Self::ENDPOINT, &body).await?;
            if !result.is(201) {
                error!(entity = Self::ENTITY, status = result.status, "creation rejected");
                return Err(Error::CreationFailed {
                    entity: Self::ENTITY,
                    response: result,
                });
            }
            result
        };

        self.hydrate(result.into_object(Self::ENTITY)?);
        Ok(())
    }

    /// Deletes the resource. MoneyBird answers 204 on success.
    async fn delete<C: ApiClient>(&self, client: &C) -> Result<()> {
        let endpoint = self.item_endpoint()?;
        let result = client.delete(&endpoint.path()).await?;
        if !result.is(204) {
            error!(entity = Self::ENTITY, status = result.status, "delete rejected");
            return Err(Error::DeleteFailed {
                entity: Self::ENTITY,
                response: result,
            });
        }
        debug!(entity = Self::ENTITY, %endpoint, "deleted");
        Ok(())
    }
}
