use serde_json::Value;

use super::{Fields, Model, Record};

/// Key carrying the line items in API payloads.
pub const CHILDREN_KEY: &str = "details";
/// Key carrying the line items in request bodies.
pub const CHILDREN_ATTRIBUTES_KEY: &str = "details_attributes";

/// A record plus an ordered list of child models, the shape of invoices and their line items.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite<D> {
    record: Record,
    children: Vec<D>,
}

impl<D: Model> Composite<D> {
    #[must_use]
    pub fn new(mutable: &'static [&'static str]) -> Self {
        Self {
            record: Record::new(mutable),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    /// Appends a child. Children are neither validated nor deduplicated.
    pub fn add_child(&mut self, child: D) -> &mut Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(&self) -> &[D] {
        &self.children
    }

    /// Mutable access to existing children, e.g. to edit a line item before a patch.
    pub fn children_mut(&mut self) -> &mut [D] {
        &mut self.children
    }

    /// Replaces the children with those in the payload's [`CHILDREN_KEY`] list, then hydrates
    /// the record from the remaining fields.
    pub fn hydrate(&mut self, mut data: Fields) {
        self.children = match data.shift_remove(CHILDREN_KEY) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(fields) => Some(D::from_api(fields)),
                    other => {
                        warn!(?other, "skipping child that is not an object");
                        None
                    }
                })
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                warn!(?other, "ignoring {} that is not a list", CHILDREN_KEY);
                Vec::new()
            }
        };
        self.record.hydrate(data);
    }

    /// Serializes the record and appends every child with something to send under
    /// [`CHILDREN_ATTRIBUTES_KEY`].
    #[must_use]
    pub fn serialize(&self, changes_only: bool) -> Fields {
        let mut data = self.record.serialize(changes_only);
        let children: Vec<Value> = self
            .children
            .iter()
            .map(|child| child.serialize(changes_only))
            .filter(|fields| !fields.is_empty())
            .map(Value::Object)
            .collect();

        if !children.is_empty() {
            data.insert(CHILDREN_ATTRIBUTES_KEY.to_string(), Value::Array(children));
        }
        data
    }
}

/// A model built on a [`Composite`].
///
/// Implementors forward [`Model::hydrate`] and [`Model::serialize`] to the composite so line
/// items take part in both.
pub trait CompositeEntity: Model {
    type Child: Model;

    fn composite(&self) -> &Composite<Self::Child>;

    fn composite_mut(&mut self) -> &mut Composite<Self::Child>;

    fn add_child(&mut self, child: Self::Child) -> &mut Self {
        self.composite_mut().add_child(child);
        self
    }

    fn children(&self) -> &[Self::Child] {
        self.composite().children()
    }
}

/// Implements [`Model`] and [`CompositeEntity`] for a newtype around [`Composite`].
macro_rules! composite_model {
    ($model:ident, $child:ty, $entity:literal, $mutable:expr) => {
        impl Default for $model {
            fn default() -> Self {
                Self($crate::entities::Composite::new($mutable))
            }
        }

        impl $crate::entities::Model for $model {
            const ENTITY: &'static str = $entity;

            fn record(&self) -> &$crate::entities::Record {
                self.0.record()
            }

            fn record_mut(&mut self) -> &mut $crate::entities::Record {
                self.0.record_mut()
            }

            fn hydrate(&mut self, data: $crate::entities::Fields) {
                self.0.hydrate(data);
            }

            fn serialize(&self, changes_only: bool) -> $crate::entities::Fields {
                self.0.serialize(changes_only)
            }
        }

        impl $crate::entities::CompositeEntity for $model {
            type Child = $child;

            fn composite(&self) -> &$crate::entities::Composite<$child> {
                &self.0
            }

            fn composite_mut(&mut self) -> &mut $crate::entities::Composite<$child> {
                &mut self.0
            }
        }
    };
}

pub(crate) use composite_model;
