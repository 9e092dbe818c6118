//! Mappings - per-model declarations of how a struct maps to records.
//!
//! A [`Mapping`] is built once at startup through [`MappingBuilder`] and is
//! immutable afterwards. Related models are never embedded: a reference or
//! collection names the related model type, and its mapping is looked up in
//! the [`MapperRegistry`](crate::MapperRegistry) when an operation runs, so
//! mappings may refer to each other in cycles.
//!
//! ## Example
//!
//! ```ignore
//! let orders = Mapping::builder("OrderMapper", "orders", |_| Order::default())
//!     .simple("number", |o: &Order| &o.number, |o, v| o.number = v)
//!     .reference("customer", |o: &Order| o.customer.as_ref(), |o, c| o.customer = Some(c))
//!     .composed_of("lines", |o: &mut Order| o.lines.as_mut(), |o, l| o.lines = Some(l))
//!     .semantic_key(["number"])
//!     .build()?;
//! ```

mod attribute;
pub mod naming;

use std::collections::HashSet;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::PersistenceError;
use crate::model::Model;
use crate::record::Record;

pub(crate) use attribute::{
    AggregateField, CollectionAttribute, CompositionAttribute, CompositionField, Owner,
    ReferenceAttribute, ReferenceField, SimpleField,
};

/// Which collection attributes a read populates.
///
/// Collections left out stay unset on the model, which is distinct from an
/// empty collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Include {
    #[default]
    None,
    All,
    Only(Vec<String>),
}

impl Include {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Include::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn includes(&self, name: &str) -> bool {
        match self {
            Include::None => false,
            Include::All => true,
            Include::Only(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Where a semantic-key field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyPart {
    Simple(usize),
    Reference(usize),
}

type Factory<M> = Box<dyn Fn(&Record) -> M + Send + Sync>;

/// Immutable mapping between a model type and a record type.
pub struct Mapping<M: Model> {
    name: String,
    record_type: String,
    factory: Factory<M>,
    pub(crate) simple: Vec<SimpleField<M>>,
    pub(crate) references: Vec<Box<dyn ReferenceAttribute<M>>>,
    pub(crate) aggregates: Vec<Box<dyn CollectionAttribute<M>>>,
    pub(crate) compositions: Vec<Box<dyn CompositionAttribute<M>>>,
    composes: Option<String>,
    semantic_key: Vec<(String, KeyPart)>,
    reverse_key: String,
}

impl<M: Model> Mapping<M> {
    /// Start declaring a mapping.
    ///
    /// `name` is the mapper's declared name (e.g. `"PersonMapper"`); the
    /// reverse key other records use to point at this one is derived from
    /// it. `record_type` is the store table. `factory` produces a fresh,
    /// identity-less model for a fetched record.
    pub fn builder<F>(name: &str, record_type: &str, factory: F) -> MappingBuilder<M>
    where
        F: Fn(&Record) -> M + Send + Sync + 'static,
    {
        MappingBuilder {
            name: name.to_string(),
            record_type: record_type.to_string(),
            factory: Box::new(factory),
            simple: Vec::new(),
            references: Vec::new(),
            aggregates: Vec::new(),
            compositions: Vec::new(),
            composes: None,
            semantic_key: Vec::new(),
            reverse_key: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Foreign key this mapping's records carry back to their composition parent.
    pub fn composes(&self) -> Option<&str> {
        self.composes.as_deref()
    }

    pub fn semantic_key(&self) -> Vec<&str> {
        self.semantic_key.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn has_semantic_key(&self) -> bool {
        !self.semantic_key.is_empty()
    }

    /// Foreign key that aggregate collections of this mapping are looked up by.
    pub fn reverse_key(&self) -> &str {
        &self.reverse_key
    }

    pub fn has_compositions(&self) -> bool {
        !self.compositions.is_empty()
    }

    pub(crate) fn new_model(&self, record: &Record) -> M {
        (self.factory)(record)
    }

    pub(crate) fn key_parts(&self) -> &[(String, KeyPart)] {
        &self.semantic_key
    }
}

/// Builder for [`Mapping`]. Validation happens in [`build`](Self::build).
pub struct MappingBuilder<M: Model> {
    name: String,
    record_type: String,
    factory: Factory<M>,
    simple: Vec<SimpleField<M>>,
    references: Vec<Box<dyn ReferenceAttribute<M>>>,
    aggregates: Vec<Box<dyn CollectionAttribute<M>>>,
    compositions: Vec<Box<dyn CompositionAttribute<M>>>,
    composes: Option<String>,
    semantic_key: Vec<String>,
    reverse_key: Option<String>,
}

impl<M: Model> MappingBuilder<M> {
    /// A field copied verbatim. A trailing `?` in `name` is dropped for the
    /// record column.
    pub fn simple<T, G, S>(mut self, name: &str, get: G, set: S) -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
        G: Fn(&M) -> &T + Send + Sync + 'static,
        S: Fn(&mut M, T) + Send + Sync + 'static,
    {
        self.simple.push(SimpleField::new(name, get, set));
        self
    }

    /// A single related model stored as `<name>_id` and loaded eagerly.
    pub fn reference<R, G, S>(mut self, name: &str, get: G, set: S) -> Self
    where
        R: Model,
        G: Fn(&M) -> Option<&R> + Send + Sync + 'static,
        S: Fn(&mut M, R) + Send + Sync + 'static,
    {
        self.references
            .push(Box::new(ReferenceField::new(name, get, set)));
        self
    }

    /// A read-only collection loaded by this mapping's reverse key and never
    /// written back.
    pub fn aggregate<C, S>(mut self, name: &str, set: S) -> Self
    where
        C: Model,
        S: Fn(&mut M, Vec<C>) + Send + Sync + 'static,
    {
        self.aggregates
            .push(Box::new(AggregateField::<M, C>::new(name, set)));
        self
    }

    /// An owned child collection, created, updated and deleted with this
    /// model. The child's mapping must declare [`composes`](Self::composes).
    pub fn composed_of<C, G, S>(mut self, name: &str, get: G, set: S) -> Self
    where
        C: Model,
        G: Fn(&mut M) -> Option<&mut Vec<C>> + Send + Sync + 'static,
        S: Fn(&mut M, Vec<C>) + Send + Sync + 'static,
    {
        self.compositions
            .push(Box::new(CompositionField::new(name, get, set)));
        self
    }

    /// Declare this mapping as a composition child whose records point at
    /// their parent through `foreign_key`.
    pub fn composes(mut self, foreign_key: &str) -> Self {
        self.composes = Some(foreign_key.to_string());
        self
    }

    /// Natural key used to find an existing record for a model without an id.
    pub fn semantic_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.semantic_key = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Override the inferred `<entity>_id` reverse key.
    pub fn reverse_key(mut self, foreign_key: &str) -> Self {
        self.reverse_key = Some(foreign_key.to_string());
        self
    }

    pub fn build(self) -> Result<Mapping<M>, PersistenceError> {
        let mut seen = HashSet::new();
        let names = self
            .simple
            .iter()
            .map(|f| f.name())
            .chain(self.references.iter().map(|r| r.name()))
            .chain(self.aggregates.iter().map(|a| a.name()))
            .chain(self.compositions.iter().map(|c| c.name()));
        for name in names {
            if !seen.insert(name) {
                return Err(PersistenceError::Configuration(format!(
                    "{} declares `{}` more than once",
                    self.name, name
                )));
            }
        }

        let mut semantic_key = Vec::with_capacity(self.semantic_key.len());
        for field in &self.semantic_key {
            let part = if let Some(i) = self.simple.iter().position(|f| f.name() == field) {
                KeyPart::Simple(i)
            } else if let Some(i) = self.references.iter().position(|r| r.name() == field) {
                KeyPart::Reference(i)
            } else {
                return Err(PersistenceError::Configuration(format!(
                    "{} semantic key field `{}` is not a simple or reference attribute",
                    self.name, field
                )));
            };
            semantic_key.push((field.clone(), part));
        }

        let reverse_key = self
            .reverse_key
            .unwrap_or_else(|| naming::reverse_key_name(&self.name));

        Ok(Mapping {
            name: self.name,
            record_type: self.record_type,
            factory: self.factory,
            simple: self.simple,
            references: self.references,
            aggregates: self.aggregates,
            compositions: self.compositions,
            composes: self.composes,
            semantic_key,
            reverse_key,
        })
    }
}
