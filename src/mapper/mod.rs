//! Mapper - typed persistence operations for one model type.
//!
//! ## Example
//!
//! ```ignore
//! use datamapa::{InMemoryRecordStore, MappersExt};
//!
//! let store = InMemoryRecordStore::new();
//! let orders = store.mapper::<Order>(&registry)?;
//!
//! orders.save(&mut order)?;          // creates order and its line items
//! let loaded = orders.find(order.id.unwrap())?;
//! orders.delete(loaded.id.unwrap())?; // line items first, then the order
//! ```
//!
//! Every operation is a sequential composition of store calls. Nothing is
//! cached between calls and nothing is rolled back: if a cascade fails
//! halfway, the writes already issued stay applied unless the store itself
//! runs inside a transaction supplied by the caller.

mod cascade;
mod collection;
mod identity;
mod trail;
mod translate;

use crate::error::PersistenceError;
use crate::mapping::{Include, Mapping};
use crate::model::{Model, RecordId};
use crate::record::Clause;
use crate::registry::MapperRegistry;
use crate::store::RecordStore;

pub use cascade::CascadeContext;
pub(crate) use trail::Trail;

/// Store and registry an operation runs against.
#[derive(Clone, Copy)]
pub(crate) struct Context<'a> {
    store: &'a dyn RecordStore,
    registry: &'a MapperRegistry,
}

impl<'a> Context<'a> {
    pub(crate) fn mapper<M: Model>(self) -> Result<Mapper<'a, M>, PersistenceError> {
        Ok(Mapper {
            cx: self,
            mapping: self.registry.mapping::<M>()?,
        })
    }
}

/// Typed handle for persisting models of type `M`.
pub struct Mapper<'a, M: Model> {
    cx: Context<'a>,
    mapping: &'a Mapping<M>,
}

impl<'a, M: Model> Clone for Mapper<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M: Model> Copy for Mapper<'a, M> {}

impl<'a, M: Model> Mapper<'a, M> {
    pub fn new(
        store: &'a dyn RecordStore,
        registry: &'a MapperRegistry,
    ) -> Result<Self, PersistenceError> {
        Context { store, registry }.mapper()
    }

    pub fn mapping(&self) -> &'a Mapping<M> {
        self.mapping
    }

    fn table(&self) -> &'a str {
        self.mapping.record_type()
    }

    /// Load a fully hydrated model by technical id.
    pub fn find(&self, id: RecordId) -> Result<M, PersistenceError> {
        self.find_with(id, &Include::All)
    }

    /// Load a model by technical id, populating only the included collections.
    pub fn find_with(&self, id: RecordId, include: &Include) -> Result<M, PersistenceError> {
        tracing::trace!(mapper = self.mapping.name(), table = self.table(), id, "find");
        let record = self.cx.store.find_by_id(self.table(), id)?;
        self.load(&record, include)
    }

    /// Fully hydrated models for every record matching the clause, in store order.
    pub fn find_where(&self, clause: &Clause) -> Result<Vec<M>, PersistenceError> {
        self.load_where(clause, &Include::All)
    }

    /// Persist a model: update when it has (or resolves to) an id, create otherwise.
    pub fn save(&self, model: &mut M) -> Result<(), PersistenceError> {
        self.save_inner(model, None)
    }

    /// [`save`](Self::save) as a composition child.
    pub fn save_within(
        &self,
        model: &mut M,
        context: &CascadeContext,
    ) -> Result<(), PersistenceError> {
        self.save_inner(model, Some(context))
    }

    fn save_inner(
        &self,
        model: &mut M,
        context: Option<&CascadeContext>,
    ) -> Result<(), PersistenceError> {
        if model.id().is_none() && self.mapping.has_semantic_key() {
            self.identify(model)?;
        }

        match model.id() {
            None => self.create_inner(model, context),
            Some(_) => self.update_inner(model, context),
        }
    }

    /// Insert the model, set its id, then create its owned children.
    pub fn create(&self, model: &mut M) -> Result<(), PersistenceError> {
        self.create_inner(model, None)
    }

    /// [`create`](Self::create) as a composition child.
    pub fn create_within(
        &self,
        model: &mut M,
        context: &CascadeContext,
    ) -> Result<(), PersistenceError> {
        self.create_inner(model, Some(context))
    }

    fn create_inner(
        &self,
        model: &mut M,
        context: Option<&CascadeContext>,
    ) -> Result<(), PersistenceError> {
        let mut attributes = self.to_attributes(model)?;
        if let Some(context) = context {
            context.apply(&mut attributes);
        }

        let record = self.cx.store.create(self.table(), attributes)?;
        model.set_id(record.id);
        tracing::debug!(
            mapper = self.mapping.name(),
            table = self.table(),
            id = record.id,
            "created record"
        );

        for composition in &self.mapping.compositions {
            composition.create_children(self.cx, model, record.id)?;
        }
        Ok(())
    }

    /// Update the model's record by id, then reconcile its owned children.
    pub fn update(&self, model: &mut M) -> Result<(), PersistenceError> {
        self.update_inner(model, None)
    }

    /// [`update`](Self::update) as a composition child.
    pub fn update_within(
        &self,
        model: &mut M,
        context: &CascadeContext,
    ) -> Result<(), PersistenceError> {
        self.update_inner(model, Some(context))
    }

    fn update_inner(
        &self,
        model: &mut M,
        context: Option<&CascadeContext>,
    ) -> Result<(), PersistenceError> {
        let id = model.id().ok_or_else(|| PersistenceError::MissingId {
            mapper: self.mapping.name().to_string(),
        })?;

        let mut attributes = self.to_attributes(model)?;
        if let Some(context) = context {
            context.apply(&mut attributes);
        }

        self.cx.store.update_by_id(self.table(), id, attributes)?;
        tracing::debug!(
            mapper = self.mapping.name(),
            table = self.table(),
            id,
            "updated record"
        );

        for composition in &self.mapping.compositions {
            composition.update_children(self.cx, model, id)?;
        }
        Ok(())
    }

    /// Delete a record and, first, every child it owns.
    ///
    /// Returns whether the record itself existed.
    pub fn delete(&self, id: RecordId) -> Result<bool, PersistenceError> {
        for composition in &self.mapping.compositions {
            composition.delete_children(self.cx, id)?;
        }

        let removed = self.cx.store.delete_by_id(self.table(), id)?;
        tracing::debug!(
            mapper = self.mapping.name(),
            table = self.table(),
            id,
            removed,
            "deleted record"
        );
        Ok(removed > 0)
    }
}

/// Extension trait for typed mapper access on any RecordStore.
pub trait MappersExt: RecordStore + Sized {
    /// Get a typed mapper for `M` backed by this store.
    fn mapper<'a, M: Model>(
        &'a self,
        registry: &'a MapperRegistry,
    ) -> Result<Mapper<'a, M>, PersistenceError> {
        Mapper::new(self, registry)
    }
}

impl<S: RecordStore> MappersExt for S {}
