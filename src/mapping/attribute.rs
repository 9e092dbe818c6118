//! Typed field accessors, resolved once when a mapping is declared.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::naming::{column_name, foreign_key_name};
use crate::error::PersistenceError;
use crate::mapper::{Context, Trail};
use crate::model::{Model, RecordId};

/// A field copied verbatim between model and record.
pub(crate) struct SimpleField<M> {
    name: String,
    column: String,
    read: Box<dyn Fn(&M) -> Result<Value, serde_json::Error> + Send + Sync>,
    write: Box<dyn Fn(&mut M, Value) -> Result<(), serde_json::Error> + Send + Sync>,
}

impl<M: Model> SimpleField<M> {
    pub(crate) fn new<T, G, S>(name: &str, get: G, set: S) -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
        G: Fn(&M) -> &T + Send + Sync + 'static,
        S: Fn(&mut M, T) + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            column: column_name(name).to_string(),
            read: Box::new(move |model: &M| serde_json::to_value(get(model))),
            write: Box::new(move |model: &mut M, value: Value| {
                set(model, serde_json::from_value(value)?);
                Ok(())
            }),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn column(&self) -> &str {
        &self.column
    }

    pub(crate) fn read(&self, model: &M) -> Result<Value, PersistenceError> {
        (self.read)(model).map_err(|e| PersistenceError::conversion(&self.name, e))
    }

    pub(crate) fn write(&self, model: &mut M, value: Value) -> Result<(), PersistenceError> {
        (self.write)(model, value).map_err(|e| PersistenceError::conversion(&self.name, e))
    }
}

/// A single related model stored as a `<field>_id` foreign key.
pub(crate) trait ReferenceAttribute<M>: Send + Sync {
    fn name(&self) -> &str;

    fn foreign_key(&self) -> &str;

    /// Id of the referenced model, `None` when the reference is unset or unsaved.
    fn referenced_id(&self, model: &M) -> Option<RecordId>;

    /// Load the referenced model through its own mapper and assign it.
    fn hydrate(
        &self,
        cx: Context<'_>,
        model: &mut M,
        id: RecordId,
        trail: &Trail,
    ) -> Result<(), PersistenceError>;
}

pub(crate) struct ReferenceField<M, R> {
    name: String,
    foreign_key: String,
    get: Box<dyn Fn(&M) -> Option<&R> + Send + Sync>,
    set: Box<dyn Fn(&mut M, R) + Send + Sync>,
}

impl<M: Model, R: Model> ReferenceField<M, R> {
    pub(crate) fn new<G, S>(name: &str, get: G, set: S) -> Self
    where
        G: Fn(&M) -> Option<&R> + Send + Sync + 'static,
        S: Fn(&mut M, R) + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            foreign_key: foreign_key_name(name),
            get: Box::new(get),
            set: Box::new(set),
        }
    }
}

impl<M: Model, R: Model> ReferenceAttribute<M> for ReferenceField<M, R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    fn referenced_id(&self, model: &M) -> Option<RecordId> {
        (self.get)(model).and_then(|target| target.id())
    }

    fn hydrate(
        &self,
        cx: Context<'_>,
        model: &mut M,
        id: RecordId,
        trail: &Trail,
    ) -> Result<(), PersistenceError> {
        let target = cx.mapper::<R>()?.follow(id, trail)?;
        (self.set)(model, target);
        Ok(())
    }
}

/// The mapper-side link a collection is loaded through.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Owner<'k> {
    /// Reverse foreign key inferred for the owning mapper.
    pub(crate) key: &'k str,
    pub(crate) id: RecordId,
}

/// A read-only collection populated through a reverse foreign key.
pub(crate) trait CollectionAttribute<M>: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self, cx: Context<'_>, model: &mut M, owner: Owner<'_>)
        -> Result<(), PersistenceError>;
}

pub(crate) struct AggregateField<M, C> {
    pub(crate) name: String,
    pub(crate) set: Box<dyn Fn(&mut M, Vec<C>) + Send + Sync>,
}

impl<M: Model, C: Model> AggregateField<M, C> {
    pub(crate) fn new<S>(name: &str, set: S) -> Self
    where
        S: Fn(&mut M, Vec<C>) + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            set: Box::new(set),
        }
    }
}

/// An owned child collection, written back with full cascade.
pub(crate) trait CompositionAttribute<M>: Send + Sync {
    fn name(&self) -> &str;

    fn load(
        &self,
        cx: Context<'_>,
        model: &mut M,
        parent_id: RecordId,
        trail: &Trail,
    ) -> Result<(), PersistenceError>;

    fn create_children(
        &self,
        cx: Context<'_>,
        model: &mut M,
        parent_id: RecordId,
    ) -> Result<(), PersistenceError>;

    fn update_children(
        &self,
        cx: Context<'_>,
        model: &mut M,
        parent_id: RecordId,
    ) -> Result<(), PersistenceError>;

    fn delete_children(&self, cx: Context<'_>, parent_id: RecordId)
        -> Result<usize, PersistenceError>;
}

pub(crate) struct CompositionField<M, C> {
    pub(crate) name: String,
    pub(crate) get: Box<dyn Fn(&mut M) -> Option<&mut Vec<C>> + Send + Sync>,
    pub(crate) set: Box<dyn Fn(&mut M, Vec<C>) + Send + Sync>,
}

impl<M: Model, C: Model> CompositionField<M, C> {
    pub(crate) fn new<G, S>(name: &str, get: G, set: S) -> Self
    where
        G: Fn(&mut M) -> Option<&mut Vec<C>> + Send + Sync + 'static,
        S: Fn(&mut M, Vec<C>) + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            get: Box::new(get),
            set: Box::new(set),
        }
    }
}
