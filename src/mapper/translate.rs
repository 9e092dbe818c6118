//! Attribute translation between models and records.

use serde_json::Value;

use super::trail::Trail;
use super::Mapper;
use crate::error::PersistenceError;
use crate::mapping::Include;
use crate::model::{Model, RecordId};
use crate::record::{Attributes, Clause, Record};

impl<'a, M: Model> Mapper<'a, M> {
    /// Build the record-shaped attribute set for a model.
    ///
    /// Simple fields are copied under their column names. A reference
    /// contributes `<field>_id` only when it is set: an unset reference is
    /// omitted rather than written as null, so an existing foreign key is
    /// left as it is. Collections are never part of the attribute set.
    pub fn to_attributes(&self, model: &M) -> Result<Attributes, PersistenceError> {
        let mut attributes = Attributes::new();

        for field in &self.mapping.simple {
            attributes.insert(field.column().to_string(), field.read(model)?);
        }

        for reference in &self.mapping.references {
            if let Some(id) = reference.referenced_id(model) {
                attributes.insert(reference.foreign_key().to_string(), Value::from(id));
            }
        }

        Ok(attributes)
    }

    /// Build a model from a fetched record.
    ///
    /// References are always loaded through their own mapper; a dangling
    /// foreign key surfaces as `RecordNotFound` and a chain of references
    /// leading back to a record already being loaded as `ReferenceCycle`.
    /// Collections are populated only when `include` names them and are
    /// otherwise left unset.
    pub fn load(&self, record: &Record, include: &Include) -> Result<M, PersistenceError> {
        self.load_along(record, include, &Trail::start(self.table(), record.id))
    }

    /// [`load`](Self::load) for a record reached through `trail`, which
    /// already ends at `record`.
    pub(crate) fn load_along(
        &self,
        record: &Record,
        include: &Include,
        trail: &Trail,
    ) -> Result<M, PersistenceError> {
        let mut model = self.mapping.new_model(record);
        model.set_id(record.id);

        for field in &self.mapping.simple {
            if let Some(value) = record.get(field.column()) {
                field.write(&mut model, value.clone())?;
            }
        }

        for reference in &self.mapping.references {
            if let Some(id) = reference_id(record, reference.foreign_key())? {
                reference.hydrate(self.cx, &mut model, id, trail)?;
            }
        }

        self.load_collections(&mut model, record.id, include, trail)?;
        Ok(model)
    }

    /// Load the record `id` as the target of a reference.
    pub(crate) fn follow(&self, id: RecordId, trail: &Trail) -> Result<M, PersistenceError> {
        let trail = trail.follow(self.table(), id)?;
        tracing::trace!(mapper = self.mapping.name(), table = self.table(), id, "follow");
        let record = self.cx.store.find_by_id(self.table(), id)?;
        self.load_along(&record, &Include::None, &trail)
    }

    pub(crate) fn load_where(
        &self,
        clause: &Clause,
        include: &Include,
    ) -> Result<Vec<M>, PersistenceError> {
        tracing::trace!(mapper = self.mapping.name(), table = self.table(), ?clause, "where");
        self.cx
            .store
            .where_clause(self.table(), clause)?
            .iter()
            .map(|record| self.load(record, include))
            .collect()
    }
}

/// Foreign key of a reference. Only a missing column or `null` means unset;
/// any other value that is not an id is a conversion error.
fn reference_id(record: &Record, foreign_key: &str) -> Result<Option<RecordId>, PersistenceError> {
    match record.get(foreign_key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| PersistenceError::Conversion {
                field: foreign_key.to_string(),
                message: format!("expected a record id, found {}", value),
            }),
    }
}
