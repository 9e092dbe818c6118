//! Identity resolution: technical id first, then semantic key.

use super::Mapper;
use crate::error::PersistenceError;
use crate::mapping::KeyPart;
use crate::model::Model;
use crate::record::{Clause, Record};

impl<'a, M: Model> Mapper<'a, M> {
    /// Find the record backing a model.
    ///
    /// A model with an id is looked up by id and must exist. Otherwise the
    /// semantic key, if declared, is matched against the store; on a match
    /// the model's id is backfilled so later operations update instead of
    /// create. `None` means the model is new.
    pub fn identify(&self, model: &mut M) -> Result<Option<Record>, PersistenceError> {
        if let Some(id) = model.id() {
            return Ok(Some(self.cx.store.find_by_id(self.table(), id)?));
        }

        let Some(clause) = self.semantic_clause(model)? else {
            return Ok(None);
        };

        let found = self.cx.store.find_by_clause(self.table(), &clause)?;
        if let Some(record) = &found {
            tracing::trace!(
                mapper = self.mapping.name(),
                id = record.id,
                "resolved semantic key"
            );
            model.set_id(record.id);
        }
        Ok(found)
    }

    /// Whether a record backs this model. Backfills the id exactly as
    /// [`identify`](Self::identify) does.
    pub fn exists(&self, model: &mut M) -> Result<bool, PersistenceError> {
        if let Some(id) = model.id() {
            return Ok(self.cx.store.exists_by_id(self.table(), id)?);
        }
        Ok(self.identify(model)?.is_some())
    }

    /// Equality clause over the semantic key, or `None` when none is declared.
    fn semantic_clause(&self, model: &M) -> Result<Option<Clause>, PersistenceError> {
        if !self.mapping.has_semantic_key() {
            return Ok(None);
        }

        let mut clause = Clause::new();
        for (name, part) in self.mapping.key_parts() {
            let (column, value) = match *part {
                KeyPart::Simple(i) => {
                    let field = &self.mapping.simple[i];
                    (field.column(), field.read(model)?)
                }
                KeyPart::Reference(i) => {
                    let reference = &self.mapping.references[i];
                    let value = reference.referenced_id(model).map(serde_json::Value::from);
                    (reference.foreign_key(), value.unwrap_or_default())
                }
            };

            if value.is_null() {
                return Err(PersistenceError::IncompleteSemanticKey {
                    mapper: self.mapping.name().to_string(),
                    field: name.clone(),
                });
            }
            clause = clause.eq(column, value);
        }

        Ok(Some(clause))
    }
}
