//! Composition cascade: owned children follow their parent's writes.
//!
//! - parent created: every child is created with the parent's id and its
//!   position.
//! - parent updated: children no longer in the collection are deleted first,
//!   then each remaining child is updated (has an id) or created (has none),
//!   in collection order.
//! - parent deleted: children are deleted before the parent record.
//!
//! An unset collection (`None`) is skipped entirely; an empty one removes
//! every existing child.

use serde_json::Value;

use super::{Context, Mapper, Trail};
use crate::error::PersistenceError;
use crate::mapping::{CompositionAttribute, CompositionField};
use crate::model::{Model, RecordId};
use crate::record::{Attributes, Clause, INDEX_COLUMN};

/// Values a composed child is written with besides its own fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeContext {
    /// Foreign-key column pointing at the parent (the child mapping's `composes`).
    pub foreign_key: String,
    pub parent_id: RecordId,
    /// Zero-based position in the parent's collection at save time.
    pub index: usize,
}

impl CascadeContext {
    pub fn new(foreign_key: impl Into<String>, parent_id: RecordId, index: usize) -> Self {
        Self {
            foreign_key: foreign_key.into(),
            parent_id,
            index,
        }
    }

    /// Write the parent link and position into an attribute set. These
    /// values replace anything the translator produced under the same names.
    pub(crate) fn apply(&self, attributes: &mut Attributes) {
        attributes.insert(self.foreign_key.clone(), Value::from(self.parent_id));
        attributes.insert(INDEX_COLUMN.to_string(), Value::from(self.index));
    }
}

impl<'a, M: Model> Mapper<'a, M> {
    /// Foreign key this mapping's records carry to their composition parent.
    pub(crate) fn parent_key(&self) -> Result<&'a str, PersistenceError> {
        self.mapping.composes().ok_or_else(|| {
            PersistenceError::Configuration(format!(
                "{} is used as a composition but declares no `composes` key",
                self.mapping.name()
            ))
        })
    }

    /// Delete every record matching the clause.
    ///
    /// Leaf mappings issue one bulk delete. Mappings that own compositions
    /// delete record by record so their own children go first.
    pub(crate) fn delete_matching(&self, clause: &Clause) -> Result<usize, PersistenceError> {
        if !self.mapping.has_compositions() {
            let removed = self.cx.store.delete_by_clause(self.table(), clause)?;
            tracing::debug!(
                mapper = self.mapping.name(),
                table = self.table(),
                ?clause,
                removed,
                "deleted children"
            );
            return Ok(removed);
        }

        let mut removed = 0;
        for record in self.cx.store.where_clause(self.table(), clause)? {
            if self.delete(record.id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl<M: Model, C: Model> CompositionAttribute<M> for CompositionField<M, C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(
        &self,
        cx: Context<'_>,
        model: &mut M,
        parent_id: RecordId,
        trail: &Trail,
    ) -> Result<(), PersistenceError> {
        let children = cx.mapper::<C>()?.load_children(parent_id, trail)?;
        (self.set)(model, children);
        Ok(())
    }

    fn create_children(
        &self,
        cx: Context<'_>,
        model: &mut M,
        parent_id: RecordId,
    ) -> Result<(), PersistenceError> {
        let Some(children) = (self.get)(model) else {
            return Ok(());
        };
        let mapper = cx.mapper::<C>()?;
        let foreign_key = mapper.parent_key()?;

        for (index, child) in children.iter_mut().enumerate() {
            mapper.create_within(child, &CascadeContext::new(foreign_key, parent_id, index))?;
        }
        Ok(())
    }

    fn update_children(
        &self,
        cx: Context<'_>,
        model: &mut M,
        parent_id: RecordId,
    ) -> Result<(), PersistenceError> {
        let Some(children) = (self.get)(model) else {
            return Ok(());
        };
        let mapper = cx.mapper::<C>()?;
        let foreign_key = mapper.parent_key()?;

        // Orphans must be gone before any child is written at its new index.
        let kept: Vec<RecordId> = children.iter().filter_map(|child| child.id()).collect();
        mapper.delete_matching(
            &Clause::new()
                .eq(foreign_key, parent_id)
                .id_not_in(kept),
        )?;

        for (index, child) in children.iter_mut().enumerate() {
            let context = CascadeContext::new(foreign_key, parent_id, index);
            match child.id() {
                None => mapper.create_within(child, &context)?,
                Some(_) => mapper.update_within(child, &context)?,
            }
        }
        Ok(())
    }

    fn delete_children(
        &self,
        cx: Context<'_>,
        parent_id: RecordId,
    ) -> Result<usize, PersistenceError> {
        let mapper = cx.mapper::<C>()?;
        let foreign_key = mapper.parent_key()?;
        mapper.delete_matching(&Clause::new().eq(foreign_key, parent_id))
    }
}
