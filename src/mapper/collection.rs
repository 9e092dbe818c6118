//! Collection loading for aggregate and composed attributes.

use serde_json::Value;

use super::{Context, Mapper, Trail};
use crate::error::PersistenceError;
use crate::mapping::{AggregateField, CollectionAttribute, Include, Owner};
use crate::model::{Model, RecordId};
use crate::record::{Clause, INDEX_COLUMN};

impl<'a, M: Model> Mapper<'a, M> {
    pub(crate) fn load_collections(
        &self,
        model: &mut M,
        id: RecordId,
        include: &Include,
        trail: &Trail,
    ) -> Result<(), PersistenceError> {
        let owner = Owner {
            key: self.mapping.reverse_key(),
            id,
        };

        for aggregate in &self.mapping.aggregates {
            if include.includes(aggregate.name()) {
                aggregate.load(self.cx, model, owner)?;
            }
        }

        for composition in &self.mapping.compositions {
            if include.includes(composition.name()) {
                composition.load(self.cx, model, id, trail)?;
            }
        }

        Ok(())
    }

    /// Children owned by `parent_id`, ordered by their position index.
    pub(crate) fn load_children(
        &self,
        parent_id: RecordId,
        trail: &Trail,
    ) -> Result<Vec<M>, PersistenceError> {
        let foreign_key = self.parent_key()?;
        let mut records = self
            .cx
            .store
            .where_clause(self.table(), &Clause::new().eq(foreign_key, parent_id))?;
        records.sort_by_key(|r| r.get(INDEX_COLUMN).and_then(Value::as_u64));

        records
            .iter()
            .map(|record| {
                let trail = trail.descend(self.table(), record.id)?;
                self.load_along(record, &Include::All, &trail)
            })
            .collect()
    }
}

impl<M: Model, C: Model> CollectionAttribute<M> for AggregateField<M, C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(
        &self,
        cx: Context<'_>,
        model: &mut M,
        owner: Owner<'_>,
    ) -> Result<(), PersistenceError> {
        let items = cx
            .mapper::<C>()?
            .load_where(&Clause::new().eq(owner.key, owner.id), &Include::None)?;
        (self.set)(model, items);
        Ok(())
    }
}
