//! Load paths, for stopping reads that would revisit a record forever.

use crate::error::PersistenceError;
use crate::model::RecordId;

type Key = (String, RecordId);

/// Records on the path of the load in progress.
///
/// `references` is the current run of reference hops; it restarts at every
/// collection, since collection items are loaded without collections of their
/// own and a back-reference from an item to its owner ends there. `owners`
/// is the chain of composition parents, which never restarts.
#[derive(Debug, Clone, Default)]
pub(crate) struct Trail {
    references: Vec<Key>,
    owners: Vec<Key>,
}

impl Trail {
    /// Path of a top-level load, or of an aggregate item.
    pub(crate) fn start(table: &str, id: RecordId) -> Self {
        let key = (table.to_string(), id);
        Self {
            references: vec![key.clone()],
            owners: vec![key],
        }
    }

    /// Path after following a reference to `table#id`.
    pub(crate) fn follow(&self, table: &str, id: RecordId) -> Result<Self, PersistenceError> {
        Self::check(&self.references, table, id)?;
        let mut next = self.clone();
        next.references.push((table.to_string(), id));
        Ok(next)
    }

    /// Path of a composed child `table#id` of the current record.
    pub(crate) fn descend(&self, table: &str, id: RecordId) -> Result<Self, PersistenceError> {
        Self::check(&self.owners, table, id)?;
        let key = (table.to_string(), id);
        let mut owners = self.owners.clone();
        owners.push(key.clone());
        Ok(Self {
            references: vec![key],
            owners,
        })
    }

    fn check(path: &[Key], table: &str, id: RecordId) -> Result<(), PersistenceError> {
        if path.iter().any(|(t, i)| t == table && *i == id) {
            return Err(PersistenceError::ReferenceCycle {
                table: table.to_string(),
                id,
            });
        }
        Ok(())
    }
}
