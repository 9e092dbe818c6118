//! RecordStore - the relational store adapter the mappers persist through.
//!
//! The store is addressed per record type (table). It owns id issuance,
//! constraint checking and any transaction semantics; the mappers only
//! compose these primitives.

mod in_memory;

use serde::{Deserialize, Serialize};

use crate::model::RecordId;
use crate::record::{Attributes, Clause, Record};

pub use in_memory::InMemoryRecordStore;

/// Signals raised by a record store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no {table} record with id {id}")]
    NotFound { table: String, id: RecordId },

    #[error("{0}")]
    ConstraintViolation(String),

    #[error("{0}")]
    Backend(String),
}

/// Abstract record storage, one table per record type.
pub trait RecordStore: Send + Sync {
    /// Fetch a record by technical id. Fails with `NotFound` on a miss.
    fn find_by_id(&self, table: &str, id: RecordId) -> Result<Record, StoreError>;

    /// First record matching the clause, if any.
    fn find_by_clause(&self, table: &str, clause: &Clause) -> Result<Option<Record>, StoreError>;

    /// All records matching the clause, in store order.
    fn where_clause(&self, table: &str, clause: &Clause) -> Result<Vec<Record>, StoreError>;

    /// Insert a record and return it with its newly issued id.
    fn create(&self, table: &str, attributes: Attributes) -> Result<Record, StoreError>;

    /// Merge attributes into an existing record. Fields not named are untouched.
    fn update_by_id(
        &self,
        table: &str,
        id: RecordId,
        attributes: Attributes,
    ) -> Result<(), StoreError>;

    /// Delete a record by id. Returns the number of records removed.
    fn delete_by_id(&self, table: &str, id: RecordId) -> Result<usize, StoreError>;

    /// Delete every record matching the clause. Returns the number removed.
    fn delete_by_clause(&self, table: &str, clause: &Clause) -> Result<usize, StoreError>;

    fn exists_by_id(&self, table: &str, id: RecordId) -> Result<bool, StoreError>;
}

/// One adapter call, as recorded by [`InMemoryRecordStore::journal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreCall {
    FindById { table: String, id: RecordId },
    FindByClause { table: String, clause: Clause },
    Where { table: String, clause: Clause },
    Create { table: String, attributes: Attributes },
    Update { table: String, id: RecordId, attributes: Attributes },
    DeleteById { table: String, id: RecordId },
    DeleteByClause { table: String, clause: Clause },
    ExistsById { table: String, id: RecordId },
}

impl StoreCall {
    pub fn table(&self) -> &str {
        match self {
            StoreCall::FindById { table, .. }
            | StoreCall::FindByClause { table, .. }
            | StoreCall::Where { table, .. }
            | StoreCall::Create { table, .. }
            | StoreCall::Update { table, .. }
            | StoreCall::DeleteById { table, .. }
            | StoreCall::DeleteByClause { table, .. }
            | StoreCall::ExistsById { table, .. } => table,
        }
    }

    /// True for calls that change stored data.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StoreCall::Create { .. }
                | StoreCall::Update { .. }
                | StoreCall::DeleteById { .. }
                | StoreCall::DeleteByClause { .. }
        )
    }
}
