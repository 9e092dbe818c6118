//! InMemoryRecordStore - BTreeMap-backed record store for testing and development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::{RecordStore, StoreCall, StoreError};
use crate::model::RecordId;
use crate::record::{Attributes, Clause, Record};

#[derive(Default)]
struct Table {
    rows: BTreeMap<RecordId, Attributes>,
    last_id: RecordId,
}

/// In-memory record store.
///
/// Ids are issued per table starting at 1, and query results come back in id
/// order. With [`with_journal`](Self::with_journal) every adapter call is
/// appended to a journal so callers can observe exactly what a mapper asked
/// of the store. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    journal: Option<Arc<Mutex<Vec<StoreCall>>>>,
    unique: HashMap<String, Vec<Vec<String>>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a uniqueness constraint over `columns` of `table`.
    ///
    /// Rows where any of the columns is missing or null are not checked,
    /// matching SQL semantics for nullable unique indexes.
    pub fn with_unique(mut self, table: &str, columns: &[&str]) -> Self {
        self.unique
            .entry(table.to_string())
            .or_default()
            .push(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Record every adapter call from now on. The journal grows until
    /// [`clear_journal`](Self::clear_journal), so leave it off outside tests.
    pub fn with_journal(mut self) -> Self {
        self.journal.get_or_insert_with(Default::default);
        self
    }

    /// Every adapter call made so far, oldest first. Empty without a journal.
    pub fn journal(&self) -> Vec<StoreCall> {
        self.journal
            .as_ref()
            .and_then(|journal| journal.lock().ok().map(|calls| calls.clone()))
            .unwrap_or_default()
    }

    /// Only the calls that changed stored data.
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.journal()
            .into_iter()
            .filter(StoreCall::is_mutation)
            .collect()
    }

    pub fn clear_journal(&self) {
        if let Some(Ok(mut journal)) = self.journal.as_ref().map(|j| j.lock()) {
            journal.clear();
        }
    }

    /// Number of records currently stored in `table`.
    pub fn count(&self, table: &str) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(table).map_or(0, |t| t.rows.len()))
            .unwrap_or(0)
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        let Some(journal) = &self.journal else {
            return Ok(());
        };
        journal
            .lock()
            .map_err(|_| StoreError::Backend("journal lock poisoned".into()))?
            .push(call);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Table>>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Table>>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))
    }

    fn check_unique(
        &self,
        table_name: &str,
        table: &Table,
        id: Option<RecordId>,
        candidate: &Attributes,
    ) -> Result<(), StoreError> {
        let Some(constraints) = self.unique.get(table_name) else {
            return Ok(());
        };

        for columns in constraints {
            let key: Option<Vec<&Value>> = columns
                .iter()
                .map(|c| candidate.get(c).filter(|v| !v.is_null()))
                .collect();
            let Some(key) = key else {
                continue;
            };

            let clash = table.rows.iter().any(|(row_id, row)| {
                Some(*row_id) != id
                    && columns
                        .iter()
                        .zip(&key)
                        .all(|(c, v)| row.get(c) == Some(*v))
            });

            if clash {
                let qualified: Vec<String> = columns
                    .iter()
                    .map(|c| format!("{}.{}", table_name, c))
                    .collect();
                return Err(StoreError::ConstraintViolation(format!(
                    "UNIQUE constraint failed: {}",
                    qualified.join(", ")
                )));
            }
        }

        Ok(())
    }
}

fn matching(table: Option<&Table>, clause: &Clause) -> Vec<Record> {
    table
        .map(|t| {
            t.rows
                .iter()
                .map(|(id, fields)| Record::new(*id, fields.clone()))
                .filter(|record| clause.matches(record))
                .collect()
        })
        .unwrap_or_default()
}

impl RecordStore for InMemoryRecordStore {
    fn find_by_id(&self, table: &str, id: RecordId) -> Result<Record, StoreError> {
        self.record(StoreCall::FindById {
            table: table.to_string(),
            id,
        })?;
        let tables = self.read()?;

        tables
            .get(table)
            .and_then(|t| t.rows.get(&id))
            .map(|fields| Record::new(id, fields.clone()))
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                id,
            })
    }

    fn find_by_clause(&self, table: &str, clause: &Clause) -> Result<Option<Record>, StoreError> {
        self.record(StoreCall::FindByClause {
            table: table.to_string(),
            clause: clause.clone(),
        })?;
        let tables = self.read()?;

        Ok(matching(tables.get(table), clause).into_iter().next())
    }

    fn where_clause(&self, table: &str, clause: &Clause) -> Result<Vec<Record>, StoreError> {
        self.record(StoreCall::Where {
            table: table.to_string(),
            clause: clause.clone(),
        })?;
        let tables = self.read()?;

        Ok(matching(tables.get(table), clause))
    }

    fn create(&self, table: &str, attributes: Attributes) -> Result<Record, StoreError> {
        self.record(StoreCall::Create {
            table: table.to_string(),
            attributes: attributes.clone(),
        })?;
        let mut tables = self.write()?;
        let entry = tables.entry(table.to_string()).or_default();

        self.check_unique(table, entry, None, &attributes)?;

        entry.last_id += 1;
        let id = entry.last_id;
        entry.rows.insert(id, attributes.clone());

        Ok(Record::new(id, attributes))
    }

    fn update_by_id(
        &self,
        table: &str,
        id: RecordId,
        attributes: Attributes,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::Update {
            table: table.to_string(),
            id,
            attributes: attributes.clone(),
        })?;
        let mut tables = self.write()?;
        let not_found = || StoreError::NotFound {
            table: table.to_string(),
            id,
        };
        let entry = tables.get_mut(table).ok_or_else(not_found)?;

        let mut merged = entry.rows.get(&id).cloned().ok_or_else(not_found)?;
        merged.extend(attributes);
        self.check_unique(table, entry, Some(id), &merged)?;

        entry.rows.insert(id, merged);
        Ok(())
    }

    fn delete_by_id(&self, table: &str, id: RecordId) -> Result<usize, StoreError> {
        self.record(StoreCall::DeleteById {
            table: table.to_string(),
            id,
        })?;
        let mut tables = self.write()?;

        Ok(tables
            .get_mut(table)
            .and_then(|t| t.rows.remove(&id))
            .map_or(0, |_| 1))
    }

    fn delete_by_clause(&self, table: &str, clause: &Clause) -> Result<usize, StoreError> {
        self.record(StoreCall::DeleteByClause {
            table: table.to_string(),
            clause: clause.clone(),
        })?;
        let mut tables = self.write()?;
        let Some(entry) = tables.get_mut(table) else {
            return Ok(0);
        };

        let before = entry.rows.len();
        entry
            .rows
            .retain(|id, fields| !clause.matches(&Record::new(*id, fields.clone())));
        Ok(before - entry.rows.len())
    }

    fn exists_by_id(&self, table: &str, id: RecordId) -> Result<bool, StoreError> {
        self.record(StoreCall::ExistsById {
            table: table.to_string(),
            id,
        })?;
        let tables = self.read()?;

        Ok(tables.get(table).is_some_and(|t| t.rows.contains_key(&id)))
    }
}
