//! Sample domain shared by the integration suites.
#![allow(dead_code)]

pub mod orders;
pub mod people;

use datamapa::{InMemoryRecordStore, MapperRegistry, PersistenceError, Record};
use serde_json::Value;

pub use orders::{Discount, LineItem, Note, Order};
pub use people::{Company, Person};

/// Registry with every sample mapping.
pub fn registry() -> MapperRegistry {
    try_registry().expect("sample mappings are valid")
}

fn try_registry() -> Result<MapperRegistry, PersistenceError> {
    MapperRegistry::new()
        .with(people::company_mapping()?)?
        .with(people::person_mapping()?)?
        .with(orders::order_mapping()?)?
        .with(orders::line_item_mapping()?)?
        .with(orders::discount_mapping()?)?
        .with(orders::note_mapping()?)
}

/// Journaling store plus the sample registry.
pub fn setup() -> (InMemoryRecordStore, MapperRegistry) {
    (InMemoryRecordStore::new().with_journal(), registry())
}

/// Integer column of a record, for asserting on stored positions and keys.
pub fn column_u64(record: &Record, column: &str) -> Option<u64> {
    record.get(column).and_then(Value::as_u64)
}
