//! Declarative data mapping for Plain Old Rust Structs.
//!
//! Domain structs stay free of persistence concerns. Each model type gets a
//! [`Mapping`] declaring which fields are copied to its record, which are
//! references to other models, which are read-only aggregate collections and
//! which are owned child collections. A [`Mapper`] then finds, saves and
//! deletes whole graphs of records through any [`RecordStore`].

// Lets `#[derive(Model)]` expand to `datamapa::Model` inside this crate too.
extern crate self as datamapa;

mod error;
mod mapper;
mod mapping;
mod model;
mod record;
mod registry;
mod store;

pub use error::PersistenceError;
pub use mapper::{CascadeContext, Mapper, MappersExt};
pub use mapping::naming;
pub use mapping::{Include, Mapping, MappingBuilder};
pub use model::{Model, RecordId};
pub use record::{Attributes, Clause, Condition, Record, ID_FIELD, INDEX_COLUMN};
pub use registry::MapperRegistry;
pub use store::{InMemoryRecordStore, RecordStore, StoreCall, StoreError};

// Re-export the derive macro
pub use datamapa_macros::Model;
