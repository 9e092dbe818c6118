//! Models - Plain Rust structs mapped to records.
//!
//! The engine only needs to read and write a model's technical id; every
//! other field is reached through the typed accessors declared on its
//! [`Mapping`](crate::Mapping).
//!
//! ## Example
//!
//! ```ignore
//! use datamapa::{Model, RecordId};
//!
//! #[derive(Default, Model)]
//! struct Person {
//!     id: Option<RecordId>,
//!     name: String,
//! }
//! ```

/// Technical id issued by the record store.
pub type RecordId = u64;

/// Trait for domain structs managed by a mapper.
pub trait Model: Send + Sync + 'static {
    /// The store-issued id, or `None` when the model has not been persisted.
    fn id(&self) -> Option<RecordId>;

    /// Record the store-issued id on the model.
    fn set_id(&mut self, id: RecordId);
}
