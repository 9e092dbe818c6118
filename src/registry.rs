//! MapperRegistry - the explicit set of mappings an application serves.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

use crate::error::PersistenceError;
use crate::mapping::Mapping;
use crate::model::Model;

/// Mappings keyed by model type.
///
/// Built at startup and then shared by reference; cross-references between
/// mappings are resolved through it when an operation runs.
#[derive(Default)]
pub struct MapperRegistry {
    mappings: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    names: HashMap<TypeId, String>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the mapping for `M`. Each model type may be registered once.
    pub fn register<M: Model>(&mut self, mapping: Mapping<M>) -> Result<&mut Self, PersistenceError> {
        let key = TypeId::of::<M>();
        if let Some(existing) = self.names.get(&key) {
            return Err(PersistenceError::Configuration(format!(
                "{} is already mapped by {}",
                type_name::<M>(),
                existing
            )));
        }

        tracing::debug!(
            mapper = mapping.name(),
            table = mapping.record_type(),
            "registered mapper"
        );
        self.names.insert(key, mapping.name().to_string());
        self.mappings.insert(key, Box::new(mapping));
        Ok(self)
    }

    /// Chaining form of [`register`](Self::register).
    pub fn with<M: Model>(mut self, mapping: Mapping<M>) -> Result<Self, PersistenceError> {
        self.register(mapping)?;
        Ok(self)
    }

    pub fn mapping<M: Model>(&self) -> Result<&Mapping<M>, PersistenceError> {
        self.mappings
            .get(&TypeId::of::<M>())
            .and_then(|m| m.downcast_ref::<Mapping<M>>())
            .ok_or_else(|| PersistenceError::UnregisteredMapper(type_name::<M>().to_string()))
    }

    pub fn contains<M: Model>(&self) -> bool {
        self.mappings.contains_key(&TypeId::of::<M>())
    }
}
