use crate::model::RecordId;
use crate::store::StoreError;

/// Errors surfaced by mapper operations.
///
/// Adapter failures are translated at the operation boundary so callers can
/// discriminate by kind without depending on a particular store's error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// A technical-id lookup found no record.
    #[error("record not found: {table}#{id}")]
    RecordNotFound { table: String, id: RecordId },

    /// The store rejected a write because of a uniqueness or integrity constraint.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Any other store-level failure.
    #[error("persistence failure: {0}")]
    Storage(String),

    /// A semantic-key field had no value when identity resolution needed it.
    #[error("semantic key field `{field}` of {mapper} has no value")]
    IncompleteSemanticKey { mapper: String, field: String },

    /// `update` was called on a model that has never been persisted.
    #[error("{mapper} cannot update a model without an id")]
    MissingId { mapper: String },

    /// No mapping was registered for the requested model type.
    #[error("no mapper registered for {0}")]
    UnregisteredMapper(String),

    /// Loading a record led back to a record already being loaded.
    #[error("reference cycle through {table}#{id}")]
    ReferenceCycle { table: String, id: RecordId },

    /// A mapping was declared inconsistently.
    #[error("invalid mapper configuration: {0}")]
    Configuration(String),

    /// A field value could not be converted between model and record.
    #[error("cannot convert field `{field}`: {message}")]
    Conversion { field: String, message: String },
}

impl PersistenceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::RecordNotFound { .. })
    }

    pub(crate) fn conversion(field: &str, err: serde_json::Error) -> Self {
        PersistenceError::Conversion {
            field: field.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for PersistenceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, id } => PersistenceError::RecordNotFound { table, id },
            StoreError::ConstraintViolation(message) => PersistenceError::DuplicateKey(message),
            StoreError::Backend(message) => PersistenceError::Storage(message),
        }
    }
}
