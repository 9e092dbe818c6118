//! Records - the flat, store-side shape of a model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::RecordId;

/// Record-shaped attribute set: field name to scalar or foreign-key value.
pub type Attributes = serde_json::Map<String, Value>;

/// Field name of the technical id when used inside a [`Clause`].
pub const ID_FIELD: &str = "id";

/// Column holding a composed child's position within its parent's collection.
pub const INDEX_COLUMN: &str = "index";

/// A stored record: its store-issued id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: Attributes,
}

impl Record {
    pub fn new(id: RecordId, fields: Attributes) -> Self {
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Read a foreign-key column. Missing, `null` and non-id values yield `None`.
    pub fn foreign_key(&self, field: &str) -> Option<RecordId> {
        self.fields.get(field).and_then(Value::as_u64)
    }
}

/// One condition of a [`Clause`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `field = value`. The field `"id"` addresses the technical id.
    Eq(String, Value),
    /// Technical id is none of the listed ids.
    IdNotIn(Vec<RecordId>),
}

impl Condition {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Condition::Eq(field, value) if field == ID_FIELD => {
                value.as_u64() == Some(record.id)
            }
            Condition::Eq(field, value) => record.get(field).unwrap_or(&Value::Null) == value,
            Condition::IdNotIn(ids) => !ids.contains(&record.id),
        }
    }
}

/// Conjunction of conditions, passed to the store verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    conditions: Vec<Condition>,
}

impl Clause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    pub fn id_not_in(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.conditions
            .push(Condition::IdNotIn(ids.into_iter().collect()));
        self
    }

    /// True when every condition holds. An empty clause matches everything.
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}
