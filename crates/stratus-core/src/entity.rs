//! Entities: rows of a partitioned table with an open property bag.

use serde_json::{Map, Value};
use time::OffsetDateTime;

/// The two-part identity of an entity: (partition key, row key).
///
/// Used to key the change ledger so that re-staging an entity replaces its
/// pending action regardless of other property mutations.
pub type EntityKey = (String, String);

/// A row in a partitioned table.
///
/// `timestamp` and `etag` are assigned by the remote service on write; a
/// freshly constructed entity carries neither. The etag is an opaque
/// concurrency tag replayed on delete for optimistic concurrency.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub partition_key: String,
    pub row_key: String,
    pub timestamp: Option<OffsetDateTime>,
    pub etag: Option<String>,
    pub properties: Map<String, Value>,
}

impl Entity {
    /// Create an entity with the given identity and no properties.
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            timestamp: None,
            etag: None,
            properties: Map::new(),
        }
    }

    /// The entity's identity as an owned key.
    pub fn key(&self) -> EntityKey {
        (self.partition_key.clone(), self.row_key.clone())
    }

    /// Read a property by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Set a property, replacing any existing value.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Builder-style property assignment.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }
}
