//! The unit-of-work context: one transport, one set per registered table.

use std::collections::HashMap;
use std::sync::Arc;

use stratus_core::EntitySchema;

use crate::error::ClientError;
use crate::set::TableSet;
use crate::transport::TableTransport;

/// Owns a [`TableSet`] per registered entity schema and flushes them as
/// one logical save.
pub struct TableContext<T> {
    transport: Arc<T>,
    sets: HashMap<String, TableSet<T>>,
}

impl<T: TableTransport> TableContext<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            sets: HashMap::new(),
        }
    }

    /// Register an entity schema, creating the backing table if needed.
    /// Registering the same table twice is a no-op.
    pub async fn register(&mut self, schema: EntitySchema) -> Result<(), ClientError> {
        if self.sets.contains_key(schema.table()) {
            return Ok(());
        }
        self.transport
            .create_table_if_not_exists(schema.table())
            .await?;
        let set = TableSet::new(schema, Arc::clone(&self.transport));
        self.sets.insert(set.table().to_string(), set);
        Ok(())
    }

    /// The set for a registered table.
    pub fn set(&mut self, table: &str) -> Option<&mut TableSet<T>> {
        self.sets.get_mut(table)
    }

    pub fn get(&self, table: &str) -> Option<&TableSet<T>> {
        self.sets.get(table)
    }

    /// Total pending mutations across all sets.
    pub fn pending(&self) -> usize {
        self.sets.values().map(TableSet::pending).sum()
    }

    /// Flush every registered set's pending mutations, one set at a time.
    pub async fn save_changes(&mut self) -> Result<(), ClientError> {
        for set in self.sets.values_mut() {
            set.save_changes().await?;
        }
        Ok(())
    }
}
