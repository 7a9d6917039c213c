//! The change ledger: pending entity mutations awaiting commit.
//!
//! One entry per entity identity; staging the same identity again replaces
//! the pending action (last write wins). Keys are ordered, which keeps each
//! partition's entries contiguous — the backing service enforces
//! partition-scoped atomicity, so a batch must never span partitions.

use std::collections::BTreeMap;

use crate::entity::{Entity, EntityKey};

/// The pending action recorded for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    None,
    Insert,
    Update,
    Delete,
}

/// One ledger entry: the staged entity and its pending action.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub entity: Entity,
    pub action: ChangeAction,
}

/// Identity-keyed record of pending mutations for one unit of work.
///
/// Not synchronized: concurrent staging must be serialized by the caller.
#[derive(Debug, Default)]
pub struct ChangeLedger {
    entries: BTreeMap<EntityKey, LedgerEntry>,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action for an entity, replacing any pending action for
    /// the same identity.
    pub fn stage(&mut self, entity: Entity, action: ChangeAction) {
        self.entries.insert(entity.key(), LedgerEntry { entity, action });
    }

    pub fn get(&self, key: &EntityKey) -> Option<&LedgerEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Chunk pending entries for submission: entries are grouped by
    /// partition key and each chunk holds at most `max_ops` operations.
    /// `ChangeAction::None` entries are skipped; no empty chunk is
    /// produced.
    pub fn chunks(&self, max_ops: usize) -> Vec<Vec<&LedgerEntry>> {
        let mut chunks: Vec<Vec<&LedgerEntry>> = Vec::new();
        let mut current: Vec<&LedgerEntry> = Vec::new();
        let mut current_partition: Option<&str> = None;

        for entry in self.entries.values() {
            if entry.action == ChangeAction::None {
                continue;
            }
            let partition = entry.entity.partition_key.as_str();
            let boundary = current_partition != Some(partition) || current.len() == max_ops;
            if boundary && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current_partition = Some(partition);
            current.push(entry);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}
