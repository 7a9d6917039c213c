//! Entity sets: tracked mutations and the query entry point for one table.
//!
//! A [`TableSet`] owns the change ledger for its table. Mutations stage
//! entries; [`TableSet::save_changes`] drains them into partition-scoped
//! batches of at most 100 operations, submits all batches concurrently,
//! and clears the ledger only when every batch succeeded.

use std::sync::Arc;

use futures_util::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use stratus_core::{ChangeAction, ChangeLedger, Entity, EntitySchema, QueryTranslator, TableQuery};

use crate::error::ClientError;
use crate::executor::execute_query;
use crate::protocol::{BatchOp, MAX_BATCH_OPERATIONS, RowData};
use crate::transport::TableTransport;

/// Collaborator that contributes derived fields (e.g. foreign keys carried
/// from a parent entity) to a row before it is written.
pub trait PropertyExpander: Send + Sync {
    fn expand(&self, entity: &mut Entity);
}

/// Tracked entities and queries for one table.
///
/// Not synchronized: a set belongs to one unit of work and concurrent use
/// must be serialized by the caller.
pub struct TableSet<T> {
    schema: EntitySchema,
    transport: Arc<T>,
    ledger: ChangeLedger,
    expander: Option<Arc<dyn PropertyExpander>>,
}

impl<T: TableTransport> TableSet<T> {
    pub fn new(schema: EntitySchema, transport: Arc<T>) -> Self {
        Self {
            schema,
            transport,
            ledger: ChangeLedger::new(),
            expander: None,
        }
    }

    /// Attach a complex-property expander consulted before upserts.
    pub fn with_expander(mut self, expander: Arc<dyn PropertyExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn table(&self) -> &str {
        self.schema.table()
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    /// Stage an entity for insert-or-replace.
    pub fn add(&mut self, entity: Entity) {
        self.ledger.stage(entity, ChangeAction::Insert);
    }

    pub fn add_range(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            self.add(entity);
        }
    }

    /// Stage an entity for update (submitted as insert-or-replace).
    pub fn update(&mut self, entity: Entity) {
        self.ledger.stage(entity, ChangeAction::Update);
    }

    /// Stage an entity for deletion by identity, using its stored
    /// concurrency tag.
    pub fn remove(&mut self, entity: Entity) {
        self.ledger.stage(entity, ChangeAction::Delete);
    }

    pub fn remove_range(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            self.remove(entity);
        }
    }

    /// Number of pending ledger entries.
    pub fn pending(&self) -> usize {
        self.ledger.len()
    }

    /// Compile and execute a query against this table.
    pub async fn execute(&self, query: &TableQuery) -> Result<Vec<Entity>, ClientError> {
        self.execute_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// Like [`TableSet::execute`], checking the cancellation token between
    /// segments.
    pub async fn execute_with_cancel(
        &self,
        query: &TableQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Entity>, ClientError> {
        let compiled = QueryTranslator::new(&self.schema).translate(query)?;
        execute_query(self.transport.as_ref(), self.schema.table(), &compiled, cancel).await
    }

    /// Execute the query capped at one row, returning it if present.
    pub async fn first_or_default(&self, query: TableQuery) -> Result<Option<Entity>, ClientError> {
        let rows = self.execute(&query.first_or_default()).await?;
        Ok(rows.into_iter().next())
    }

    /// Flush all pending mutations.
    ///
    /// Entries are grouped by partition key and chunked at
    /// [`MAX_BATCH_OPERATIONS`]; every chunk is one atomic network call and
    /// all chunks are submitted concurrently. On any failure the error
    /// propagates and the ledger is left intact for inspection or
    /// re-flush. An empty ledger flushes with zero network calls.
    pub async fn save_changes(&mut self) -> Result<(), ClientError> {
        if self.ledger.is_empty() {
            return Ok(());
        }

        let chunks = self.ledger.chunks(MAX_BATCH_OPERATIONS);
        let mut submissions = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let mut ops = Vec::with_capacity(chunk.len());
            for entry in chunk {
                match entry.action {
                    ChangeAction::Delete => ops.push(BatchOp::Delete {
                        partition_key: entry.entity.partition_key.clone(),
                        row_key: entry.entity.row_key.clone(),
                        etag: entry.entity.etag.clone(),
                    }),
                    ChangeAction::Insert | ChangeAction::Update => {
                        let mut entity = entry.entity.clone();
                        if let Some(expander) = &self.expander {
                            expander.expand(&mut entity);
                        }
                        ops.push(BatchOp::Upsert {
                            row: RowData::from_entity(&entity)?,
                        });
                    }
                    ChangeAction::None => {}
                }
            }
            submissions.push(self.transport.submit_batch(self.schema.table(), ops));
        }

        let batches = submissions.len();
        try_join_all(submissions).await?;
        self.ledger.clear();
        debug!(table = %self.schema.table(), batches, "pending changes flushed");
        Ok(())
    }
}
