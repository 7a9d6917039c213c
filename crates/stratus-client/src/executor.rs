//! Query execution: a loop of segmented fetches following continuation
//! cursors.
//!
//! Each segment request carries the remaining row budget (row cap minus
//! rows already collected). The loop stops when the cursor is exhausted,
//! the cap is reached, or cancellation is observed between segments — a
//! segment already in flight always completes, and the first segment is
//! always issued.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use stratus_core::{Entity, TranslationResult};

use crate::error::ClientError;
use crate::protocol::{ContinuationToken, SegmentRequest};
use crate::transport::TableTransport;

/// Execute a compiled query against one table, returning typed entities
/// with all recorded post-processing applied.
pub async fn execute_query<T: TableTransport>(
    transport: &T,
    table: &str,
    compiled: &TranslationResult,
    cancel: &CancellationToken,
) -> Result<Vec<Entity>, ClientError> {
    let mut entities: Vec<Entity> = Vec::new();
    let mut continuation: Option<ContinuationToken> = None;

    loop {
        let remaining = compiled
            .top()
            .map(|cap| cap.saturating_sub(entities.len() as u64));
        let request = SegmentRequest {
            filter: compiled.filter().map(str::to_string),
            select: compiled.select().to_vec(),
            top: remaining,
        };

        let segment = transport
            .fetch_segment(table, request, continuation.take())
            .await?;
        debug!(
            table,
            rows = segment.rows.len(),
            more = segment.continuation.is_some(),
            "segment fetched"
        );

        for row in segment.rows {
            entities.push(row.into_entity()?);
        }
        continuation = segment.continuation;

        let cap_reached = compiled
            .top()
            .is_some_and(|cap| entities.len() as u64 >= cap);
        if continuation.is_none() || cap_reached || cancel.is_cancelled() {
            break;
        }
    }

    // Segments may over-deliver relative to the requested budget.
    if let Some(cap) = compiled.top() {
        entities.truncate(cap as usize);
    }

    compiled.apply_post(&mut entities);
    Ok(entities)
}
