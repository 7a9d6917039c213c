//! Transport boundary to the remote table service.
//!
//! Implementations provide the raw network calls; pagination, query
//! translation, and change tracking all live above this boundary. The
//! client never inspects a continuation token, only passes it back.

use std::future::Future;

use crate::error::TransportError;
use crate::protocol::{BatchOp, ContinuationToken, RowSegment, SegmentRequest};

/// A connection to a partitioned table service.
pub trait TableTransport {
    /// Fetch one segment of rows for a compiled query, resuming from a
    /// prior continuation token if given.
    fn fetch_segment(
        &self,
        table: &str,
        request: SegmentRequest,
        continuation: Option<ContinuationToken>,
    ) -> impl Future<Output = Result<RowSegment, TransportError>> + Send;

    /// Submit one batch of at most [`MAX_BATCH_OPERATIONS`] operations,
    /// all targeting the same partition, as a single atomic call.
    ///
    /// [`MAX_BATCH_OPERATIONS`]: crate::protocol::MAX_BATCH_OPERATIONS
    fn submit_batch(
        &self,
        table: &str,
        ops: Vec<BatchOp>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Create the backing table if it does not exist yet.
    fn create_table_if_not_exists(
        &self,
        table: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
