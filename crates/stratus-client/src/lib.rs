//! # Stratus Client
//!
//! The asynchronous half of Stratus: executes compiled queries as
//! segmented fetches against a [`TableTransport`], and flushes tracked
//! entity mutations in partition-scoped batches.
//!
//! Query translation and the change ledger live in `stratus-core`; this
//! crate drives them over the wire. The transport itself is a trait — an
//! SDK-backed implementation, a local server, or an in-memory double all
//! plug in the same way.
//!
//! [`TableTransport`]: transport::TableTransport

pub mod context;
pub mod error;
pub mod executor;
pub mod protocol;
pub mod set;
pub mod transport;

pub use context::TableContext;
pub use error::{ClientError, TransportError};
pub use executor::execute_query;
pub use protocol::{
    BatchOp, ContinuationToken, MAX_BATCH_OPERATIONS, RowData, RowSegment, SegmentRequest,
};
pub use set::{PropertyExpander, TableSet};
pub use transport::TableTransport;
