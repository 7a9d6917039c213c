//! Wire protocol for the table service: segmented reads and batched writes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use stratus_core::Entity;

use crate::error::ClientError;

/// Service limit: maximum operations in one batch submission.
pub const MAX_BATCH_OPERATIONS: usize = 100;

/// One segmented fetch request: the compiled filter, the wire columns to
/// select (empty = all), and the remaining row budget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u64>,
}

/// Opaque continuation cursor returned by a segmented fetch. Absence
/// signals exhaustion; the content is not otherwise inspectable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationToken(pub String);

/// One page of raw rows plus the cursor for the next page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowSegment {
    pub rows: Vec<RowData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation: Option<ContinuationToken>,
}

/// A raw row on the wire: identity fields plus the property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub partition_key: String,
    pub row_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl RowData {
    /// Serialize an entity for submission, rendering its timestamp as
    /// RFC 3339.
    pub fn from_entity(entity: &Entity) -> Result<Self, ClientError> {
        let timestamp = match entity.timestamp {
            Some(ts) => Some(
                ts.format(&Rfc3339)
                    .map_err(|e| ClientError::Protocol(format!("unrenderable timestamp: {e}")))?,
            ),
            None => None,
        };
        Ok(Self {
            partition_key: entity.partition_key.clone(),
            row_key: entity.row_key.clone(),
            timestamp,
            etag: entity.etag.clone(),
            properties: entity.properties.clone(),
        })
    }

    /// Resolve a raw row into a typed entity, reconstructing identity
    /// fields before the property bag.
    pub fn into_entity(self) -> Result<Entity, ClientError> {
        let timestamp = match &self.timestamp {
            Some(stamp) => Some(OffsetDateTime::parse(stamp, &Rfc3339).map_err(|e| {
                ClientError::Protocol(format!("bad row timestamp '{stamp}': {e}"))
            })?),
            None => None,
        };
        Ok(Entity {
            partition_key: self.partition_key,
            row_key: self.row_key,
            timestamp,
            etag: self.etag,
            properties: self.properties,
        })
    }
}

/// One operation in a batch submission. A batch is scoped to a single
/// partition key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BatchOp {
    /// Insert-or-replace a full row.
    Upsert { row: RowData },
    /// Delete by identity, guarded by the stored concurrency tag.
    Delete {
        partition_key: String,
        row_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        etag: Option<String>,
    },
}

impl BatchOp {
    /// The partition key this operation targets.
    pub fn partition_key(&self) -> &str {
        match self {
            BatchOp::Upsert { row } => &row.partition_key,
            BatchOp::Delete { partition_key, .. } => partition_key,
        }
    }
}
