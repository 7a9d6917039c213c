//! In-memory table service double for integration tests: stores rows per
//! table, parses and evaluates filter strings, pages results, and applies
//! batches with the service's partition and size limits enforced.

pub mod grammar;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use stratus_client::{
    BatchOp, ContinuationToken, MAX_BATCH_OPERATIONS, RowData, RowSegment, SegmentRequest,
    TableTransport, TransportError,
};

/// One accepted batch submission, for assertions.
#[derive(Debug, Clone)]
pub struct BatchRecord {
    pub table: String,
    pub size: usize,
    pub partitions: BTreeSet<String>,
}

type TableRows = BTreeMap<(String, String), RowData>;

pub struct MemoryTransport {
    tables: Mutex<BTreeMap<String, TableRows>>,
    page_size: usize,
    honor_row_budget: bool,
    batches: Mutex<Vec<BatchRecord>>,
    fetches: AtomicUsize,
    etags: AtomicU64,
}

impl MemoryTransport {
    pub fn new(page_size: usize) -> Self {
        Self {
            tables: Mutex::new(BTreeMap::new()),
            page_size,
            honor_row_budget: true,
            batches: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            etags: AtomicU64::new(0),
        }
    }

    /// Return full pages regardless of the requested row budget, so tests
    /// can exercise client-side truncation.
    pub fn ignore_row_budget(mut self) -> Self {
        self.honor_row_budget = false;
        self
    }

    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = RowData>) {
        let mut tables = self.tables.lock().unwrap();
        let table_rows = tables.entry(table.to_string()).or_default();
        for row in rows {
            table_rows.insert((row.partition_key.clone(), row.row_key.clone()), row);
        }
    }

    pub fn rows(&self, table: &str) -> Vec<RowData> {
        let tables = self.tables.lock().unwrap();
        tables
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn batch_log(&self) -> Vec<BatchRecord> {
        self.batches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn service_error(code: &str, message: impl Into<String>) -> TransportError {
        TransportError::Service {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl TableTransport for MemoryTransport {
    async fn fetch_segment(
        &self,
        table: &str,
        request: SegmentRequest,
        continuation: Option<ContinuationToken>,
    ) -> Result<RowSegment, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let all: Vec<RowData> = {
            let tables = self.tables.lock().unwrap();
            tables
                .get(table)
                .map(|t| t.values().cloned().collect())
                .unwrap_or_default()
        };

        let filtered: Vec<RowData> = match &request.filter {
            Some(text) => {
                let pred = grammar::parse(text)
                    .map_err(|e| Self::service_error("InvalidInput", e))?;
                all.into_iter().filter(|r| grammar::eval(&pred, r)).collect()
            }
            None => all,
        };

        let start: usize = continuation
            .and_then(|token| token.0.parse().ok())
            .unwrap_or(0);
        let mut len = self.page_size.min(filtered.len().saturating_sub(start));
        if self.honor_row_budget
            && let Some(top) = request.top
        {
            len = len.min(top as usize);
        }
        let end = start + len;

        let mut rows: Vec<RowData> = filtered[start..end].to_vec();
        if !request.select.is_empty() {
            for row in &mut rows {
                row.properties
                    .retain(|name, _| request.select.iter().any(|s| s == name));
            }
        }

        let continuation = (end < filtered.len()).then(|| ContinuationToken(end.to_string()));
        Ok(RowSegment { rows, continuation })
    }

    async fn submit_batch(&self, table: &str, ops: Vec<BatchOp>) -> Result<(), TransportError> {
        if ops.is_empty() {
            return Err(Self::service_error("InvalidInput", "empty batch"));
        }
        if ops.len() > MAX_BATCH_OPERATIONS {
            return Err(Self::service_error(
                "InvalidInput",
                format!("batch holds {} operations, limit is {MAX_BATCH_OPERATIONS}", ops.len()),
            ));
        }
        let partitions: BTreeSet<String> = ops
            .iter()
            .map(|op| op.partition_key().to_string())
            .collect();
        if partitions.len() > 1 {
            return Err(Self::service_error(
                "CommandsInBatchActOnDifferentPartitions",
                "a batch must target one partition",
            ));
        }

        let mut tables = self.tables.lock().unwrap();
        let table_rows = tables.entry(table.to_string()).or_default();

        // Validate the whole batch before applying anything (all-or-nothing).
        for op in &ops {
            if let BatchOp::Delete {
                partition_key,
                row_key,
                etag,
            } = op
            {
                let key = (partition_key.clone(), row_key.clone());
                match table_rows.get(&key) {
                    None => {
                        return Err(Self::service_error(
                            "ResourceNotFound",
                            format!("no row {partition_key}/{row_key}"),
                        ));
                    }
                    Some(existing) => {
                        if let Some(expected) = etag
                            && existing.etag.as_deref() != Some(expected.as_str())
                        {
                            return Err(Self::service_error(
                                "UpdateConditionNotSatisfied",
                                "etag mismatch",
                            ));
                        }
                    }
                }
            }
        }

        for op in &ops {
            match op {
                BatchOp::Upsert { row } => {
                    let mut stored = row.clone();
                    let etag = self.etags.fetch_add(1, Ordering::SeqCst) + 1;
                    stored.etag = Some(etag.to_string());
                    stored.timestamp = Some(
                        OffsetDateTime::now_utc()
                            .format(&Rfc3339)
                            .expect("utc timestamp formats"),
                    );
                    table_rows.insert(
                        (stored.partition_key.clone(), stored.row_key.clone()),
                        stored,
                    );
                }
                BatchOp::Delete {
                    partition_key,
                    row_key,
                    ..
                } => {
                    table_rows.remove(&(partition_key.clone(), row_key.clone()));
                }
            }
        }

        self.batches.lock().unwrap().push(BatchRecord {
            table: table.to_string(),
            size: ops.len(),
            partitions,
        });
        Ok(())
    }

    async fn create_table_if_not_exists(&self, table: &str) -> Result<(), TransportError> {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default();
        Ok(())
    }
}
