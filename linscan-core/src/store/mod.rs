//! Backing-store contract for server-held tables.
//!
//! This module provides:
//! - [`TableStore`] - the read contract a scan session consumes
//! - [`memory`] - an in-process append-only store
//! - [`instrumented`] - a wrapper that records fetch activity and injects
//!   latency and failures
//!
//! # Design
//!
//! - **Storage-agnostic**: sessions only see row counts, schemas, table state
//!   and positional range fetches
//! - **`Send + Sync`**: fetches run on spawned tokio tasks, so stores are shared
//!   as `Arc<S>`
//! - **No retries**: a failed fetch is reported as-is; retry policy belongs to
//!   the store implementation

pub mod instrumented;
pub mod memory;

use std::fmt;
use std::ops::Range;

use async_trait::async_trait;
use linscan_tabular::{Row, TableSchema};

use crate::error::StoreError;

pub use instrumented::InstrumentedStore;
pub use memory::MemoryTableStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Opaque table handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(String);

impl TableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random handle (`table-<uuid>`).
    pub fn generate() -> Self {
        Self(format!("table-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Rows may still be appended.
    Open,
    /// Immutable; safe to read.
    Closed,
}

/// Read contract for a table backing store.
///
/// `fetch_rows` may be called concurrently for disjoint ranges and may complete
/// in any order.
#[async_trait]
pub trait TableStore: fmt::Debug + Send + Sync {
    /// Current number of rows in the table.
    async fn row_count(&self, table: &TableId) -> StoreResult<u64>;

    /// Table schema.
    async fn schema(&self, table: &TableId) -> StoreResult<TableSchema>;

    /// Table lifecycle state.
    async fn state(&self, table: &TableId) -> StoreResult<TableState>;

    /// Fetch `rows` projected to the given column indices, in row order.
    ///
    /// Implementations must return exactly `rows.end - rows.start` rows or an
    /// error.
    async fn fetch_rows(
        &self,
        table: &TableId,
        columns: &[usize],
        rows: Range<u64>,
    ) -> StoreResult<Vec<Row>>;
}
