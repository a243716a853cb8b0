//! Error types for the backing store and scan sessions.

use std::ops::Range;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by a [`TableStore`](crate::store::TableStore).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Table handle not known to the store
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Write attempted on a closed table
    #[error("Table is closed: {0}")]
    TableClosed(String),

    /// Rows rejected by the table schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Requested rows lie outside the table
    #[error("Row range {start}..{end} out of bounds for table with {row_count} rows")]
    OutOfBounds { start: u64, end: u64, row_count: u64 },

    /// Fetch did not complete within the configured timeout
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    /// Backend unavailable or request failed
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn table_not_found(id: impl Into<String>) -> Self {
        Self::TableNotFound(id.into())
    }

    pub fn table_closed(id: impl Into<String>) -> Self {
        Self::TableClosed(id.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<linscan_tabular::TabularError> for StoreError {
    fn from(err: linscan_tabular::TabularError) -> Self {
        StoreError::Schema(err.to_string())
    }
}

/// Errors from opening or reading a scan session.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Row range is not within `[0, row_count]` or is reversed
    #[error("Invalid range: [{start}, {end}) for table with {row_count} rows")]
    InvalidRange { start: u64, end: u64, row_count: u64 },

    /// Column selector references a column absent from the schema
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Chunk size must be at least one row
    #[error("Invalid chunk size: {0} (must be >= 1)")]
    InvalidChunkSize(u64),

    /// Table is still open and the session does not read uncommitted rows
    #[error("Table not readable: {0} is still open")]
    NotReadable(String),

    /// Metadata lookup (row count, schema, state) failed while opening
    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    /// A chunk fetch failed; the session is terminated
    #[error("Transport error fetching rows [{}, {}): {source}", range.start, range.end)]
    Transport {
        range: Range<u64>,
        #[source]
        source: StoreError,
    },
}

impl ScanError {
    pub fn transport(range: Range<u64>, source: StoreError) -> Self {
        Self::Transport { range, source }
    }

    /// True for fetch failures surfaced by `next_chunk`.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<StoreError> for ScanError {
    fn from(err: StoreError) -> Self {
        ScanError::Store(err)
    }
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
