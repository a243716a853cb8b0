//! Chunked asynchronous sequential reads over append-only tables.
//!
//! This crate reads a row range of a server-held table as a sequence of
//! ordered chunks, fetching upcoming chunks in the background while the caller
//! processes the current one.
//!
//! # Architecture
//!
//! - [`store`] - Backing-store contract ([`TableStore`]), an in-memory
//!   append-only store, and an instrumented wrapper for fault injection
//! - [`scan`] - Chunk planning and the prefetching [`ScanSession`]
//! - [`error`] - Store and scan error types
//!
//! # Example
//!
//! ```ignore
//! use linscan_core::{ChunkSpec, MemoryTableStore, ScanSession};
//! use linscan_tabular::{ColumnDesc, FieldType, Value};
//!
//! let store = Arc::new(MemoryTableStore::new());
//! let table = store.create_table(vec![ColumnDesc::new("v", FieldType::Int32)])?;
//! store.add_rows(&table, (0..25).map(|i| vec![Value::Int(i)]).collect())?;
//! store.close_table(&table)?;
//!
//! let mut session = ScanSession::open(store, &table, ChunkSpec::new(vec!["v"], 0..25, 10)).await?;
//! while let Some(chunk) = session.next_chunk().await? {
//!     println!("{} rows starting at {}", chunk.len(), chunk.start());
//! }
//! ```

pub mod error;
pub mod scan;
pub mod store;

pub use error::{Result, ScanError, StoreError};
pub use scan::{
    Chunk, ChunkPlan, ChunkSpec, ColumnRef, ColumnSelector, RowRange, ScanConfig, ScanSession,
    ScanStats,
};
pub use store::{InstrumentedStore, MemoryTableStore, TableId, TableState, TableStore};
