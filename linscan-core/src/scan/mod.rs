//! Chunked sequential scans.
//!
//! This module provides:
//! - [`plan`] - Row ranges, column selectors and chunk planning
//! - [`config`] - Session configuration (look-ahead window, timeout)
//! - [`chunk`] - The unit of delivery
//! - [`session`] - The prefetching scan session

pub mod chunk;
pub mod config;
pub mod plan;
pub mod session;

pub use chunk::Chunk;
pub use config::{ScanConfig, DEFAULT_PREFETCH_DEPTH};
pub use plan::{ChunkPlan, ChunkSpec, ColumnRef, ColumnSelector, RowRange};
pub use session::{ScanSession, ScanStats};
