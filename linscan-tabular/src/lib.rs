//! Table schema and row types for linscan.
//!
//! This crate provides the data model shared by the backing-store contract and
//! the scan session: column types, table schemas, and positional rows.
//!
//! # Design
//!
//! - **Row-oriented**: a chunk is a sequence of rows, each an ordered tuple of
//!   projected values
//! - **Typed schema**: column types live in the schema, not in the reader, so
//!   scans are not tied to a particular numeric type
//! - **Small**: no Arrow dependency

pub mod error;
pub mod schema;
pub mod value;

pub use error::{Result, TabularError};
pub use schema::{ColumnDesc, FieldType, TableSchema};
pub use value::{Row, Value};
