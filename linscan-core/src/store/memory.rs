//! In-memory append-only table store.
//!
//! Tables are created with a schema, grown with [`MemoryTableStore::add_rows`],
//! and frozen with [`MemoryTableStore::close_table`]. Reads are served from the
//! current contents, so an open table can be scanned up to the row count seen
//! when the scan was opened.

use std::collections::HashMap;
use std::ops::Range;

use async_trait::async_trait;
use linscan_tabular::{ColumnDesc, Row, TableSchema};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::store::{StoreResult, TableId, TableState, TableStore};

#[derive(Debug)]
struct MemTable {
    schema: TableSchema,
    rows: Vec<Row>,
    state: TableState,
}

/// In-memory table store.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: RwLock<HashMap<TableId, MemTable>>,
}

impl MemoryTableStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty open table with the given columns.
    pub fn create_table(&self, columns: Vec<ColumnDesc>) -> StoreResult<TableId> {
        let schema = TableSchema::new(columns)?;
        let id = TableId::generate();
        self.tables.write().insert(
            id.clone(),
            MemTable {
                schema,
                rows: Vec::new(),
                state: TableState::Open,
            },
        );
        tracing::debug!(table = %id, "Created table");
        Ok(id)
    }

    /// Append rows to an open table.
    ///
    /// The whole batch is validated before any row is appended.
    pub fn add_rows(&self, table: &TableId, rows: Vec<Row>) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::table_not_found(table.as_str()))?;

        if entry.state == TableState::Closed {
            return Err(StoreError::table_closed(table.as_str()));
        }

        let conformed = rows
            .into_iter()
            .map(|row| entry.schema.conform_row(row))
            .collect::<linscan_tabular::Result<Vec<_>>>()?;

        tracing::trace!(table = %table, added = conformed.len(), "Appended rows");
        entry.rows.extend(conformed);
        Ok(())
    }

    /// Close a table, making it immutable. Closing twice is allowed.
    pub fn close_table(&self, table: &TableId) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::table_not_found(table.as_str()))?;
        if entry.state == TableState::Open {
            entry.state = TableState::Closed;
            tracing::debug!(table = %table, rows = entry.rows.len(), "Closed table");
        }
        Ok(())
    }

    /// Number of tables held.
    pub fn num_tables(&self) -> usize {
        self.tables.read().len()
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn row_count(&self, table: &TableId) -> StoreResult<u64> {
        self.tables
            .read()
            .get(table)
            .map(|t| t.rows.len() as u64)
            .ok_or_else(|| StoreError::table_not_found(table.as_str()))
    }

    async fn schema(&self, table: &TableId) -> StoreResult<TableSchema> {
        self.tables
            .read()
            .get(table)
            .map(|t| t.schema.clone())
            .ok_or_else(|| StoreError::table_not_found(table.as_str()))
    }

    async fn state(&self, table: &TableId) -> StoreResult<TableState> {
        self.tables
            .read()
            .get(table)
            .map(|t| t.state)
            .ok_or_else(|| StoreError::table_not_found(table.as_str()))
    }

    async fn fetch_rows(
        &self,
        table: &TableId,
        columns: &[usize],
        rows: Range<u64>,
    ) -> StoreResult<Vec<Row>> {
        let tables = self.tables.read();
        let entry = tables
            .get(table)
            .ok_or_else(|| StoreError::table_not_found(table.as_str()))?;

        let row_count = entry.rows.len() as u64;
        if rows.start > rows.end || rows.end > row_count {
            return Err(StoreError::OutOfBounds {
                start: rows.start,
                end: rows.end,
                row_count,
            });
        }
        if let Some(&bad) = columns.iter().find(|&&c| c >= entry.schema.num_columns()) {
            return Err(StoreError::Schema(format!(
                "column index {} out of bounds",
                bad
            )));
        }

        let slice = &entry.rows[rows.start as usize..rows.end as usize];
        Ok(slice
            .iter()
            .map(|row| columns.iter().map(|&c| row[c].clone()).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linscan_tabular::{FieldType, Value};

    fn two_column_table(store: &MemoryTableStore) -> TableId {
        store
            .create_table(vec![
                ColumnDesc::new("id", FieldType::Int64),
                ColumnDesc::new("name", FieldType::String),
            ])
            .unwrap()
    }

    #[tokio::test]
    async fn test_append_close_and_fetch() {
        let store = MemoryTableStore::new();
        let table = two_column_table(&store);

        store
            .add_rows(
                &table,
                (0..5)
                    .map(|i| vec![Value::Int(i), Value::from(format!("n{}", i))])
                    .collect(),
            )
            .unwrap();
        assert_eq!(store.state(&table).await.unwrap(), TableState::Open);

        store.close_table(&table).unwrap();
        assert_eq!(store.state(&table).await.unwrap(), TableState::Closed);
        assert_eq!(store.row_count(&table).await.unwrap(), 5);

        // Projection reorders columns
        let rows = store.fetch_rows(&table, &[1, 0], 1..3).await.unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Value::from("n1"), Value::Int(1)],
                vec![Value::from("n2"), Value::Int(2)],
            ]
        );
    }

    #[tokio::test]
    async fn test_closed_table_rejects_rows() {
        let store = MemoryTableStore::new();
        let table = two_column_table(&store);
        store.close_table(&table).unwrap();
        store.close_table(&table).unwrap();

        let err = store
            .add_rows(&table, vec![vec![Value::Int(1), Value::from("a")]])
            .unwrap_err();
        assert!(matches!(err, StoreError::TableClosed(_)));
    }

    #[tokio::test]
    async fn test_invalid_batch_is_not_partially_applied() {
        let store = MemoryTableStore::new();
        let table = two_column_table(&store);

        let err = store
            .add_rows(
                &table,
                vec![
                    vec![Value::Int(1), Value::from("a")],
                    vec![Value::from("oops"), Value::from("b")],
                ],
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)));
        assert_eq!(store.row_count(&table).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fetch_out_of_bounds() {
        let store = MemoryTableStore::new();
        let table = two_column_table(&store);
        store
            .add_rows(&table, vec![vec![Value::Int(1), Value::from("a")]])
            .unwrap();

        assert!(matches!(
            store.fetch_rows(&table, &[0], 0..2).await,
            Err(StoreError::OutOfBounds { row_count: 1, .. })
        ));
        assert!(matches!(
            store.fetch_rows(&table, &[2], 0..1).await,
            Err(StoreError::Schema(_))
        ));
        // Empty range at the end is fine
        assert!(store.fetch_rows(&table, &[0], 1..1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let store = MemoryTableStore::new();
        let missing = TableId::new("table-missing");
        assert!(matches!(
            store.row_count(&missing).await,
            Err(StoreError::TableNotFound(_))
        ));
        assert!(store.close_table(&missing).is_err());
        assert_eq!(store.num_tables(), 0);
    }
}
