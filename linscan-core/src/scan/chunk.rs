//! Chunks delivered by a scan session.

use std::ops::Range;

use linscan_tabular::Row;

/// One contiguous, ordered batch of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    range: Range<u64>,
    rows: Vec<Row>,
}

impl Chunk {
    pub(crate) fn new(range: Range<u64>, rows: Vec<Row>) -> Self {
        debug_assert_eq!(rows.len() as u64, range.end - range.start);
        Self { range, rows }
    }

    /// Table rows covered by this chunk.
    #[inline]
    pub fn range(&self) -> Range<u64> {
        self.range.clone()
    }

    /// Index of the first row.
    #[inline]
    pub fn start(&self) -> u64 {
        self.range.start
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a Chunk {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for Chunk {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
