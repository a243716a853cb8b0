//! Row ranges, column selectors and chunk planning.

use std::fmt;
use std::ops::Range;

use linscan_tabular::TableSchema;

use crate::error::{Result, ScanError};

/// Half-open row interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u64,
    pub end: u64,
}

impl RowRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of rows covered (zero for reversed ranges).
    #[inline]
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check `start <= end <= row_count`.
    pub fn validate(&self, row_count: u64) -> Result<()> {
        if self.start > self.end || self.end > row_count {
            return Err(ScanError::InvalidRange {
                start: self.start,
                end: self.end,
                row_count,
            });
        }
        Ok(())
    }
}

impl From<Range<u64>> for RowRange {
    fn from(r: Range<u64>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Reference to a column by name or position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Index(usize),
}

impl ColumnRef {
    fn resolve(&self, schema: &TableSchema) -> Result<usize> {
        match self {
            Self::Name(name) => schema
                .index_of(name)
                .ok_or_else(|| ScanError::UnknownColumn(name.clone())),
            Self::Index(i) if *i < schema.num_columns() => Ok(*i),
            Self::Index(i) => Err(ScanError::UnknownColumn(format!("#{}", i))),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Ordered projection of columns. Empty selects every column in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelector(Vec<ColumnRef>);

impl ColumnSelector {
    pub fn new(columns: Vec<ColumnRef>) -> Self {
        Self(columns)
    }

    /// Select all columns.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[ColumnRef] {
        &self.0
    }

    pub fn is_all(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve to column indices against a schema.
    pub fn resolve(&self, schema: &TableSchema) -> Result<Vec<usize>> {
        if self.is_all() {
            return Ok((0..schema.num_columns()).collect());
        }
        self.0.iter().map(|c| c.resolve(schema)).collect()
    }
}

impl<C: Into<ColumnRef>> FromIterator<C> for ColumnSelector {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<C: Into<ColumnRef>> From<Vec<C>> for ColumnSelector {
    fn from(columns: Vec<C>) -> Self {
        columns.into_iter().collect()
    }
}

/// What a session reads: columns, rows and chunk size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpec {
    pub columns: ColumnSelector,
    pub range: RowRange,
    pub chunk_size: u64,
}

impl ChunkSpec {
    pub fn new(
        columns: impl Into<ColumnSelector>,
        range: impl Into<RowRange>,
        chunk_size: u64,
    ) -> Self {
        Self {
            columns: columns.into(),
            range: range.into(),
            chunk_size,
        }
    }

    /// Number of chunks the range splits into.
    pub fn num_chunks(&self) -> u64 {
        if self.chunk_size == 0 {
            return 0;
        }
        self.range.len().div_ceil(self.chunk_size)
    }

    /// Sub-ranges in ascending order.
    pub fn plan(&self) -> ChunkPlan {
        ChunkPlan::new(self.range, self.chunk_size)
    }
}

/// Iterator over the consecutive sub-ranges of a row range.
///
/// Every sub-range is non-empty and at most `chunk_size` long; only the last
/// may be shorter.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    next: u64,
    end: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    pub fn new(range: RowRange, chunk_size: u64) -> Self {
        Self {
            next: range.start,
            end: range.end,
            chunk_size,
        }
    }

    /// Start of the next sub-range (equals the range end once exhausted).
    #[inline]
    pub fn cursor(&self) -> u64 {
        self.next
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.chunk_size == 0 || self.next >= self.end
    }
}

impl Iterator for ChunkPlan {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Range<u64>> {
        if self.is_exhausted() {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.chunk_size).min(self.end);
        self.next = end;
        Some(start..end)
    }
}
