//! A store wrapper that records fetch activity and injects faults.
//!
//! Used for testing scan sessions: it counts fetches, tracks how many are in
//! flight at once, notices fetches that were dropped before completing, and can
//! delay or fail the fetch that starts at a given row.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use linscan_tabular::{Row, TableSchema};
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::store::{StoreResult, TableId, TableState, TableStore};

#[derive(Debug, Default)]
struct FaultPlan {
    default_delay: Option<Duration>,
    delays: HashMap<u64, Duration>,
    failures: HashSet<u64>,
}

#[derive(Debug, Default)]
struct Counters {
    fetch_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
    cancelled: AtomicUsize,
}

/// Decrements the in-flight count on drop; counts a cancellation if the fetch
/// future was dropped before finishing.
struct InFlightGuard<'a> {
    counters: &'a Counters,
    finished: bool,
}

impl<'a> InFlightGuard<'a> {
    fn enter(counters: &'a Counters) -> Self {
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self {
            counters,
            finished: false,
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.finished {
            self.counters.completed.fetch_add(1, Ordering::SeqCst);
        } else {
            self.counters.cancelled.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Instrumented wrapper around another [`TableStore`].
#[derive(Debug)]
pub struct InstrumentedStore<S: TableStore> {
    inner: S,
    faults: Mutex<FaultPlan>,
    counters: Counters,
    fetched_ranges: Mutex<Vec<Range<u64>>>,
}

impl<S: TableStore> InstrumentedStore<S> {
    /// Wrap a store with no injected faults.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            faults: Mutex::new(FaultPlan::default()),
            counters: Counters::default(),
            fetched_ranges: Mutex::new(Vec::new()),
        }
    }

    /// Delay every fetch by `delay` unless a per-range delay applies.
    pub fn with_fetch_delay(self, delay: Duration) -> Self {
        self.faults.lock().default_delay = Some(delay);
        self
    }

    /// Delay the fetch whose range starts at `start_row`.
    pub fn with_delay_at(self, start_row: u64, delay: Duration) -> Self {
        self.faults.lock().delays.insert(start_row, delay);
        self
    }

    /// Fail the fetch whose range starts at `start_row`.
    pub fn with_failure_at(self, start_row: u64) -> Self {
        self.faults.lock().failures.insert(start_row);
        self
    }

    /// Number of `fetch_rows` calls made.
    pub fn fetch_calls(&self) -> usize {
        self.counters.fetch_calls.load(Ordering::SeqCst)
    }

    /// Fetches currently running.
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Peak number of concurrently running fetches.
    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }

    /// Fetches that ran to completion (successfully or not).
    pub fn completed(&self) -> usize {
        self.counters.completed.load(Ordering::SeqCst)
    }

    /// Fetches dropped before completing.
    pub fn cancelled(&self) -> usize {
        self.counters.cancelled.load(Ordering::SeqCst)
    }

    /// Ranges requested, in call order.
    pub fn fetched_ranges(&self) -> Vec<Range<u64>> {
        self.fetched_ranges.lock().clone()
    }

    fn plan_for(&self, start_row: u64) -> (Option<Duration>, bool) {
        let faults = self.faults.lock();
        let delay = faults
            .delays
            .get(&start_row)
            .copied()
            .or(faults.default_delay);
        (delay, faults.failures.contains(&start_row))
    }
}

#[async_trait]
impl<S: TableStore> TableStore for InstrumentedStore<S> {
    async fn row_count(&self, table: &TableId) -> StoreResult<u64> {
        self.inner.row_count(table).await
    }

    async fn schema(&self, table: &TableId) -> StoreResult<TableSchema> {
        self.inner.schema(table).await
    }

    async fn state(&self, table: &TableId) -> StoreResult<TableState> {
        self.inner.state(table).await
    }

    async fn fetch_rows(
        &self,
        table: &TableId,
        columns: &[usize],
        rows: Range<u64>,
    ) -> StoreResult<Vec<Row>> {
        self.counters.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetched_ranges.lock().push(rows.clone());
        let mut guard = InFlightGuard::enter(&self.counters);

        let (delay, fail) = self.plan_for(rows.start);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = if fail {
            Err(StoreError::unavailable(format!(
                "injected failure for rows starting at {}",
                rows.start
            )))
        } else {
            self.inner.fetch_rows(table, columns, rows).await
        };
        guard.finished = true;
        result
    }
}
