//! Chunked sequential scan with bounded look-ahead prefetch.
//!
//! A [`ScanSession`] splits a row range into consecutive sub-ranges and keeps up
//! to `prefetch_depth` of them being fetched on background tokio tasks while the
//! consumer processes the current chunk.
//!
//! # Ordering
//!
//! In-flight fetches are kept in a queue in range order and the session only
//! ever awaits the head of that queue. A fetch that finishes early simply holds
//! its result in its task until its turn, so store completion order never
//! reorders output.
//!
//! # Cancellation
//!
//! [`ScanSession::close`] aborts every outstanding task without waiting for it.
//! Results that arrive after the abort are dropped with the task. Dropping the
//! session closes it.
//!
//! # Failure
//!
//! A fetch task that fails publishes its range start on a watch channel. The
//! session reacts as soon as it sees the signal: fetches for later ranges are
//! aborted and no new ones are issued. Chunks before the failed range are
//! still delivered in order, then the failure is returned as
//! [`ScanError::Transport`].
//!
//! # Example
//!
//! ```ignore
//! let spec = ChunkSpec::new(vec!["rand_value"], 0..num_rows, num_rows / 10 + 1);
//! let mut session = ScanSession::open(store, &table, spec).await?;
//! let mut sum = 0i64;
//! while let Some(chunk) = session.next_chunk().await? {
//!     for row in &chunk {
//!         sum += row[0].as_i64().unwrap_or(0);
//!     }
//! }
//! session.close();
//! ```

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;

use futures::Stream;
use linscan_tabular::{Row, TableSchema};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Result, ScanError, StoreError};
use crate::scan::chunk::Chunk;
use crate::scan::config::ScanConfig;
use crate::scan::plan::{ChunkPlan, ChunkSpec};
use crate::store::{StoreResult, TableId, TableState, TableStore};

/// Counters for a session's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Fetch tasks spawned.
    pub fetches_issued: u64,
    /// Chunks handed to the consumer.
    pub chunks_delivered: u64,
    /// Rows handed to the consumer.
    pub rows_delivered: u64,
    /// Fetch tasks aborted before they finished, by close or failure.
    pub fetches_cancelled: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    Exhausted,
    Failed,
    Closed,
}

impl SessionState {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

struct PendingFetch {
    range: Range<u64>,
    handle: JoinHandle<StoreResult<Vec<Row>>>,
}

/// Live reader over one table range.
pub struct ScanSession<S: TableStore + ?Sized + 'static> {
    store: Arc<S>,
    table: TableId,
    spec: ChunkSpec,
    config: ScanConfig,
    /// Resolved column indices, shared with fetch tasks.
    projection: Arc<[usize]>,
    /// Schema of the projected columns.
    schema: TableSchema,
    plan: ChunkPlan,
    in_flight: VecDeque<PendingFetch>,
    /// Lowest range start whose fetch failed, set by fetch tasks.
    failure_tx: Arc<watch::Sender<Option<u64>>>,
    failure_rx: watch::Receiver<Option<u64>>,
    /// Failure already acted on; no fetch past it is issued.
    failed_at: Option<u64>,
    state: SessionState,
    stats: ScanStats,
}

impl<S: TableStore + ?Sized + 'static> std::fmt::Debug for ScanSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("table", &self.table)
            .field("range", &self.spec.range)
            .field("chunk_size", &self.spec.chunk_size)
            .field("cursor", &self.plan.cursor())
            .field("in_flight", &self.in_flight.len())
            .field("failed_at", &self.failed_at)
            .field("state", &self.state.as_str())
            .finish()
    }
}

impl<S: TableStore + ?Sized + 'static> ScanSession<S> {
    /// Open a session with the default [`ScanConfig`].
    pub async fn open(store: Arc<S>, table: &TableId, spec: ChunkSpec) -> Result<Self> {
        Self::open_with_config(store, table, spec, ScanConfig::default()).await
    }

    /// Open a session.
    ///
    /// Validates the chunk size, table readability, column selector and row
    /// range, then schedules the first `prefetch_depth` fetches. Returns without
    /// waiting for any fetch.
    pub async fn open_with_config(
        store: Arc<S>,
        table: &TableId,
        spec: ChunkSpec,
        config: ScanConfig,
    ) -> Result<Self> {
        if spec.chunk_size == 0 {
            return Err(ScanError::InvalidChunkSize(spec.chunk_size));
        }

        let state = store.state(table).await?;
        if state == TableState::Open && !config.allow_open_tables {
            return Err(ScanError::NotReadable(table.to_string()));
        }

        let full_schema = store.schema(table).await?;
        let projection = spec.columns.resolve(&full_schema)?;
        let schema = full_schema
            .project(&projection)
            .map_err(|e| ScanError::Store(e.into()))?;

        let row_count = store.row_count(table).await?;
        spec.range.validate(row_count)?;

        let config = ScanConfig {
            prefetch_depth: config.prefetch_depth.max(1),
            ..config
        };

        let (failure_tx, failure_rx) = watch::channel(None);
        let mut session = Self {
            store,
            table: table.clone(),
            plan: spec.plan(),
            spec,
            config,
            projection: projection.into(),
            schema,
            in_flight: VecDeque::new(),
            failure_tx: Arc::new(failure_tx),
            failure_rx,
            failed_at: None,
            state: SessionState::Active,
            stats: ScanStats::default(),
        };

        tracing::debug!(
            table = %session.table,
            range = %session.spec.range,
            chunk_size = session.spec.chunk_size,
            chunks = session.spec.num_chunks(),
            prefetch_depth = session.config.prefetch_depth,
            "Opened scan session"
        );

        session.fill_window();
        if session.in_flight.is_empty() {
            session.state = SessionState::Exhausted;
        }
        Ok(session)
    }

    /// Next chunk in range order, or `None` at end-of-scan.
    ///
    /// Suspends until the next chunk's fetch completes. A failed fetch returns
    /// [`ScanError::Transport`] and terminates the session; so does a fetch
    /// that returns the wrong number of rows. A failure signalled by a later
    /// fetch while this call waits cancels the fetches after it right away;
    /// chunks before the failed range are still returned first. After
    /// end-of-scan, `close`, or a failure, every call returns `Ok(None)`.
    ///
    /// Cancel safe: dropping the returned future leaves the pending fetch in
    /// place for the next call.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        if self.state != SessionState::Active {
            return Ok(None);
        }

        self.apply_failure();
        let outcome = loop {
            let Some(pending) = self.in_flight.front_mut() else {
                self.state = SessionState::Exhausted;
                return Ok(None);
            };
            tokio::select! {
                biased;
                outcome = &mut pending.handle => break outcome,
                _ = self.failure_rx.changed() => {}
            }
            self.apply_failure();
        };
        let Some(PendingFetch { range, .. }) = self.in_flight.pop_front() else {
            return Ok(None);
        };

        let rows = match outcome {
            Ok(Ok(rows)) => rows,
            Ok(Err(err)) => return Err(self.fail(range, err)),
            Err(join_err) => {
                let err = StoreError::unavailable(format!("fetch task failed: {}", join_err));
                return Err(self.fail(range, err));
            }
        };

        let expected = range.end - range.start;
        if rows.len() as u64 != expected {
            let err = StoreError::unavailable(format!(
                "short read: expected {} rows, got {}",
                expected,
                rows.len()
            ));
            return Err(self.fail(range, err));
        }

        self.stats.chunks_delivered += 1;
        self.stats.rows_delivered += expected;
        tracing::trace!(
            table = %self.table,
            start = range.start,
            end = range.end,
            "Delivering chunk"
        );

        self.apply_failure();
        self.fill_window();
        if self.in_flight.is_empty() {
            self.state = SessionState::Exhausted;
            tracing::debug!(
                table = %self.table,
                chunks = self.stats.chunks_delivered,
                rows = self.stats.rows_delivered,
                "Scan exhausted"
            );
        }

        Ok(Some(Chunk::new(range, rows)))
    }

    /// Cancel outstanding fetches and end the session. Idempotent; never blocks.
    pub fn close(&mut self) {
        if self.state != SessionState::Active {
            return;
        }
        self.shutdown(SessionState::Closed);
        tracing::debug!(
            table = %self.table,
            chunks = self.stats.chunks_delivered,
            rows = self.stats.rows_delivered,
            cancelled = self.stats.fetches_cancelled,
            "Closed scan session"
        );
    }

    /// Adapt into a stream of chunks. Dropping the stream closes the session.
    pub fn into_stream(self) -> impl Stream<Item = Result<Chunk>> {
        futures::stream::unfold(self, |mut session| async move {
            match session.next_chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), session)),
                Ok(None) => None,
                Err(err) => Some((Err(err), session)),
            }
        })
    }

    /// Table being scanned.
    pub fn table(&self) -> &TableId {
        &self.table
    }

    pub fn spec(&self) -> &ChunkSpec {
        &self.spec
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Schema of the projected columns, in selector order.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Next row index not yet requested from the store.
    pub fn cursor(&self) -> u64 {
        self.plan.cursor()
    }

    /// Fetches currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// True once the session is exhausted, closed, or failed.
    pub fn is_terminal(&self) -> bool {
        self.state != SessionState::Active
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    fn fill_window(&mut self) {
        if self.failed_at.is_some() {
            return;
        }
        while self.in_flight.len() < self.config.prefetch_depth {
            let Some(range) = self.plan.next() else {
                break;
            };
            self.spawn_fetch(range);
        }
    }

    fn spawn_fetch(&mut self, range: Range<u64>) {
        let store = Arc::clone(&self.store);
        let table = self.table.clone();
        let columns = Arc::clone(&self.projection);
        let timeout = self.config.fetch_timeout;
        let failures = Arc::clone(&self.failure_tx);
        let rows = range.clone();
        let start = range.start;

        tracing::trace!(table = %self.table, start = range.start, end = range.end, "Issuing fetch");

        let handle = tokio::spawn(async move {
            let fetch = store.fetch_rows(&table, &columns, rows);
            let result = match timeout {
                Some(limit) => tokio::time::timeout(limit, fetch)
                    .await
                    .unwrap_or(Err(StoreError::Timeout(limit))),
                None => fetch.await,
            };
            if result.is_err() {
                failures.send_modify(|failed| {
                    *failed = Some(failed.map_or(start, |f| f.min(start)));
                });
            }
            result
        });

        self.stats.fetches_issued += 1;
        self.in_flight.push_back(PendingFetch { range, handle });
    }

    /// Abort fetches past a signalled failure and stop issuing new ones.
    fn apply_failure(&mut self) {
        let Some(failed_at) = *self.failure_rx.borrow_and_update() else {
            return;
        };
        if self.failed_at.is_some_and(|f| f <= failed_at) {
            return;
        }
        self.failed_at = Some(failed_at);

        let mut aborted = 0u64;
        while self
            .in_flight
            .back()
            .is_some_and(|p| p.range.start > failed_at)
        {
            if let Some(pending) = self.in_flight.pop_back() {
                aborted += u64::from(Self::abort(pending, &mut self.stats));
            }
        }
        tracing::debug!(
            table = %self.table,
            failed_at,
            aborted,
            "Fetch failure signalled, cancelled later fetches"
        );
    }

    fn fail(&mut self, range: Range<u64>, err: StoreError) -> ScanError {
        tracing::warn!(
            table = %self.table,
            start = range.start,
            end = range.end,
            error = %err,
            "Fetch failed, terminating scan"
        );
        self.shutdown(SessionState::Failed);
        ScanError::transport(range, err)
    }

    fn shutdown(&mut self, state: SessionState) {
        for pending in self.in_flight.drain(..) {
            Self::abort(pending, &mut self.stats);
        }
        self.state = state;
    }

    /// Abort one fetch; only tasks still running count as cancelled.
    fn abort(pending: PendingFetch, stats: &mut ScanStats) -> bool {
        let running = !pending.handle.is_finished();
        pending.handle.abort();
        if running {
            stats.fetches_cancelled += 1;
        }
        running
    }
}

impl<S: TableStore + ?Sized + 'static> Drop for ScanSession<S> {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            self.shutdown(SessionState::Closed);
        }
    }
}
