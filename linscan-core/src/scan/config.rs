//! Scan session configuration.

use std::time::Duration;

/// Default number of outstanding prefetch requests.
pub const DEFAULT_PREFETCH_DEPTH: usize = 2;

/// Configuration for a scan session.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum number of fetches outstanding at once (look-ahead window).
    ///
    /// Bounds memory held by a session to roughly
    /// `prefetch_depth * chunk_size` rows. Minimum 1.
    ///
    /// Default: 2
    pub prefetch_depth: usize,

    /// Per-fetch timeout. Expiry fails the session with a transport error.
    pub fetch_timeout: Option<Duration>,

    /// Allow scanning tables that are still open.
    ///
    /// The scan covers rows present when the session is opened; rows appended
    /// later are not visible to it.
    pub allow_open_tables: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            prefetch_depth: DEFAULT_PREFETCH_DEPTH,
            fetch_timeout: None,
            allow_open_tables: false,
        }
    }
}

impl ScanConfig {
    /// Create a new scan config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the look-ahead window (clamped to at least 1).
    pub fn with_prefetch_depth(mut self, depth: usize) -> Self {
        self.prefetch_depth = depth.max(1);
        self
    }

    /// Set the per-fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Allow or forbid scanning open tables.
    pub fn with_allow_open_tables(mut self, allow: bool) -> Self {
        self.allow_open_tables = allow;
        self
    }
}
