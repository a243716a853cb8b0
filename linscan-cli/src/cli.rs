use clap::{Args, Parser, Subcommand};
use linscan_tabular::ColumnDesc;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linscan", about = "Chunked sequential table scans", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to config file (defaults to ./linscan.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Scan tuning shared by every command that opens a session.
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Maximum number of chunk fetches in flight
    #[arg(long, env = "LINSCAN_PREFETCH_DEPTH")]
    pub prefetch_depth: Option<usize>,

    /// Per-fetch timeout in milliseconds
    #[arg(long, env = "LINSCAN_FETCH_TIMEOUT_MS")]
    pub fetch_timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill a table with random values, scan it, and report the average
    RandTable {
        /// Number of rows to generate
        #[arg(long)]
        num_rows: Option<u64>,

        /// JSON job input with a "numRows" key (--num-rows wins)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Seed for the random generator
        #[arg(long)]
        seed: Option<u64>,

        /// Rows per chunk (defaults to num_rows / 10 + 1)
        #[arg(long)]
        chunk_size: Option<u64>,

        /// Directory for OutputFile and job_output.json
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Load JSON-array rows into a table and stream them back in chunks
    Scan {
        /// File with one JSON array per line
        #[arg(long)]
        file: PathBuf,

        /// Column definition as name:type, with a trailing '?' for nullable
        #[arg(long = "column", required = true)]
        columns: Vec<ColumnDesc>,

        /// Columns to read, in output order (default: all)
        #[arg(long)]
        select: Vec<String>,

        /// First row to read
        #[arg(long, default_value_t = 0)]
        start: u64,

        /// One past the last row to read (default: row count)
        #[arg(long)]
        end: Option<u64>,

        /// Rows per chunk
        #[arg(long, default_value_t = 1000)]
        chunk_size: u64,

        /// Leave the table open while scanning
        #[arg(long)]
        keep_open: bool,

        /// Print chunk and row counts to stderr
        #[arg(long)]
        summary: bool,

        #[command(flatten)]
        scan: ScanArgs,
    },
}
