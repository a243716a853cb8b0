use crate::error::{CliError, CliResult};
use crate::input;
use linscan_core::{ChunkSpec, ColumnSelector, MemoryTableStore, ScanConfig, ScanSession, TableStore};
use linscan_tabular::{ColumnDesc, TableSchema};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub struct ScanOpts {
    pub file: PathBuf,
    pub columns: Vec<ColumnDesc>,
    pub select: Vec<String>,
    pub start: u64,
    pub end: Option<u64>,
    pub chunk_size: u64,
    pub keep_open: bool,
    pub summary: bool,
}

pub async fn run(opts: &ScanOpts, scan_config: ScanConfig) -> CliResult<()> {
    if opts.chunk_size == 0 {
        return Err(CliError::Usage(
            "--chunk-size must be greater than 0".to_string(),
        ));
    }

    let schema = TableSchema::new(opts.columns.clone())?;
    let rows = input::read_rows(&opts.file, &schema)?;

    let store = Arc::new(MemoryTableStore::new());
    let table = store.create_table(opts.columns.clone())?;
    store.add_rows(&table, rows)?;
    if !opts.keep_open {
        store.close_table(&table)?;
    }

    let end = match opts.end {
        Some(end) => end,
        None => store.row_count(&table).await?,
    };
    let selector: ColumnSelector = opts.select.iter().cloned().collect();
    let spec = ChunkSpec::new(selector, opts.start..end, opts.chunk_size);
    let mut session = ScanSession::open_with_config(store, &table, spec, scan_config).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut chunks = 0u64;
    let mut total = 0u64;
    while let Some(chunk) = session.next_chunk().await? {
        for row in &chunk {
            serde_json::to_writer(&mut out, row)?;
            out.write_all(b"\n")?;
        }
        chunks += 1;
        total += chunk.len() as u64;
    }
    out.flush()?;
    session.close();

    if opts.summary {
        eprintln!("chunks = {chunks}");
        eprintln!("rows = {total}");
    }
    Ok(())
}
