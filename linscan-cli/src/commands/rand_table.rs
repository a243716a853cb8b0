use crate::error::{CliError, CliResult};
use linscan_core::{ChunkSpec, MemoryTableStore, ScanConfig, ScanSession};
use linscan_tabular::{ColumnDesc, FieldType, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const COLUMN: &str = "rand_value";
const RESULTS_FILE: &str = "OutputFile";
const JOB_OUTPUT_FILE: &str = "job_output.json";

pub struct RandTableOpts {
    pub num_rows: u64,
    pub seed: Option<u64>,
    pub chunk_size: Option<u64>,
    pub out_dir: PathBuf,
}

pub async fn run(opts: &RandTableOpts, scan_config: ScanConfig) -> CliResult<()> {
    if opts.num_rows == 0 {
        return Err(CliError::Usage(
            "numRows must be greater than 0".to_string(),
        ));
    }
    let chunk_size = opts.chunk_size.unwrap_or(opts.num_rows / 10 + 1);

    let store = Arc::new(MemoryTableStore::new());
    let table = store.create_table(vec![ColumnDesc::new(COLUMN, FieldType::Int32)])?;

    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let rows = (0..opts.num_rows)
        .map(|_| vec![Value::Int(rng.gen_range(0..100))])
        .collect();
    store.add_rows(&table, rows)?;
    store.close_table(&table)?;

    let spec = ChunkSpec::new(vec![COLUMN], 0..opts.num_rows, chunk_size);
    let mut session = ScanSession::open_with_config(store, &table, spec, scan_config).await?;

    let mut sum: i64 = 0;
    while let Some(chunk) = session.next_chunk().await? {
        sum += chunk
            .iter()
            .filter_map(|row| row.first().and_then(Value::as_i64))
            .sum::<i64>();
    }
    session.close();

    let avg = sum as f64 / opts.num_rows as f64;
    tracing::info!(table = %table, rows = opts.num_rows, avg, "Computed column average");

    std::fs::create_dir_all(&opts.out_dir).map_err(|e| {
        CliError::Input(format!("failed to create {}: {e}", opts.out_dir.display()))
    })?;

    let results_path = opts.out_dir.join(RESULTS_FILE);
    let report = format!(
        "This file is generated as a result of running this app\nnumRows = {}\nAverage = {}\nRandom table ID = {}",
        opts.num_rows, avg, table
    );
    write_file(&results_path, &report)?;

    let output = serde_json::json!({
        "rand_table": table.as_str(),
        "col_avg": avg,
        "results_file": results_path.display().to_string(),
    });
    let rendered = serde_json::to_string(&output)?;
    write_file(&opts.out_dir.join(JOB_OUTPUT_FILE), &rendered)?;

    println!("{rendered}");
    Ok(())
}

fn write_file(path: &Path, content: &str) -> CliResult<()> {
    std::fs::write(path, content)
        .map_err(|e| CliError::Input(format!("failed to write {}: {e}", path.display())))
}
