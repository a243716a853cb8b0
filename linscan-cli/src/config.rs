//! Config file loading and scan-setting precedence.
//!
//! Settings resolve as: CLI flag > environment variable > config file >
//! built-in defaults. Flag and environment handling is done by clap (see
//! [`ScanArgs`]); this module layers the file and the defaults underneath.
//!
//! ```toml
//! [scan]
//! prefetch_depth = 4
//! fetch_timeout_ms = 30000
//! allow_open_tables = false
//! ```

use crate::cli::ScanArgs;
use crate::error::{CliError, CliResult};
use linscan_core::scan::DEFAULT_PREFETCH_DEPTH;
use linscan_core::ScanConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "linscan.toml";

/// Top-level config file structure.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub scan: ScanFileConfig,
}

/// `[scan]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanFileConfig {
    pub prefetch_depth: Option<usize>,
    pub fetch_timeout_ms: Option<u64>,
    pub allow_open_tables: Option<bool>,
}

/// Load the config file.
///
/// An explicit `--config` path must exist. Without one, `./linscan.toml` is
/// used when present; otherwise every setting falls back to its default.
pub fn load_file_config(explicit: Option<&Path>) -> CliResult<FileConfig> {
    let path = match explicit {
        Some(p) if p.is_file() => p.to_path_buf(),
        Some(p) => {
            return Err(CliError::Config(format!(
                "config file not found: {}",
                p.display()
            )))
        }
        None => {
            let candidate = Path::new(DEFAULT_CONFIG_FILE);
            if !candidate.is_file() {
                return Ok(FileConfig::default());
            }
            candidate.to_path_buf()
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|e| {
        CliError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let config: FileConfig = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Merge flags/env with the file section into a [`ScanConfig`].
pub fn resolve_scan_config(args: &ScanArgs, file: &FileConfig) -> CliResult<ScanConfig> {
    let prefetch_depth = args
        .prefetch_depth
        .or(file.scan.prefetch_depth)
        .unwrap_or(DEFAULT_PREFETCH_DEPTH);
    if prefetch_depth == 0 {
        return Err(CliError::Usage(
            "prefetch depth must be at least 1".to_string(),
        ));
    }

    let timeout_ms = args.fetch_timeout_ms.or(file.scan.fetch_timeout_ms);
    if timeout_ms == Some(0) {
        return Err(CliError::Usage(
            "fetch timeout must be greater than 0 ms".to_string(),
        ));
    }

    let mut config = ScanConfig::new()
        .with_prefetch_depth(prefetch_depth)
        .with_allow_open_tables(file.scan.allow_open_tables.unwrap_or(false));
    if let Some(ms) = timeout_ms {
        config = config.with_fetch_timeout(Duration::from_millis(ms));
    }
    Ok(config)
}
