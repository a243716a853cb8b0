mod cli;
mod commands;
mod config;
mod error;
mod input;

use clap::Parser;
use cli::{Cli, Commands};
use error::exit_with_error;

fn init_tracing(cli: &Cli, ansi: bool) {
    // `scan` writes rows and `rand-table` writes its JSON summary to stdout,
    // and `--summary` counts go to stderr. Logs stay off unless asked for with
    // --verbose (RUST_LOG, or info), and always go to stderr.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let color = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());
    if !color {
        colored::control::set_override(false);
    }

    init_tracing(&cli, color);

    if let Err(e) = run(cli).await {
        exit_with_error(e);
    }
}

async fn run(cli: Cli) -> error::CliResult<()> {
    let file_config = config::load_file_config(cli.config.as_deref())?;

    match cli.command {
        Commands::RandTable {
            num_rows,
            input,
            seed,
            chunk_size,
            out_dir,
            scan,
        } => {
            let scan_config = config::resolve_scan_config(&scan, &file_config)?;
            let num_rows = match (num_rows, input) {
                (Some(n), _) => n,
                (None, Some(path)) => input::read_job_input(&path)?.num_rows,
                (None, None) => {
                    return Err(error::CliError::Usage(
                        "--num-rows or --input is required".to_string(),
                    ))
                }
            };
            let opts = commands::rand_table::RandTableOpts {
                num_rows,
                seed,
                chunk_size,
                out_dir,
            };
            commands::rand_table::run(&opts, scan_config).await
        }

        Commands::Scan {
            file,
            columns,
            select,
            start,
            end,
            chunk_size,
            keep_open,
            summary,
            scan,
        } => {
            let scan_config = config::resolve_scan_config(&scan, &file_config)?;
            let opts = commands::scan::ScanOpts {
                file,
                columns,
                select,
                start,
                end,
                chunk_size,
                keep_open,
                summary,
            };
            commands::scan::run(&opts, scan_config).await
        }
    }
}
