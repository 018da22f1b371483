use anyhow::Result;
use clap::Parser;

use scopemap::cli::Cli;
use scopemap::commands;
use scopemap::config::{self, FileConfig, ScanConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    let file_config = config::load_file_config(cli.config.as_deref(), &cli.path)?;
    let scan_config = build_scan_config(cli, file_config);
    commands::run_scan(scan_config)
}

fn init_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    match verbosity {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    builder.init();
}

/// CLI values extend file values; the flags never silently lose entries.
fn build_scan_config(cli: Cli, file: FileConfig) -> ScanConfig {
    let mut skip = file.scan.skip;
    skip.extend(cli.skip);

    let mut extra_search_paths = file.scan.search_paths;
    extra_search_paths.extend(cli.search_paths);

    ScanConfig {
        root: cli.path,
        skip,
        extra_search_paths,
        parallel: !cli.no_parallel,
        jobs: cli.jobs,
    }
}
