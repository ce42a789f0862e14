//! Command-line driver for rental data management.
//!
//! # Responsibility
//! - Warm repositories from the configured data directory and compare
//!   loading strategies.
//! - Flush warmed collections back to disk, import cars, print reports.

mod commands;

use anyhow::{anyhow, Result};
use clap::Parser;
use commands::{Flush, ImportCars, Load, Report};
use rental_core::{default_log_level, init_logging, init_stderr_logging, AppConfig, DataFormat};
use std::path::PathBuf;

/// Car rental data tools
#[derive(Parser)]
#[command(name = "rental")]
#[command(about = "Load, inspect and persist car rental data", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML or JSON config file
    #[arg(long, global = true, env = "RENTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(long, global = true, env = "RENTAL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Data format for reading (json|yaml)
    #[arg(long, global = true)]
    format: Option<DataFormat>,

    /// Absolute directory for rotating log files; logs go to stderr otherwise
    #[arg(long, global = true, env = "RENTAL_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "RENTAL_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load all collections with one or every strategy
    Load(Load),

    /// Load all collections and write them back
    Flush(Flush),

    /// Print car, rental and payment reports
    Report(Report),

    /// Import cars from a comma-separated file into the car collection
    ImportCars(ImportCars),
}

/// Settings shared by every command.
pub struct Context {
    pub config: AppConfig,
    pub format: DataFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let level = cli
        .log_level
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| default_log_level().to_string());
    let logging = match &cli.log_dir {
        Some(dir) => init_logging(&level, dir),
        None => init_stderr_logging(&level),
    };
    logging.map_err(|err| anyhow!(err))?;

    let format = cli.format.unwrap_or(config.default_format);
    let context = Context { config, format };

    match cli.command {
        Command::Load(cmd) => cmd.execute(&context),
        Command::Flush(cmd) => cmd.execute(&context),
        Command::Report(cmd) => cmd.execute(&context),
        Command::ImportCars(cmd) => cmd.execute(&context),
    }
}
