use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod report;

use commands::archive::{handle_archive_command, ArchiveArgs};
use commands::batch::{handle_batch_command, BatchArgs};
use commands::convert::{handle_convert_command, ConvertArgs};
use config::{Config, CONFIG_PATH_ENV};

#[derive(Parser, Debug)]
#[command(author, version, about = "Normalize Garmin TCX activity files", long_about = None)]
struct Cli {
    /// TOML config file (also read from TCX_CONVERT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a single TCX file and print its summary
    Convert(ConvertArgs),
    /// Convert every .tcx member of a ZIP archive into a new archive
    Archive(ArchiveArgs),
    /// Convert every .tcx file under a directory
    Batch(BatchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
    let config = Config::load(config_path.as_deref())?;
    info!(
        max_input_bytes = config.max_input_bytes,
        jobs = config.jobs,
        "configuration loaded"
    );

    match cli.command {
        Command::Convert(args) => handle_convert_command(args, &config),
        Command::Archive(args) => handle_archive_command(args, &config),
        Command::Batch(args) => handle_batch_command(args, &config).await,
    }
}
