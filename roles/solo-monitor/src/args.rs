//! Command-line arguments for the monitor binary.
use clap::Parser;
use solo_monitor::{Config, MonitorError};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Solo mining stats monitor", long_about = None)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to the TOML configuration file (optional, defaults apply when missing)",
        default_value = "solo-monitor.toml"
    )]
    pub config_path: PathBuf,
    #[arg(
        short = 'a',
        long = "address",
        help = "BTC address to monitor. Overrides the last used and the configured default address."
    )]
    pub address: Option<String>,
    #[arg(
        short = 'f',
        long = "log-file",
        help = "Path to the log file. If not set, warnings and errors go to stderr."
    )]
    pub log_file: Option<PathBuf>,
    #[arg(
        short = 'd',
        long = "data-dir",
        help = "Directory for persisted share history and last address"
    )]
    pub data_dir: Option<PathBuf>,
}

/// Parse the command line and load the config it points at
pub fn process_cli_args() -> Result<(Args, Config), MonitorError> {
    let args = Args::parse();

    let config_path = args.config_path.to_str().ok_or_else(|| {
        error!("Invalid configuration path.");
        MonitorError::InvalidConfig(format!(
            "config path is not valid UTF-8: {}",
            args.config_path.display()
        ))
    })?;

    let mut config = Config::load(config_path)?;
    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    Ok((args, config))
}
