//! `playpause` command line.
//!
//! `playpause` (or `playpause watch`) runs until Ctrl-C; `playpause list`
//! prints every HID interface that can be opened.

use clap::{Parser, Subcommand};
use playpause::backends::hid::HidApiBackend;
use playpause::backends::keys::{system_keys, KeyPresser, LogOnlyKeys};
use playpause::{
    CancelToken, ConfigError, ConnectionSupervisor, DeviceRegistry, RegistryError,
    SupervisorError, WatchConfig,
};
use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::error;

#[derive(Parser)]
#[command(name = "playpause", version)]
#[command(about = "Forwards a headset's play/pause gesture as a media key")]
struct Cli {
    /// Config file path (TOML); missing file means defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target vendor id, hex (e.g. 045E)
    #[arg(long, value_parser = parse_hex_u16)]
    vid: Option<u16>,

    /// Target product id, hex (e.g. 0627)
    #[arg(long, value_parser = parse_hex_u16)]
    pid: Option<u16>,

    /// Seconds between searches while the device is absent
    #[arg(long)]
    retry_delay: Option<u64>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG wins
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Watch for the device and forward gestures (default)
    Watch {
        /// Log media keys instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// List HID interfaces that can be opened
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
    #[error("failed to encode device list: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id {s:?}: {e}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<WatchConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => WatchConfig::load(path)?,
        None => WatchConfig::default(),
    };
    if let Some(vid) = cli.vid {
        config.vendor_id = vid;
    }
    if let Some(pid) = cli.pid {
        config.product_id = pid;
    }
    if let Some(secs) = cli.retry_delay {
        config.retry_delay_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli)?;
    match cli.command.unwrap_or(Command::Watch { dry_run: false }) {
        Command::Watch { dry_run } => watch(config, dry_run),
        Command::List { json } => list(config, json),
    }
}

fn watch(config: WatchConfig, dry_run: bool) -> Result<(), AppError> {
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Cancelling...");
        handler_token.cancel();
    }) {
        tracing::warn!("failed to install Ctrl-C handler: {e}");
    }

    let keys: Box<dyn KeyPresser + Send> = if dry_run {
        Box::new(LogOnlyKeys)
    } else {
        system_keys()
    };

    let backend = HidApiBackend::new()?;
    ConnectionSupervisor::new(backend, keys, config, cancel).run()?;
    println!();
    println!("Cancelled!");
    Ok(())
}

fn list(config: WatchConfig, json: bool) -> Result<(), AppError> {
    let mut registry = DeviceRegistry::new(HidApiBackend::new()?, config.id_query_policy);
    let devices = registry.enumerate()?.collect::<Result<Vec<_>, _>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }
    for device in &devices {
        let marker = if device.matches(config.vendor_id, config.product_id) {
            "*"
        } else {
            " "
        };
        println!("{marker} {device}");
    }
    println!("{} device(s)", devices.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_ids_accept_optional_prefix() {
        assert_eq!(parse_hex_u16("045E"), Ok(0x045E));
        assert_eq!(parse_hex_u16("0x0627"), Ok(0x0627));
        assert!(parse_hex_u16("zz").is_err());
        assert!(parse_hex_u16("10000").is_err());
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cli = Cli::parse_from(["playpause", "--vid", "046d", "--retry-delay", "3", "list"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.vendor_id, 0x046D);
        assert_eq!(config.product_id, 0x0627);
        assert_eq!(config.retry_delay_secs, 3);
        assert!(matches!(cli.command, Some(Command::List { json: false })));
    }

    #[test]
    fn zero_retry_delay_flag_is_rejected() {
        let cli = Cli::parse_from(["playpause", "--retry-delay", "0"]);
        assert!(matches!(
            load_config(&cli),
            Err(ConfigError::Invalid { field: "retry_delay_secs", .. })
        ));
    }
}
