//! Command-line interface definitions for the `cyhy-config` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::level_filters::LevelFilter;



/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "cyhy-config",
    author,
    about = "Finds, loads and validates the CyHy configuration.",
    version
)]
pub struct CLIArgs {
    /// This is the path to the configuration file to use.
    /// If unspecified (or missing), the default locations are searched.
    #[arg(
        value_name = "CONFIG_FILE",
        help = "Path to the configuration file. If unspecified or missing, CYHY_CONFIG_PATH, \
                ./cyhy.toml, ~/.cyhy/cyhy.toml and /etc/cyhy.toml are tried in that order."
    )]
    pub configuration_file_path: Option<PathBuf>,

    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value_t = LogLevel::Info,
        help = "Set the logging level."
    )]
    pub log_level: LogLevel,
}


#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    #[value(alias = "critical")]
    Error,
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}
