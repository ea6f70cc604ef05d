//! Command line options

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::store::DEFAULT_FILE;

#[derive(Debug, Parser)]
#[command(name = "xdo", version, about = "xDo - A simple task manager")]
pub struct Cli {
    /// Task file to load and save
    #[arg(short = 'f', long = "file", default_value = DEFAULT_FILE)]
    pub file: PathBuf,

    /// Write logs to this file (logging is off without it)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Minimum level written to the log file
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
