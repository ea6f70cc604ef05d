//! Tracing subscriber setup
//!
//! The terminal is in raw mode while the app runs, so log output only ever
//! goes to a file.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init(log_file_path: &Path, level: tracing::Level) -> Result<()> {
    let log_file = File::create(log_file_path)
        .with_context(|| format!("failed to create log file {}", log_file_path.display()))?;

    tracing_subscriber::registry()
        .with(build_layer(log_file))
        .with(EnvFilter::default().add_directive(level.into()))
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

fn build_layer<S>(log_file: File) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_target(false)
}
