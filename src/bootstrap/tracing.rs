//! Tracing setup for the `clipboard-bridge` binary.
//!
//! Logs go to stderr so that command output on stdout stays pipeable. When
//! `[log] directory` is configured, a second layer writes
//! `<directory>/clipboard-bridge.log` through a non-blocking appender.
//!
//! Filter precedence: `RUST_LOG`, then `[log] filter`, then the built-in
//! directives from [`build_filter_directives`].

use std::{fs, io, path::Path, sync::OnceLock};

use anyhow::Context;
use cb_core::LogConfig;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry, EnvFilter};

pub const LOG_FILE_NAME: &str = "clipboard-bridge.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Default filter directives.
///
/// `clipboard_rs` logs every watcher wakeup at debug, so it is capped at warn
/// in both modes.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    vec![
        if is_dev { "debug" } else { "info" }.to_string(),
        "clipboard_rs=warn".to_string(),
        if is_dev { "cb_app=debug" } else { "cb_app=info" }.to_string(),
        if is_dev {
            "cb_platform=debug"
        } else {
            "cb_platform=info"
        }
        .to_string(),
    ]
}

fn build_env_filter(log: &LogConfig) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    match log.filter.as_deref() {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log filter in config: {directives}")),
        None => Ok(EnvFilter::new(
            build_filter_directives(is_development()).join(","),
        )),
    }
}

/// Install the global subscriber. Call once, before anything logs.
///
/// ## Behavior / 行为
///
/// - **Development**: debug level for the workspace crates
/// - **Production**: info level
/// - **Output**: stderr, plus `<directory>/clipboard-bridge.log` when
///   `[log] directory` is set
///
/// # Errors
///
/// Fails when the configured filter does not parse or a global subscriber is
/// already registered. A log directory that cannot be created only disables
/// the file layer.
pub fn init_tracing_subscriber(log: &LogConfig) -> anyhow::Result<()> {
    let env_filter = build_env_filter(log)?;

    let stderr_writer: BoxMakeWriter = BoxMakeWriter::new(io::stderr);
    let file_writer = match log.directory.as_deref().map(build_file_writer) {
        Some(Ok(writer)) => Some(writer),
        Some(Err(err)) => {
            eprintln!("Failed to initialize file logging, falling back to stderr: {err:#}");
            None
        }
        None => None,
    };

    // "2025-01-15 10:30:45.123 INFO [file.rs:42] [target] message"
    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(stderr_writer);

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(
                "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            ))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    let subscriber = registry().with(env_filter).with(stderr_layer);
    if let Some(layer) = file_layer {
        subscriber.with(layer).try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}

fn build_file_writer(directory: &Path) -> anyhow::Result<NonBlocking> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;

    let file_appender = tracing_appender::rolling::never(directory, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}
