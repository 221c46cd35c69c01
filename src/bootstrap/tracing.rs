//! Tracing configuration for Autopress
//!
//! Installs the global `tracing` subscriber once, from the composition root.
//! Components never own a logger; they emit events through the `tracing`
//! macros and whatever subscriber is installed here receives them.
//!
//! ## Layers
//!
//! - **env filter**: `RUST_LOG` wins, otherwise debug in dev builds and info in release
//! - **stderr**: human-readable lines, so command output on stdout stays clean
//! - **file**: daily rolling file under `<data_dir>/logs`, when that directory can be created

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry};

use ap_core::ports::AppDirsPort;
use ap_core::AppConfig;
use ap_infra::fs::DirsAppDirs;

const LOG_FILE_PREFIX: &str = "autopress.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Check if running in development environment
fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Build the default filter directives for tracing
///
/// Workspace crates follow the build profile; HTTP client internals stay at warn.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let level = if is_dev { "debug" } else { "info" };
    let mut directives = vec![level.to_string()];
    directives.extend(
        ["autopress_lib", "ap_core", "ap_app", "ap_infra"]
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.extend(
        ["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"]
            .iter()
            .map(|d| d.to_string()),
    );
    directives
}

/// Resolve where the log files go for this configuration.
pub fn logs_dir_for(config: &AppConfig) -> anyhow::Result<PathBuf> {
    let app_dirs = DirsAppDirs::from_config(&config.storage).get_app_dirs()?;
    Ok(app_dirs.logs_dir())
}

/// Initialize the tracing subscriber with appropriate configuration
///
/// `logs_dir` enables the rolling file layer. If the directory cannot be
/// created the subscriber still starts with stderr only.
///
/// ## Errors
///
/// Returns `Err` if a subscriber is already registered (call once) or the
/// file guard was already taken by an earlier call.
pub fn init_tracing_subscriber(logs_dir: Option<&Path>) -> anyhow::Result<()> {
    let filter_directives = build_filter_directives(is_development());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter_directives.join(",")));

    let stderr_writer: BoxMakeWriter = BoxMakeWriter::new(io::stderr);
    let file_writer = match logs_dir.map(build_file_writer).transpose() {
        Ok(writer) => writer,
        Err(err) => {
            eprintln!("Failed to initialize file logging, falling back to stderr: {err}");
            None
        }
    };

    // "2026-01-15 10:30:45.123 INFO [file.rs:42] [target] message"
    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(stderr_writer);

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

fn build_file_writer(logs_dir: &Path) -> anyhow::Result<NonBlocking> {
    fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}
