use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt::{self},
    prelude::*,
    util::TryInitError,
};

/// Tracing targets of the library and of this binary.
const THERMOKIT_TARGETS: [&str; 2] = ["thermokit", "thermokit_cli"];

/// Console level for the `-v` count; `-q` silences everything but errors.
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// ThermoKit events at `level`; other crates (rayon, tokio) never below WARN.
pub fn targets_for(level: LevelFilter) -> Targets {
    THERMOKIT_TARGETS
        .into_iter()
        .fold(Targets::new().with_default(level.min(LevelFilter::WARN)), |targets, target| {
            targets.with_target(target, level)
        })
}

/// Installs the global subscriber: a compact stderr layer plus an optional plain-text file
/// layer. The file always records at least DEBUG so a quiet run can still be diagnosed.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level = level_for(verbosity, quiet);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(targets_for(level));
    let subscriber = tracing_subscriber::registry().with(stderr_layer);
    let install_failed = |e: TryInitError| CliError::Other(anyhow::anyhow!("Failed to install logger: {e}"));

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(CliError::Io)?;
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_target(true)
                .with_filter(targets_for(level.max(LevelFilter::DEBUG)));
            subscriber.with(file_layer).try_init().map_err(install_failed)
        }
        None => subscriber.try_init().map_err(install_failed),
    }
}
