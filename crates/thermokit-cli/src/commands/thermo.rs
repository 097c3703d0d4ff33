use crate::cli::ThermoArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use thermokit::engine::cancel::CancellationToken;
use thermokit::engine::context::RunContext;
use thermokit::engine::governor::ResourceGovernor;
use thermokit::engine::governor::threads::SystemJobEnvironment;
use thermokit::engine::progress::ProgressReporter;
use thermokit::workflows::{self, RunOutcome};
use tracing::{info, warn};

pub async fn run(
    args: ThermoArgs,
    threads: Option<usize>,
    quiet: bool,
    cancel: CancellationToken,
) -> Result<()> {
    info!("Resolving settings...");
    let config = config::build_config(&args, threads)?;
    let governor = ResourceGovernor::new(&config.execution, &SystemJobEnvironment);

    let progress_handler = if quiet || config.output.print_level == 0 {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let ctx = RunContext::new(&governor, &cancel, &reporter);

    info!(files = args.files.len(), "Invoking the thermochemistry workflow...");
    let outcome = tokio::task::block_in_place(|| workflows::run(&args.files, &config, &ctx));

    for file in &outcome.files {
        if !file.report.is_empty() {
            println!("{}", file.report);
        }
    }

    for diagnostic in governor.diagnostics.warnings() {
        warn!("{}", diagnostic);
        if !quiet {
            eprintln!("Warning: {diagnostic}");
        }
    }

    if config.output.print_level > 0 && !outcome.output_files.is_empty() {
        println!("Files written:");
        for path in &outcome.output_files {
            println!("  {}", path.display());
        }
    }

    if cancel.is_cancelled() {
        warn!("Run was interrupted; remaining inputs were skipped.");
    }

    finish(outcome)
}

fn finish(outcome: RunOutcome) -> Result<()> {
    if outcome.success {
        return Ok(());
    }
    let failed = outcome.files.iter().filter(|f| !f.is_success()).count();
    Err(CliError::RunFailed {
        failed,
        total: outcome.files.len(),
        details: outcome.error_message.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use thermokit::engine::error::EngineError;
    use thermokit::workflows::FileOutcome;

    #[test]
    fn successful_outcome_finishes_cleanly() {
        let outcome = RunOutcome::from_files(Vec::new());
        assert!(finish(outcome).is_ok());
    }

    #[test]
    fn failures_are_counted_and_detailed() {
        let failed = FileOutcome::failed(Path::new("b.log"), EngineError::NoAtomsLoaded);
        let outcome = RunOutcome::from_files(vec![failed]);
        match finish(outcome) {
            Err(CliError::RunFailed {
                failed,
                total,
                details,
            }) => {
                assert_eq!((failed, total), (1, 1));
                assert!(details.contains("b.log"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
