use super::ensemble::run_manifest;
use super::thermo::{Evaluation, FileOutcome, RunOutcome, evaluate_file};
use crate::core::io::ProgramKind;
use crate::engine::config::ThermoConfig;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::governor::threads::ThreadBudget;
use crate::engine::progress::{Progress, ProgressReporter};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Processes every input, several at a time, and returns their outcomes in input order.
///
/// A failing file never stops its siblings; the run succeeds only if every file does.
/// Cancellation is checked before each file starts, and files in flight run to completion.
#[instrument(skip_all, name = "thermo_workflow", fields(files = paths.len()))]
pub fn run(paths: &[PathBuf], config: &ThermoConfig, ctx: &RunContext) -> RunOutcome {
    let budget = ThreadBudget::split(ctx.governor.thread_count(), paths.len());
    info!(
        files = paths.len(),
        concurrent_files = budget.outer,
        threads_per_file = budget.inner,
        "Starting thermochemistry run"
    );

    // Scan progress only makes sense when one file owns the display.
    let batch = paths.len() > 1;
    let silent = ProgressReporter::new();
    let scan_reporter = if batch { &silent } else { ctx.reporter };
    if batch {
        ctx.reporter.report(Progress::PhaseStart { name: "Processing files" });
        ctx.reporter.report(Progress::TaskStart {
            total_steps: paths.len() as u64,
        });
    }

    let process = |path: &PathBuf| -> Vec<FileOutcome> {
        let outcomes = process_path(path, config, ctx, budget.inner, scan_reporter);
        for outcome in &outcomes {
            ctx.reporter.report(Progress::FileFinished {
                path: outcome.path.clone(),
                success: outcome.is_success(),
            });
        }
        if batch {
            ctx.reporter.report(Progress::TaskIncrement);
        }
        outcomes
    };
    let nested: Vec<Vec<FileOutcome>> = if budget.outer > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(budget.outer).build() {
            Ok(pool) => pool.install(|| paths.par_iter().map(process).collect()),
            Err(e) => {
                warn!("Could not build a {}-thread file pool ({e}); processing files serially", budget.outer);
                paths.iter().map(process).collect()
            }
        }
    } else {
        paths.iter().map(process).collect()
    };

    if batch {
        ctx.reporter.report(Progress::TaskFinish);
        ctx.reporter.report(Progress::PhaseFinish);
    }
    let outcome = RunOutcome::from_files(nested.into_iter().flatten().collect());
    info!(
        success = outcome.success,
        failed = outcome.files.iter().filter(|f| !f.is_success()).count(),
        "Thermochemistry run finished"
    );
    outcome
}

fn process_path(
    path: &Path,
    config: &ThermoConfig,
    ctx: &RunContext,
    threads: usize,
    reporter: &ProgressReporter,
) -> Vec<FileOutcome> {
    if ctx.cancel.is_cancelled() {
        return vec![FileOutcome::failed(path, EngineError::Cancelled)];
    }
    if ProgramKind::from_extension(path) == Some(ProgramKind::BatchManifest) {
        return run_manifest(path, config, ctx, threads);
    }
    let outcome = match evaluate_file(path, config, ctx, threads, Evaluation::Full, reporter) {
        Ok(report) => FileOutcome::succeeded(report),
        Err(e) => {
            ctx.governor.diagnostics.error(Some(path), e.to_string());
            FileOutcome::failed(path, e)
        }
    };
    vec![outcome]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cancel::CancellationToken;
    use crate::engine::governor::ResourceGovernor;
    use crate::engine::governor::threads::tests::FixedEnvironment;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn checkpoint(frequency: f64, bond: f64) -> String {
        format!(
            "*E\n-113.30\n*wavenum\n{frequency}\n*atoms\nC 12.011 0.0 0.0 0.0\nO 15.999 0.0 0.0 {bond}\n*elevel\n0.0 1\n"
        )
    }

    fn governor(config: &ThermoConfig, cores: usize) -> ResourceGovernor {
        let env = FixedEnvironment {
            physical: cores,
            system_memory_mb: Some(8000),
            ..Default::default()
        };
        ResourceGovernor::new(&config.execution, &env)
    }

    #[test]
    fn outcomes_keep_input_order_and_tolerate_failures() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..4).map(|i| dir.path().join(format!("m{i}.otm"))).collect();
        fs::write(&paths[0], checkpoint(2170.0, 1.128)).unwrap();
        fs::write(&paths[1], "*E\n-1.0\n").unwrap();
        fs::write(&paths[2], checkpoint(2100.0, 1.130)).unwrap();
        fs::write(&paths[3], checkpoint(2000.0, 1.140)).unwrap();

        let config = ThermoConfig::default();
        let governor = governor(&config, 4);
        let cancel = CancellationToken::new();
        let reporter = ProgressReporter::new();
        let outcome = run(&paths, &config, &RunContext::new(&governor, &cancel, &reporter));

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, 1);
        let order: Vec<&PathBuf> = outcome.files.iter().map(|f| &f.path).collect();
        assert_eq!(order, paths.iter().collect::<Vec<_>>());
        assert!(!outcome.files[1].is_success());
        assert!(outcome.files[0].is_success() && outcome.files[2].is_success() && outcome.files[3].is_success());
        let message = outcome.error_message.unwrap();
        assert!(message.contains("m1.otm"));
        assert!(!message.contains("m0.otm"));
        assert_eq!(governor.diagnostics.errors().len(), 1);
    }

    #[test]
    fn cancellation_skips_unstarted_files() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..3).map(|i| dir.path().join(format!("m{i}.otm"))).collect();
        for path in &paths {
            fs::write(path, checkpoint(2170.0, 1.128)).unwrap();
        }
        let config = ThermoConfig::default();
        let governor = governor(&config, 1);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let reporter = ProgressReporter::new();
        let outcome = run(&paths, &config, &RunContext::new(&governor, &cancel, &reporter));
        assert!(outcome.files.iter().all(|f| matches!(f.error, Some(EngineError::Cancelled))));
    }

    #[test]
    fn every_file_reports_when_it_finishes() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..3).map(|i| dir.path().join(format!("m{i}.otm"))).collect();
        for path in &paths {
            fs::write(path, checkpoint(2170.0, 1.128)).unwrap();
        }
        let config = ThermoConfig::default();
        let governor = governor(&config, 2);
        let cancel = CancellationToken::new();
        let finished = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::FileFinished { path, success } = event {
                finished.lock().unwrap().push((path, success));
            }
        }));
        let outcome = run(&paths, &config, &RunContext::new(&governor, &cancel, &reporter));
        drop(reporter);
        assert!(outcome.success);
        let mut finished = finished.into_inner().unwrap();
        finished.sort();
        assert_eq!(finished, paths.iter().map(|p| (p.clone(), true)).collect::<Vec<_>>());
    }

    #[test]
    fn manifest_yields_members_and_an_ensemble_summary() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.otm"), checkpoint(2170.0, 1.128)).unwrap();
        fs::write(dir.path().join("b.otm"), checkpoint(2150.0, 1.131)).unwrap();
        let manifest = dir.path().join("conformers.list");
        fs::write(&manifest, "a.otm\n\n  b.otm  \n").unwrap();

        let config = ThermoConfig::default();
        let governor = governor(&config, 2);
        let cancel = CancellationToken::new();
        let reporter = ProgressReporter::new();
        let outcome = run(&[manifest.clone()], &config, &RunContext::new(&governor, &cancel, &reporter));

        assert!(outcome.success, "{:?}", outcome.error_message);
        assert_eq!(outcome.files.len(), 3);
        assert_eq!(outcome.files[0].path, dir.path().join("a.otm"));
        assert_eq!(outcome.files[1].path, dir.path().join("b.otm"));
        assert_eq!(outcome.files[2].path, manifest);
        assert!(outcome.files[2].report.contains("Boltzmann ensemble"));
        assert!(outcome.output_files.is_empty());
    }
}
