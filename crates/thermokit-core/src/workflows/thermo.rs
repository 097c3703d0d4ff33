use crate::core::io::{LoadError, ProgramKind};
use crate::core::models::record::MolecularRecord;
use crate::core::thermo::calculator::{Conditions, ThermoCalculator};
use crate::core::thermo::{ThermoResult, ThermoSystem};
use crate::engine::config::ThermoConfig;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::output::{write_mode_table, write_scan_tables};
use crate::engine::prepare::{build_treatment, prepare_system};
use crate::engine::progress::ProgressReporter;
use crate::engine::report::{ReportSettings, render_report};
use crate::engine::scan::{ScanGrid, run_scan};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// How much of the pipeline a file goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Scan tables when a range is configured, a console report otherwise.
    Full,
    /// One point at the configured conditions, no tables.
    SinglePoint,
}

/// What one input file produced.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub program: ProgramKind,
    pub system: ThermoSystem,
    pub results: Vec<ThermoResult>,
    pub output_files: Vec<PathBuf>,
    pub report: String,
}

/// Loads `path` with the loader of its detected program, holding a file handle meanwhile.
pub fn load_record(path: &Path, ctx: &RunContext) -> Result<MolecularRecord, EngineError> {
    if !path.is_file() {
        return Err(EngineError::InputNotFound(path.to_path_buf()));
    }
    let _handle = ctx.governor.files.acquire();
    let kind = ProgramKind::detect(path).map_err(|e| EngineError::load(path, LoadError::Io(e)))?;
    let loader = kind
        .loader()
        .ok_or_else(|| EngineError::UnsupportedFormat(path.to_path_buf()))?;
    debug!(program = %kind, "Loading {}", path.display());
    loader.load(path).map_err(|e| EngineError::load(path, e))
}

/// Runs one input through loading, preparation and evaluation.
///
/// `threads` bounds the scan parallelism of this file; `reporter` receives the scan progress.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn evaluate_file(
    path: &Path,
    config: &ThermoConfig,
    ctx: &RunContext,
    threads: usize,
    evaluation: Evaluation,
    reporter: &ProgressReporter,
) -> Result<FileReport, EngineError> {
    let record = load_record(path, ctx)?;
    let program = record.program;
    if record.atom_count() > 1 && record.frequency_count() == 0 {
        let message = "No vibrational frequencies were loaded; vibrational terms are zero".to_string();
        warn!("{}: {message}", path.display());
        ctx.governor.diagnostics.warning(Some(path), message);
    }

    let diagnostics = &ctx.governor.diagnostics;
    let prepared = prepare_system(record, config, path, diagnostics)?;
    let treatment = build_treatment(config, Some(path), diagnostics);
    let calculator = ThermoCalculator::new(&prepared.system, treatment, &config.scaling)
        .with_condensed_phase(config.condensed_phase);

    let mut output_files: Vec<PathBuf> = prepared.checkpoint.iter().cloned().collect();
    let scanning = evaluation == Evaluation::Full && config.conditions.is_scan();
    let (results, report) = if scanning {
        let grid = ScanGrid::from_conditions(&config.conditions);
        let results = run_scan(
            &calculator,
            &grid,
            config.execution.strategy,
            threads,
            &ctx.governor.memory,
            reporter,
        )?;
        let tables = write_scan_tables(path, config.output.output_dir.as_deref(), &results)?;
        let report = if config.output.print_level > 0 {
            let names: Vec<String> = tables.iter().map(|p| p.display().to_string()).collect();
            format!(" Scan of {} points written to {}\n", results.len(), names.join(" and "))
        } else {
            String::new()
        };
        output_files.extend(tables);
        (results, report)
    } else {
        let conditions = Conditions::new(config.conditions.temperature, config.conditions.pressure);
        let result = calculator.evaluate(conditions);
        let settings = ReportSettings {
            print_level: config.output.print_level,
            treatment: calculator.treatment_name(),
            scaling: &config.scaling,
            condensed_phase: config.condensed_phase,
        };
        let report = render_report(&prepared.system, &result, &settings);
        (vec![result], report)
    };
    drop(calculator);

    if evaluation == Evaluation::Full && config.output.write_mode_contributions {
        let wavenumbers: Vec<f64> = prepared.system.vibrational_modes().collect();
        let table = write_mode_table(path, config.output.output_dir.as_deref(), &wavenumbers, &results)?;
        output_files.push(table);
    }

    info!(program = %program, points = results.len(), "Finished {}", path.display());
    Ok(FileReport {
        path: path.to_path_buf(),
        program,
        system: prepared.system,
        results,
        output_files,
        report,
    })
}

/// Result of one input of an invocation, successful or not.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub output_files: Vec<PathBuf>,
    pub report: String,
    pub results: Vec<ThermoResult>,
    pub error: Option<EngineError>,
}

impl FileOutcome {
    pub fn succeeded(report: FileReport) -> Self {
        Self {
            path: report.path,
            output_files: report.output_files,
            report: report.report,
            results: report.results,
            error: None,
        }
    }

    pub fn failed(path: &Path, error: EngineError) -> Self {
        Self {
            path: path.to_path_buf(),
            output_files: Vec::new(),
            report: String::new(),
            results: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// `File <path>: <error>` for a failed input.
    pub fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("File {}: {e}", self.path.display()))
    }
}

/// Result of a whole invocation, in input order.
#[derive(Debug)]
pub struct RunOutcome {
    pub success: bool,
    pub error_message: Option<String>,
    pub output_files: Vec<PathBuf>,
    pub exit_code: i32,
    pub files: Vec<FileOutcome>,
}

impl RunOutcome {
    pub fn from_files(files: Vec<FileOutcome>) -> Self {
        let errors: Vec<String> = files.iter().filter_map(FileOutcome::error_message).collect();
        let output_files = files.iter().flat_map(|f| f.output_files.iter().cloned()).collect();
        let success = errors.is_empty();
        Self {
            success,
            error_message: (!success).then(|| errors.join("\n")),
            output_files,
            exit_code: if success { 0 } else { 1 },
            files,
        }
    }
}
