use super::config::{ConditionsConfig, ScanStrategy};
use super::error::EngineError;
use super::governor::memory::MemoryMonitor;
use super::progress::{Progress, ProgressReporter};
use crate::core::thermo::calculator::{Conditions, ModeReduction, ThermoCalculator, ThermoResult};
use crate::core::thermo::contribution::ModeContribution;
use rayon::prelude::*;
use std::mem::size_of;
use tracing::{debug, info, warn};

/// Below this many modes a single point is too cheap to split across threads.
const PER_MODE_MIN_MODES: usize = 256;

/// The (T, P) points of a run: temperature outer, pressure inner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanGrid {
    temperatures: Vec<f64>,
    pressures: Vec<f64>,
}

impl ScanGrid {
    pub fn new(temperatures: Vec<f64>, pressures: Vec<f64>) -> Self {
        Self {
            temperatures,
            pressures,
        }
    }

    pub fn from_conditions(conditions: &ConditionsConfig) -> Self {
        let temperatures = match &conditions.temperature_scan {
            Some(range) => range.values().collect(),
            None => vec![conditions.temperature],
        };
        let pressures = match &conditions.pressure_scan {
            Some(range) => range.values().collect(),
            None => vec![conditions.pressure],
        };
        Self::new(temperatures, pressures)
    }

    pub fn single(conditions: Conditions) -> Self {
        Self::new(vec![conditions.temperature], vec![conditions.pressure])
    }

    pub fn len(&self) -> usize {
        self.temperatures.len().saturating_mul(self.pressures.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> Vec<Conditions> {
        self.temperatures
            .iter()
            .flat_map(|&t| self.pressures.iter().map(move |&p| Conditions::new(t, p)))
            .collect()
    }
}

/// Resolves [`ScanStrategy::Auto`]; explicit strategies are kept unless only one thread exists.
pub fn select_strategy(requested: ScanStrategy, points: usize, modes: usize, threads: usize) -> ScanStrategy {
    if threads <= 1 {
        return ScanStrategy::Serial;
    }
    match requested {
        ScanStrategy::Auto => {
            if points >= threads {
                ScanStrategy::GridPoints
            } else if modes >= PER_MODE_MIN_MODES {
                ScanStrategy::PerMode
            } else if points > 1 {
                ScanStrategy::GridPoints
            } else {
                ScanStrategy::Serial
            }
        }
        explicit => explicit,
    }
}

/// Estimated bytes held by the buffered results of a scan.
pub fn estimate_scan_bytes(points: usize, modes: usize) -> u64 {
    let per_point = (modes as u64)
        .saturating_mul(size_of::<ModeContribution>() as u64)
        .saturating_add(size_of::<ThermoResult>() as u64);
    (points as u64).saturating_mul(per_point)
}

/// Evaluates every grid point and returns the results in grid order.
///
/// Memory for the buffered results is reserved before any point is enumerated and held until
/// the results are returned.
pub fn run_scan(
    calculator: &ThermoCalculator,
    grid: &ScanGrid,
    strategy: ScanStrategy,
    threads: usize,
    memory: &MemoryMonitor,
    reporter: &ProgressReporter,
) -> Result<Vec<ThermoResult>, EngineError> {
    let _reservation = memory.try_reserve(estimate_scan_bytes(grid.len(), calculator.mode_count()))?;
    let points = grid.points();
    let strategy = select_strategy(strategy, points.len(), calculator.mode_count(), threads);
    info!(
        points = points.len(),
        modes = calculator.mode_count(),
        ?strategy,
        threads,
        "Running scan"
    );

    reporter.report(Progress::TaskStart {
        total_steps: points.len() as u64,
    });
    let evaluate = |point: &Conditions, reduction: ModeReduction| {
        let result = calculator.evaluate_with(*point, reduction);
        reporter.report(Progress::TaskIncrement);
        result
    };
    let run = || -> Vec<ThermoResult> {
        match strategy {
            ScanStrategy::GridPoints => points
                .par_iter()
                .map(|p| evaluate(p, ModeReduction::Sequential))
                .collect(),
            ScanStrategy::PerMode => points
                .iter()
                .map(|p| evaluate(p, ModeReduction::Parallel))
                .collect(),
            ScanStrategy::Serial | ScanStrategy::Auto => points
                .iter()
                .map(|p| evaluate(p, ModeReduction::Sequential))
                .collect(),
        }
    };

    let results = if strategy == ScanStrategy::Serial {
        run()
    } else {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!("Could not build a {threads}-thread scan pool ({e}); using the global pool");
                run()
            }
        }
    };
    reporter.report(Progress::TaskFinish);
    debug!(rows = results.len(), "Scan complete");
    Ok(results)
}
