//! Manifest processing: one single point per listed file, then a Boltzmann-weighted summary.

use super::thermo::{Evaluation, FileOutcome, evaluate_file};
use crate::core::constants::{GAS_CONSTANT, HARTREE_TO_KJ_PER_MOL};
use crate::core::io::LoadError;
use crate::core::thermo::ThermoResult;
use crate::core::thermo::calculator::{to_cal, to_kcal};
use crate::engine::config::ThermoConfig;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use rayon::prelude::*;
use std::fmt::{self, Write};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Reads the non-empty, trimmed lines of a manifest. Relative entries resolve against the
/// manifest's directory.
pub fn read_manifest(path: &Path) -> Result<Vec<PathBuf>, EngineError> {
    if !path.is_file() {
        return Err(EngineError::InputNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| EngineError::load(path, LoadError::Io(e)))?;
    let base = path.parent().unwrap_or(Path::new(""));
    let entries: Vec<PathBuf> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| base.join(line))
        .collect();
    if entries.is_empty() {
        return Err(EngineError::load(
            path,
            LoadError::Inconsistency("the file list contains no paths".to_string()),
        ));
    }
    Ok(entries)
}

/// Normalized Boltzmann weights of free energies given in Hartree.
pub fn boltzmann_weights(free_energies: &[f64], temperature: f64) -> Vec<f64> {
    let Some(minimum) = free_energies.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let rt = GAS_CONSTANT * temperature;
    let factors: Vec<f64> = free_energies
        .iter()
        .map(|g| (-(g - minimum) * HARTREE_TO_KJ_PER_MOL * 1000.0 / rt).exp())
        .collect();
    let total: f64 = factors.iter().sum();
    factors.into_iter().map(|f| f / total).collect()
}

#[derive(Debug, Clone)]
pub struct EnsembleMember {
    pub path: PathBuf,
    pub result: ThermoResult,
    pub weight: f64,
}

/// Members weighted by their total Gibbs energies at the configured temperature.
#[derive(Debug, Clone)]
pub struct EnsembleSummary {
    pub temperature: f64,
    pub members: Vec<EnsembleMember>,
}

impl EnsembleSummary {
    pub fn new(members: Vec<(PathBuf, ThermoResult)>, temperature: f64) -> Self {
        let energies: Vec<f64> = members.iter().map(|(_, r)| r.g_total()).collect();
        let weights = boltzmann_weights(&energies, temperature);
        let members = members
            .into_iter()
            .zip(weights)
            .map(|((path, result), weight)| EnsembleMember { path, result, weight })
            .collect();
        Self { temperature, members }
    }

    pub fn weighted(&self, quantity: impl Fn(&ThermoResult) -> f64) -> f64 {
        self.members.iter().map(|m| m.weight * quantity(&m.result)).sum()
    }

    /// `-R Σ w ln w` in J/(mol·K).
    pub fn mixing_entropy(&self) -> f64 {
        -GAS_CONSTANT
            * self
                .members
                .iter()
                .filter(|m| m.weight > 0.0)
                .map(|m| m.weight * m.weight.ln())
                .sum::<f64>()
    }

    /// Ensemble free energy `G_min − RT ln Σ exp(−ΔG/RT)` in Hartree.
    pub fn free_energy(&self) -> f64 {
        let Some(minimum) = self.members.iter().map(|m| m.result.g_total()).reduce(f64::min) else {
            return 0.0;
        };
        let rt_hartree = GAS_CONSTANT * self.temperature / 1000.0 / HARTREE_TO_KJ_PER_MOL;
        let sum: f64 = self
            .members
            .iter()
            .map(|m| (-(m.result.g_total() - minimum) / rt_hartree).exp())
            .sum();
        minimum - rt_hartree * sum.ln()
    }
}

pub fn write_ensemble_summary(out: &mut impl Write, summary: &EnsembleSummary) -> fmt::Result {
    writeln!(out, " Boltzmann ensemble at T = {:.3} K", summary.temperature)?;
    writeln!(
        out,
        " {:>4} {:>10} {:>17} {:>17}  {}",
        "#", "Weight(%)", "H(a.u.)", "G(a.u.)", "File"
    )?;
    for (i, m) in summary.members.iter().enumerate() {
        writeln!(
            out,
            " {:>4} {:10.3} {:17.6} {:17.6}  {}",
            i + 1,
            m.weight * 100.0,
            m.result.h_total(),
            m.result.g_total(),
            m.path.display()
        )?;
    }
    writeln!(out, " Weighted U:              {:17.6} a.u.", summary.weighted(ThermoResult::u_total))?;
    writeln!(out, " Weighted H:              {:17.6} a.u.", summary.weighted(ThermoResult::h_total))?;
    writeln!(out, " Weighted G:              {:17.6} a.u.", summary.weighted(ThermoResult::g_total))?;
    writeln!(out, " Ensemble G:              {:17.6} a.u.", summary.free_energy())?;
    writeln!(
        out,
        " Weighted S:              {:13.3} cal/mol/K",
        to_cal(summary.weighted(ThermoResult::entropy))
    )?;
    writeln!(
        out,
        " Weighted CV:             {:13.3} cal/mol/K",
        to_cal(summary.weighted(ThermoResult::heat_capacity_v))
    )?;
    writeln!(out, " Mixing entropy:          {:13.3} cal/mol/K", to_cal(summary.mixing_entropy()))?;
    writeln!(
        out,
        " Ensemble G correction:   {:13.3} kcal/mol",
        to_kcal((summary.free_energy() - summary.weighted(|r| r.electronic_energy)) * HARTREE_TO_KJ_PER_MOL)
    )
}

/// Evaluates every file of a manifest at the configured conditions.
///
/// Returns one outcome per listed file in manifest order, followed by an outcome for the
/// manifest itself carrying the ensemble summary. Failed members are left out of the summary.
#[instrument(skip_all, fields(manifest = %manifest.display()))]
pub fn run_manifest(manifest: &Path, config: &ThermoConfig, ctx: &RunContext, threads: usize) -> Vec<FileOutcome> {
    let entries = match read_manifest(manifest) {
        Ok(entries) => entries,
        Err(e) => {
            ctx.governor.diagnostics.error(Some(manifest), e.to_string());
            return vec![FileOutcome::failed(manifest, e)];
        }
    };
    info!(files = entries.len(), "Processing file list");

    let silent = ProgressReporter::new();
    let evaluate = |path: &PathBuf| -> FileOutcome {
        if ctx.cancel.is_cancelled() {
            return FileOutcome::failed(path, EngineError::Cancelled);
        }
        match evaluate_file(path, config, ctx, 1, Evaluation::SinglePoint, &silent) {
            Ok(report) => FileOutcome::succeeded(report),
            Err(e) => {
                ctx.governor.diagnostics.error(Some(path), e.to_string());
                FileOutcome::failed(path, e)
            }
        }
    };
    let mut outcomes: Vec<FileOutcome> = if threads > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| entries.par_iter().map(evaluate).collect()),
            Err(e) => {
                warn!("Could not build a {threads}-thread pool ({e}); processing the list serially");
                entries.iter().map(evaluate).collect()
            }
        }
    } else {
        entries.iter().map(evaluate).collect()
    };

    let members: Vec<(PathBuf, ThermoResult)> = outcomes
        .iter()
        .filter_map(|o| o.results.first().map(|r| (o.path.clone(), r.clone())))
        .collect();
    if members.is_empty() {
        warn!("No file of {} could be evaluated", manifest.display());
        return outcomes;
    }
    let summary = EnsembleSummary::new(members, config.conditions.temperature);
    let mut report = String::new();
    if config.output.print_level > 0 && write_ensemble_summary(&mut report, &summary).is_err() {
        report.clear();
    }
    outcomes.push(FileOutcome {
        path: manifest.to_path_buf(),
        output_files: Vec::new(),
        report,
        results: Vec::new(),
        error: None,
    });
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::thermo::calculator::Conditions;
    use crate::core::thermo::contribution::{Component, ModeContribution};
    use tempfile::tempdir;

    fn result_with_energy(electronic_energy: f64) -> ThermoResult {
        ThermoResult {
            conditions: Conditions::new(298.15, 1.0),
            electronic_energy,
            translation: Component::default(),
            rotation: Component::default(),
            vibration: ModeContribution::default(),
            electronic: Component::default(),
            modes: Vec::new(),
        }
    }

    #[test]
    fn manifest_skips_blank_lines_and_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("confs.list");
        fs::write(&manifest, "  a.log \n\n\t\nsub/b.out\n/abs/c.log\n").unwrap();
        let entries = read_manifest(&manifest).unwrap();
        assert_eq!(
            entries,
            vec![
                dir.path().join("a.log"),
                dir.path().join("sub/b.out"),
                PathBuf::from("/abs/c.log"),
            ]
        );
    }

    #[test]
    fn empty_manifest_is_a_load_failure() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("empty.txt");
        fs::write(&manifest, "\n   \n").unwrap();
        assert!(matches!(read_manifest(&manifest), Err(EngineError::LoadFailure { .. })));
    }

    #[test]
    fn equal_energies_share_weight_equally() {
        let weights = boltzmann_weights(&[-1.0, -1.0, -1.0, -1.0], 298.15);
        assert!(weights.iter().all(|w| (w - 0.25).abs() < 1e-12));
    }

    #[test]
    fn one_kcal_gap_follows_boltzmann_ratio() {
        let gap = 4.184 / HARTREE_TO_KJ_PER_MOL;
        let weights = boltzmann_weights(&[-1.0, -1.0 + gap], 298.15);
        let expected_ratio = (-4184.0 / (GAS_CONSTANT * 298.15)).exp();
        assert!((weights[1] / weights[0] - expected_ratio).abs() < 1e-9);
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_pair_lowers_free_energy_by_rt_ln_two() {
        let member = result_with_energy(-10.0);
        let g = member.g_total();
        let summary = EnsembleSummary::new(
            vec![(PathBuf::from("a"), member.clone()), (PathBuf::from("b"), member)],
            298.15,
        );
        let rt_hartree = GAS_CONSTANT * 298.15 / 1000.0 / HARTREE_TO_KJ_PER_MOL;
        // H carries RT even with every component zero.
        assert!((g - (-10.0 + rt_hartree)).abs() < 1e-12);
        assert!((summary.free_energy() - (g - rt_hartree * 2f64.ln())).abs() < 1e-12);
        assert!((summary.mixing_entropy() - GAS_CONSTANT * 2f64.ln()).abs() < 1e-9);
        assert!((summary.weighted(ThermoResult::g_total) - g).abs() < 1e-12);
    }
}
