use crate::core::thermo::treatment::{BavPreset, FrequencyScaling, TreatmentKind, TreatmentParameters};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Floating-point slack when counting scan points, so `200..=400 step 25` yields 9 points.
const SCAN_COUNT_TOLERANCE: f64 = 1e-9;

/// Largest number of (T, P) points a scan may have, per axis and over the whole grid.
pub const MAX_SCAN_POINTS: usize = 1_000_000;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },

    #[error("Invalid {axis} scan {low} -> {high} step {step}: {reason}")]
    InvalidScan {
        axis: &'static str,
        low: f64,
        high: f64,
        step: f64,
        reason: &'static str,
    },
}

/// Which mass each atom carries into the inertia and translational terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MassMode {
    /// Element average atomic weight.
    #[default]
    Average,
    /// Most abundant isotope.
    Isotope,
    /// The mass printed by the program, falling back to the average weight.
    Reported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStrategy {
    #[default]
    Auto,
    /// Grid points in parallel, modes summed sequentially within each point.
    GridPoints,
    /// Grid points one after another, modes evaluated in parallel.
    PerMode,
    Serial,
}

/// An inclusive `low..=high` range walked in `step` increments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRange {
    pub low: f64,
    pub high: f64,
    pub step: f64,
}

impl ScanRange {
    pub fn new(low: f64, high: f64, step: f64) -> Self {
        Self { low, high, step }
    }

    /// Inclusive point count in floating point, so oversized ranges can be detected.
    fn span_points(&self) -> f64 {
        ((self.high - self.low) / self.step + SCAN_COUNT_TOLERANCE).floor() + 1.0
    }

    /// Number of points, saturating at [`MAX_SCAN_POINTS`] for ranges that never validated.
    pub fn count(&self) -> usize {
        let points = self.span_points();
        if points.is_nan() || points < 1.0 {
            1
        } else if points >= MAX_SCAN_POINTS as f64 {
            MAX_SCAN_POINTS
        } else {
            points as usize
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count()).map(move |i| self.low + i as f64 * self.step)
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigError> {
        let fail = |reason| ConfigError::InvalidScan {
            axis,
            low: self.low,
            high: self.high,
            step: self.step,
            reason,
        };
        if !(self.low.is_finite() && self.high.is_finite() && self.step.is_finite()) {
            return Err(fail("bounds must be finite"));
        }
        if self.step <= 0.0 {
            return Err(fail("step must be positive"));
        }
        if self.high < self.low {
            return Err(fail("upper bound is below lower bound"));
        }
        if self.low <= 0.0 {
            return Err(fail("values must be positive"));
        }
        if !(self.span_points() <= MAX_SCAN_POINTS as f64) {
            return Err(fail("too many points"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionsConfig {
    /// Kelvin; used when no temperature scan is set.
    pub temperature: f64,
    /// Atmospheres; used when no pressure scan is set.
    pub pressure: f64,
    pub temperature_scan: Option<ScanRange>,
    pub pressure_scan: Option<ScanRange>,
}

impl ConditionsConfig {
    pub fn is_scan(&self) -> bool {
        self.temperature_scan.is_some() || self.pressure_scan.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LowFrequencyConfig {
    pub treatment: TreatmentKind,
    /// Truhlar raise-to wavenumber, cm⁻¹.
    pub raise_threshold: f64,
    /// Interpolation threshold of the free-rotor schemes, cm⁻¹.
    pub interpolation_threshold: f64,
    pub bav: BavPreset,
    /// Head-Gordon only.
    pub interpolate_energy: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Console report detail, 0 (silent) to 3 (per-mode).
    pub print_level: u8,
    pub write_checkpoint: bool,
    /// Write per-mode contributions of every evaluated point to `<stem>.vibcon`.
    pub write_mode_contributions: bool,
    /// Directory for result files; the input file's directory when unset.
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Requested worker threads; the safe maximum when unset.
    pub threads: Option<usize>,
    pub strategy: ScanStrategy,
    /// Memory ceiling in MB; derived from system memory when unset.
    pub memory_limit_mb: Option<u64>,
    pub max_open_files: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThermoConfig {
    pub conditions: ConditionsConfig,
    pub scaling: FrequencyScaling,
    pub low_frequency: LowFrequencyConfig,
    pub mass_mode: MassMode,
    /// Skip translation and rotation (molecule in a condensed or periodic phase).
    pub condensed_phase: bool,
    /// Imaginary modes with a magnitude below this (cm⁻¹) are treated as real.
    pub imaginary_threshold: f64,
    /// Replaces the loaded electronic energy (Hartree) when set.
    pub external_energy: Option<f64>,
    pub point_group_hint: Option<String>,
    pub output: OutputConfig,
    pub execution: ExecutionConfig,
}

impl ThermoConfig {
    pub fn builder() -> ThermoConfigBuilder {
        ThermoConfigBuilder::new()
    }

    /// Treatment parameters with an already resolved average moment of inertia.
    pub fn treatment_parameters(&self, bav: f64) -> TreatmentParameters {
        TreatmentParameters {
            kind: self.low_frequency.treatment,
            raise_threshold: self.low_frequency.raise_threshold,
            interpolation_threshold: self.low_frequency.interpolation_threshold,
            bav,
            interpolate_energy: self.low_frequency.interpolate_energy,
        }
    }
}

impl Default for ThermoConfig {
    fn default() -> Self {
        ThermoConfigBuilder::new()
            .build()
            .expect("default configuration is valid")
    }
}

#[derive(Default, Debug, Clone)]
pub struct ThermoConfigBuilder {
    temperature: Option<f64>,
    pressure: Option<f64>,
    temperature_scan: Option<ScanRange>,
    pressure_scan: Option<ScanRange>,
    scale_zpe: Option<f64>,
    scale_heat: Option<f64>,
    scale_entropy: Option<f64>,
    scale_heat_capacity: Option<f64>,
    treatment: Option<TreatmentKind>,
    raise_threshold: Option<f64>,
    interpolation_threshold: Option<f64>,
    bav: Option<BavPreset>,
    interpolate_energy: Option<bool>,
    mass_mode: Option<MassMode>,
    condensed_phase: Option<bool>,
    imaginary_threshold: Option<f64>,
    external_energy: Option<f64>,
    point_group_hint: Option<String>,
    print_level: Option<u8>,
    write_checkpoint: Option<bool>,
    write_mode_contributions: Option<bool>,
    output_dir: Option<PathBuf>,
    threads: Option<usize>,
    strategy: Option<ScanStrategy>,
    memory_limit_mb: Option<u64>,
    max_open_files: Option<usize>,
}

impl ThermoConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, kelvin: f64) -> Self {
        self.temperature = Some(kelvin);
        self
    }
    pub fn pressure(mut self, atm: f64) -> Self {
        self.pressure = Some(atm);
        self
    }
    pub fn temperature_scan(mut self, range: ScanRange) -> Self {
        self.temperature_scan = Some(range);
        self
    }
    pub fn pressure_scan(mut self, range: ScanRange) -> Self {
        self.pressure_scan = Some(range);
        self
    }
    pub fn scaling(mut self, scaling: FrequencyScaling) -> Self {
        self.scale_zpe = Some(scaling.zpe);
        self.scale_heat = Some(scaling.heat);
        self.scale_entropy = Some(scaling.entropy);
        self.scale_heat_capacity = Some(scaling.heat_capacity);
        self
    }
    pub fn scale_zpe(mut self, factor: f64) -> Self {
        self.scale_zpe = Some(factor);
        self
    }
    pub fn scale_heat(mut self, factor: f64) -> Self {
        self.scale_heat = Some(factor);
        self
    }
    pub fn scale_entropy(mut self, factor: f64) -> Self {
        self.scale_entropy = Some(factor);
        self
    }
    pub fn scale_heat_capacity(mut self, factor: f64) -> Self {
        self.scale_heat_capacity = Some(factor);
        self
    }
    pub fn treatment(mut self, kind: TreatmentKind) -> Self {
        self.treatment = Some(kind);
        self
    }
    pub fn raise_threshold(mut self, wavenumber: f64) -> Self {
        self.raise_threshold = Some(wavenumber);
        self
    }
    pub fn interpolation_threshold(mut self, wavenumber: f64) -> Self {
        self.interpolation_threshold = Some(wavenumber);
        self
    }
    pub fn bav(mut self, preset: BavPreset) -> Self {
        self.bav = Some(preset);
        self
    }
    pub fn interpolate_energy(mut self, enabled: bool) -> Self {
        self.interpolate_energy = Some(enabled);
        self
    }
    pub fn mass_mode(mut self, mode: MassMode) -> Self {
        self.mass_mode = Some(mode);
        self
    }
    pub fn condensed_phase(mut self, enabled: bool) -> Self {
        self.condensed_phase = Some(enabled);
        self
    }
    pub fn imaginary_threshold(mut self, wavenumber: f64) -> Self {
        self.imaginary_threshold = Some(wavenumber);
        self
    }
    pub fn external_energy(mut self, hartree: f64) -> Self {
        self.external_energy = Some(hartree);
        self
    }
    pub fn point_group_hint(mut self, hint: impl Into<String>) -> Self {
        self.point_group_hint = Some(hint.into());
        self
    }
    pub fn print_level(mut self, level: u8) -> Self {
        self.print_level = Some(level);
        self
    }
    pub fn write_checkpoint(mut self, enabled: bool) -> Self {
        self.write_checkpoint = Some(enabled);
        self
    }
    pub fn write_mode_contributions(mut self, enabled: bool) -> Self {
        self.write_mode_contributions = Some(enabled);
        self
    }
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
    pub fn strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
    pub fn memory_limit_mb(mut self, megabytes: u64) -> Self {
        self.memory_limit_mb = Some(megabytes);
        self
    }
    pub fn max_open_files(mut self, limit: usize) -> Self {
        self.max_open_files = Some(limit);
        self
    }

    pub fn build(self) -> Result<ThermoConfig, ConfigError> {
        let conditions = ConditionsConfig {
            temperature: positive("temperature", self.temperature.unwrap_or(298.15))?,
            pressure: positive("pressure", self.pressure.unwrap_or(1.0))?,
            temperature_scan: self.temperature_scan,
            pressure_scan: self.pressure_scan,
        };
        if let Some(range) = &conditions.temperature_scan {
            range.validate("temperature")?;
        }
        if let Some(range) = &conditions.pressure_scan {
            range.validate("pressure")?;
        }
        let grid_points = [&conditions.temperature_scan, &conditions.pressure_scan]
            .into_iter()
            .map(|range| range.as_ref().map_or(1, ScanRange::count))
            .try_fold(1usize, usize::checked_mul);
        if grid_points.is_none_or(|n| n > MAX_SCAN_POINTS) {
            return Err(ConfigError::InvalidValue {
                parameter: "scan",
                reason: format!("the temperature x pressure grid exceeds {MAX_SCAN_POINTS} points"),
            });
        }

        let scaling = FrequencyScaling {
            zpe: positive("scale-zpe", self.scale_zpe.unwrap_or(1.0))?,
            heat: positive("scale-heat", self.scale_heat.unwrap_or(1.0))?,
            entropy: positive("scale-entropy", self.scale_entropy.unwrap_or(1.0))?,
            heat_capacity: positive("scale-cv", self.scale_heat_capacity.unwrap_or(1.0))?,
        };

        let low_frequency = LowFrequencyConfig {
            treatment: self.treatment.unwrap_or_default(),
            raise_threshold: non_negative("ravib", self.raise_threshold.unwrap_or(100.0))?,
            interpolation_threshold: non_negative(
                "intpvib",
                self.interpolation_threshold.unwrap_or(100.0),
            )?,
            bav: self.bav.unwrap_or_default(),
            interpolate_energy: self.interpolate_energy.unwrap_or(false),
        };

        let print_level = self.print_level.unwrap_or(1);
        if print_level > 3 {
            return Err(ConfigError::InvalidValue {
                parameter: "print-level",
                reason: format!("{print_level} is outside 0..=3"),
            });
        }

        let max_open_files = self.max_open_files.unwrap_or(100);
        if max_open_files == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max-open-files",
                reason: "at least one file handle is required".to_string(),
            });
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidValue {
                parameter: "threads",
                reason: "at least one thread is required".to_string(),
            });
        }
        if self.memory_limit_mb == Some(0) {
            return Err(ConfigError::InvalidValue {
                parameter: "memory-limit",
                reason: "must be positive".to_string(),
            });
        }

        Ok(ThermoConfig {
            conditions,
            scaling,
            low_frequency,
            mass_mode: self.mass_mode.unwrap_or_default(),
            condensed_phase: self.condensed_phase.unwrap_or(false),
            imaginary_threshold: non_negative("imag-real", self.imaginary_threshold.unwrap_or(0.0))?,
            external_energy: self.external_energy.filter(|e| *e != 0.0),
            point_group_hint: self.point_group_hint.filter(|h| !h.trim().is_empty()),
            output: OutputConfig {
                print_level,
                write_checkpoint: self.write_checkpoint.unwrap_or(false),
                write_mode_contributions: self.write_mode_contributions.unwrap_or(false),
                output_dir: self.output_dir,
            },
            execution: ExecutionConfig {
                threads: self.threads,
                strategy: self.strategy.unwrap_or_default(),
                memory_limit_mb: self.memory_limit_mb,
                max_open_files,
            },
        })
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: format!("{value} is not a positive number"),
        })
    }
}

fn non_negative(parameter: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: format!("{value} is negative"),
        })
    }
}
