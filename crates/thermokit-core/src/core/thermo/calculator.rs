use super::contribution::{Component, ModeContribution};
use super::partition::{electronic, rotational, translational};
use super::system::ThermoSystem;
use super::treatment::{FrequencyScaling, LowFrequencyTreatment, ScaledMode};
use crate::core::constants::{AVOGADRO, CAL_TO_J, GAS_CONSTANT, HARTREE_TO_KJ_PER_MOL};
use rayon::prelude::*;
use tracing::trace;

/// A single (temperature, pressure) evaluation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    /// Kelvin.
    pub temperature: f64,
    /// Atmospheres.
    pub pressure: f64,
}

impl Conditions {
    pub fn new(temperature: f64, pressure: f64) -> Self {
        Self {
            temperature,
            pressure,
        }
    }
}

/// How the per-mode contributions of one point are evaluated.
///
/// Both variants reduce the contributions in mode order, so they produce identical numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeReduction {
    #[default]
    Sequential,
    Parallel,
}

/// Thermochemistry of one system at one point.
///
/// Component energies are kJ/mol and entropies/heat capacities J/(mol·K); the accessor methods
/// combine them into the reported quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermoResult {
    pub conditions: Conditions,
    /// Electronic energy in Hartree.
    pub electronic_energy: f64,
    pub translation: Component,
    pub rotation: Component,
    pub vibration: ModeContribution,
    pub electronic: Component,
    /// One entry per vibrational mode, in the order of [`ThermoSystem::vibrational_modes`].
    pub modes: Vec<ModeContribution>,
}

impl ThermoResult {
    fn rt(&self) -> f64 {
        GAS_CONSTANT * self.conditions.temperature / 1000.0
    }

    pub fn zpe(&self) -> f64 {
        self.vibration.zpe
    }

    /// Thermal correction to the internal energy including ZPE, kJ/mol.
    pub fn u_correction(&self) -> f64 {
        self.translation.energy
            + self.rotation.energy
            + self.vibration.energy
            + self.electronic.energy
            + self.vibration.zpe
    }

    pub fn h_correction(&self) -> f64 {
        self.u_correction() + self.rt()
    }

    pub fn g_correction(&self) -> f64 {
        self.h_correction() - self.conditions.temperature * self.entropy() / 1000.0
    }

    pub fn entropy(&self) -> f64 {
        self.translation.entropy + self.rotation.entropy + self.vibration.entropy + self.electronic.entropy
    }

    pub fn heat_capacity_v(&self) -> f64 {
        self.translation.heat_capacity
            + self.rotation.heat_capacity
            + self.vibration.heat_capacity
            + self.electronic.heat_capacity
    }

    pub fn heat_capacity_p(&self) -> f64 {
        self.heat_capacity_v() + GAS_CONSTANT
    }

    fn ln_q_common(&self) -> f64 {
        self.translation.ln_q + self.rotation.ln_q + self.electronic.ln_q
    }

    /// Total partition function referenced to the lowest vibrational level, divided by N_A.
    pub fn q_v0_per_avogadro(&self) -> f64 {
        (self.ln_q_common() + self.vibration.ln_q_v0 - AVOGADRO.ln()).exp()
    }

    /// Total partition function referenced to the bottom of the well, divided by N_A.
    pub fn q_bot_per_avogadro(&self) -> f64 {
        (self.ln_q_common() + self.vibration.ln_q_bot - AVOGADRO.ln()).exp()
    }

    pub fn u_total(&self) -> f64 {
        self.electronic_energy + self.u_correction() / HARTREE_TO_KJ_PER_MOL
    }

    pub fn h_total(&self) -> f64 {
        self.electronic_energy + self.h_correction() / HARTREE_TO_KJ_PER_MOL
    }

    /// Gibbs energy in Hartree.
    pub fn g_total(&self) -> f64 {
        self.electronic_energy + self.g_correction() / HARTREE_TO_KJ_PER_MOL
    }
}

/// kJ to kcal.
#[inline]
pub fn to_kcal(kj: f64) -> f64 {
    kj / CAL_TO_J
}

/// J to cal.
#[inline]
pub fn to_cal(joule: f64) -> f64 {
    joule / CAL_TO_J
}

/// Evaluates a [`ThermoSystem`] at arbitrary conditions with one low-frequency treatment.
#[derive(Debug)]
pub struct ThermoCalculator<'a> {
    system: &'a ThermoSystem,
    treatment: Box<dyn LowFrequencyTreatment>,
    modes: Vec<ScaledMode>,
    condensed_phase: bool,
}

impl<'a> ThermoCalculator<'a> {
    pub fn new(
        system: &'a ThermoSystem,
        treatment: Box<dyn LowFrequencyTreatment>,
        scaling: &FrequencyScaling,
    ) -> Self {
        let modes = system
            .vibrational_modes()
            .map(|w| ScaledMode::new(w, scaling))
            .collect();
        Self {
            system,
            treatment,
            modes,
            condensed_phase: false,
        }
    }

    /// Drops translation and rotation, as for a molecule embedded in a condensed or periodic phase.
    pub fn with_condensed_phase(mut self, condensed_phase: bool) -> Self {
        self.condensed_phase = condensed_phase;
        self
    }

    pub fn system(&self) -> &ThermoSystem {
        self.system
    }

    pub fn treatment_name(&self) -> &'static str {
        self.treatment.name()
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    pub fn evaluate(&self, conditions: Conditions) -> ThermoResult {
        self.evaluate_with(conditions, ModeReduction::Sequential)
    }

    pub fn evaluate_with(&self, conditions: Conditions, reduction: ModeReduction) -> ThermoResult {
        let temperature = conditions.temperature;
        trace!(temperature, pressure = conditions.pressure, "Evaluating point");

        let modes: Vec<ModeContribution> = match reduction {
            ModeReduction::Sequential => self
                .modes
                .iter()
                .map(|m| self.treatment.contribution(m, temperature))
                .collect(),
            ModeReduction::Parallel => self
                .modes
                .par_iter()
                .map(|m| self.treatment.contribution(m, temperature))
                .collect(),
        };
        let vibration = modes.iter().copied().sum();

        let (translation, rotation) = if self.condensed_phase {
            (Component::default(), Component::default())
        } else {
            (
                translational(self.system.total_mass(), temperature, conditions.pressure),
                rotational(self.system.inertia(), self.system.symmetry_number(), temperature),
            )
        };

        ThermoResult {
            conditions,
            electronic_energy: self.system.electronic_energy(),
            translation,
            rotation,
            vibration,
            electronic: electronic(self.system.electronic_levels(), temperature),
            modes,
        }
    }
}
