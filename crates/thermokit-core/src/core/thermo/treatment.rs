use super::contribution::ModeContribution;
use crate::core::constants::{AVOGADRO, BOLTZMANN, GAS_CONSTANT, PLANCK, WAVENUMBER_TO_HZ};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Default average moment of inertia for the free-rotor reference, kg·m².
pub const DEFAULT_BAV: f64 = 1.0e-44;
/// Average moment of inertia used by Q-Chem's quasi-RRHO treatment, kg·m².
pub const QCHEM_BAV: f64 = 2.799_28e-46;

/// One vibrational mode with a separately scaled wavenumber (cm⁻¹) for each quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledMode {
    pub zpe: f64,
    pub energy: f64,
    pub entropy: f64,
    pub heat_capacity: f64,
}

impl ScaledMode {
    pub fn new(wavenumber: f64, scaling: &FrequencyScaling) -> Self {
        Self {
            zpe: wavenumber * scaling.zpe,
            energy: wavenumber * scaling.heat,
            entropy: wavenumber * scaling.entropy,
            heat_capacity: wavenumber * scaling.heat_capacity,
        }
    }
}

/// Independent scale factors applied to wavenumbers before each quantity is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrequencyScaling {
    pub zpe: f64,
    pub heat: f64,
    pub entropy: f64,
    pub heat_capacity: f64,
}

impl Default for FrequencyScaling {
    fn default() -> Self {
        Self {
            zpe: 1.0,
            heat: 1.0,
            entropy: 1.0,
            heat_capacity: 1.0,
        }
    }
}

/// A per-mode scheme turning a scaled vibrational mode into its thermal contribution.
pub trait LowFrequencyTreatment: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn contribution(&self, mode: &ScaledMode, temperature: f64) -> ModeContribution;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreatmentKind {
    #[default]
    Harmonic,
    Truhlar,
    Grimme,
    Minenkov,
    HeadGordon,
}

impl fmt::Display for TreatmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreatmentKind::Harmonic => "harmonic",
            TreatmentKind::Truhlar => "truhlar",
            TreatmentKind::Grimme => "grimme",
            TreatmentKind::Minenkov => "minenkov",
            TreatmentKind::HeadGordon => "head-gordon",
        };
        f.write_str(name)
    }
}

/// Source of the average moment of inertia used by the free-rotor reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BavPreset {
    #[default]
    Grimme,
    QChem,
}

impl BavPreset {
    pub fn value(&self) -> f64 {
        match self {
            BavPreset::Grimme => DEFAULT_BAV,
            BavPreset::QChem => QCHEM_BAV,
        }
    }
}

impl fmt::Display for BavPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BavPreset::Grimme => write!(f, "grimme ({DEFAULT_BAV:e} kg m^2)"),
            BavPreset::QChem => write!(f, "q-chem ({QCHEM_BAV:e} kg m^2)"),
        }
    }
}

/// Outcome of matching a requested Bav preset against the selected treatment.
#[derive(Debug, Clone, PartialEq)]
pub struct BavResolution {
    pub value: f64,
    /// Set when the requested preset was replaced by the default.
    pub warning: Option<String>,
}

/// Only Head-Gordon honors a non-default preset; every other treatment falls back to the default.
pub fn resolve_bav(kind: TreatmentKind, requested: BavPreset) -> BavResolution {
    if kind == TreatmentKind::HeadGordon || requested == BavPreset::Grimme {
        return BavResolution {
            value: requested.value(),
            warning: None,
        };
    }
    BavResolution {
        value: DEFAULT_BAV,
        warning: Some(format!(
            "Bav preset {requested} only applies to the head-gordon treatment; using {} with {kind}",
            BavPreset::Grimme
        )),
    }
}

/// Parameters needed to instantiate any of the treatments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreatmentParameters {
    pub kind: TreatmentKind,
    /// Truhlar raise-to wavenumber, cm⁻¹.
    pub raise_threshold: f64,
    /// Interpolation threshold for the free-rotor schemes, cm⁻¹.
    pub interpolation_threshold: f64,
    /// Average moment of inertia after preset resolution, kg·m².
    pub bav: f64,
    /// Head-Gordon only: interpolate the thermal energy as well as the entropy.
    pub interpolate_energy: bool,
}

impl Default for TreatmentParameters {
    fn default() -> Self {
        Self {
            kind: TreatmentKind::Harmonic,
            raise_threshold: 100.0,
            interpolation_threshold: 100.0,
            bav: DEFAULT_BAV,
            interpolate_energy: false,
        }
    }
}

impl TreatmentParameters {
    pub fn build(&self) -> Box<dyn LowFrequencyTreatment> {
        match self.kind {
            TreatmentKind::Harmonic => Box::new(Harmonic),
            TreatmentKind::Truhlar => Box::new(Truhlar {
                raise_to: self.raise_threshold,
            }),
            TreatmentKind::Grimme => Box::new(Grimme {
                threshold: self.interpolation_threshold,
                bav: self.bav,
            }),
            TreatmentKind::Minenkov => Box::new(Minenkov {
                threshold: self.interpolation_threshold,
                bav: self.bav,
            }),
            TreatmentKind::HeadGordon => Box::new(HeadGordon {
                threshold: self.interpolation_threshold,
                bav: self.bav,
                interpolate_energy: self.interpolate_energy,
            }),
        }
    }
}

#[inline]
fn reduced_frequency(wavenumber: f64, temperature: f64) -> f64 {
    PLANCK * wavenumber * WAVENUMBER_TO_HZ / (BOLTZMANN * temperature)
}

/// Zero-point energy of a mode, kJ/mol.
pub fn harmonic_zpe(wavenumber: f64) -> f64 {
    0.5 * PLANCK * wavenumber * WAVENUMBER_TO_HZ * AVOGADRO / 1000.0
}

/// Thermal energy above the zero-point level, kJ/mol.
pub fn harmonic_energy(wavenumber: f64, temperature: f64) -> f64 {
    let x = reduced_frequency(wavenumber, temperature);
    PLANCK * wavenumber * WAVENUMBER_TO_HZ * AVOGADRO / 1000.0 / x.exp_m1()
}

/// Harmonic-oscillator entropy, J/(mol·K).
pub fn harmonic_entropy(wavenumber: f64, temperature: f64) -> f64 {
    let x = reduced_frequency(wavenumber, temperature);
    GAS_CONSTANT * (x / x.exp_m1() - (-(-x).exp()).ln_1p())
}

/// Harmonic-oscillator heat capacity, J/(mol·K).
pub fn harmonic_heat_capacity(wavenumber: f64, temperature: f64) -> f64 {
    let x = reduced_frequency(wavenumber, temperature);
    let boltzmann_factor = (-x).exp();
    let denominator = -(-x).exp_m1();
    GAS_CONSTANT * x * x * boltzmann_factor / (denominator * denominator)
}

/// ln q referenced to the lowest vibrational level.
pub fn harmonic_ln_q_v0(wavenumber: f64, temperature: f64) -> f64 {
    let x = reduced_frequency(wavenumber, temperature);
    -(-(-x).exp()).ln_1p()
}

/// ln q referenced to the bottom of the potential well.
pub fn harmonic_ln_q_bot(wavenumber: f64, temperature: f64) -> f64 {
    -0.5 * reduced_frequency(wavenumber, temperature) + harmonic_ln_q_v0(wavenumber, temperature)
}

/// Entropy of a free rotor with the mode's effective moment of inertia, J/(mol·K).
///
/// The moment `h / (8π²ν)` is damped toward `bav` so very soft modes do not diverge.
pub fn free_rotor_entropy(wavenumber: f64, temperature: f64, bav: f64) -> f64 {
    let mu = PLANCK / (8.0 * PI * PI * wavenumber * WAVENUMBER_TO_HZ);
    let mu_eff = mu * bav / (mu + bav);
    let arg = 8.0 * PI.powi(3) * mu_eff * BOLTZMANN * temperature / (PLANCK * PLANCK);
    GAS_CONSTANT * (0.5 + 0.5 * arg.ln())
}

/// Head-Gordon/Grimme damping weight of the harmonic term.
pub fn damping_weight(wavenumber: f64, threshold: f64) -> f64 {
    1.0 / (1.0 + (threshold / wavenumber).powi(4))
}

fn harmonic_contribution(mode: &ScaledMode, temperature: f64) -> ModeContribution {
    ModeContribution {
        zpe: harmonic_zpe(mode.zpe),
        energy: harmonic_energy(mode.energy, temperature),
        entropy: harmonic_entropy(mode.entropy, temperature),
        heat_capacity: harmonic_heat_capacity(mode.heat_capacity, temperature),
        ln_q_v0: harmonic_ln_q_v0(mode.energy, temperature),
        ln_q_bot: harmonic_ln_q_bot(mode.energy, temperature),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Harmonic;

impl LowFrequencyTreatment for Harmonic {
    fn name(&self) -> &'static str {
        "harmonic"
    }

    fn contribution(&self, mode: &ScaledMode, temperature: f64) -> ModeContribution {
        harmonic_contribution(mode, temperature)
    }
}

/// Raises soft modes to a floor wavenumber for everything except the zero-point energy.
#[derive(Debug, Clone, Copy)]
pub struct Truhlar {
    pub raise_to: f64,
}

impl LowFrequencyTreatment for Truhlar {
    fn name(&self) -> &'static str {
        "truhlar"
    }

    fn contribution(&self, mode: &ScaledMode, temperature: f64) -> ModeContribution {
        let raised = ScaledMode {
            zpe: mode.zpe,
            energy: mode.energy.max(self.raise_to),
            entropy: mode.entropy.max(self.raise_to),
            heat_capacity: mode.heat_capacity.max(self.raise_to),
        };
        harmonic_contribution(&raised, temperature)
    }
}

fn interpolated_entropy(wavenumber: f64, temperature: f64, threshold: f64, bav: f64) -> f64 {
    let harmonic = harmonic_entropy(wavenumber, temperature);
    if wavenumber >= threshold {
        return harmonic;
    }
    let w = damping_weight(wavenumber, threshold);
    w * harmonic + (1.0 - w) * free_rotor_entropy(wavenumber, temperature, bav)
}

fn interpolated_energy(wavenumber: f64, temperature: f64, threshold: f64) -> f64 {
    let harmonic = harmonic_energy(wavenumber, temperature);
    if wavenumber >= threshold {
        return harmonic;
    }
    let w = damping_weight(wavenumber, threshold);
    w * harmonic + (1.0 - w) * 0.5 * GAS_CONSTANT * temperature / 1000.0
}

fn interpolated_heat_capacity(wavenumber: f64, temperature: f64, threshold: f64) -> f64 {
    let harmonic = harmonic_heat_capacity(wavenumber, temperature);
    if wavenumber >= threshold {
        return harmonic;
    }
    let w = damping_weight(wavenumber, threshold);
    w * harmonic + (1.0 - w) * 0.5 * GAS_CONSTANT
}

/// Quasi-RRHO entropy: soft modes blend toward a free rotor.
#[derive(Debug, Clone, Copy)]
pub struct Grimme {
    pub threshold: f64,
    pub bav: f64,
}

impl LowFrequencyTreatment for Grimme {
    fn name(&self) -> &'static str {
        "grimme"
    }

    fn contribution(&self, mode: &ScaledMode, temperature: f64) -> ModeContribution {
        ModeContribution {
            entropy: interpolated_entropy(mode.entropy, temperature, self.threshold, self.bav),
            ..harmonic_contribution(mode, temperature)
        }
    }
}

/// Grimme's entropy interpolation extended to the thermal energy and heat capacity.
#[derive(Debug, Clone, Copy)]
pub struct Minenkov {
    pub threshold: f64,
    pub bav: f64,
}

impl LowFrequencyTreatment for Minenkov {
    fn name(&self) -> &'static str {
        "minenkov"
    }

    fn contribution(&self, mode: &ScaledMode, temperature: f64) -> ModeContribution {
        ModeContribution {
            energy: interpolated_energy(mode.energy, temperature, self.threshold),
            entropy: interpolated_entropy(mode.entropy, temperature, self.threshold, self.bav),
            heat_capacity: interpolated_heat_capacity(mode.heat_capacity, temperature, self.threshold),
            ..harmonic_contribution(mode, temperature)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeadGordon {
    pub threshold: f64,
    pub bav: f64,
    pub interpolate_energy: bool,
}

impl LowFrequencyTreatment for HeadGordon {
    fn name(&self) -> &'static str {
        "head-gordon"
    }

    fn contribution(&self, mode: &ScaledMode, temperature: f64) -> ModeContribution {
        let harmonic = harmonic_contribution(mode, temperature);
        let energy = if self.interpolate_energy {
            interpolated_energy(mode.energy, temperature, self.threshold)
        } else {
            harmonic.energy
        };
        ModeContribution {
            energy,
            entropy: interpolated_entropy(mode.entropy, temperature, self.threshold, self.bav),
            ..harmonic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f64 = 298.15;

    fn unscaled(wavenumber: f64) -> ScaledMode {
        ScaledMode::new(wavenumber, &FrequencyScaling::default())
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * b.abs().max(1.0)
    }

    #[test]
    fn harmonic_zpe_of_1000_wavenumbers_is_about_5_98_kj() {
        assert!(close(harmonic_zpe(1000.0), 5.9813, 1e-4));
    }

    #[test]
    fn high_frequency_mode_has_vanishing_thermal_terms() {
        let stiff = harmonic_contribution(&unscaled(1.0e6), T);
        assert_eq!(stiff.energy, 0.0);
        assert_eq!(stiff.heat_capacity, 0.0);
        assert_eq!(stiff.entropy, 0.0);
        assert_eq!(stiff.ln_q_v0, 0.0);
    }

    #[test]
    fn soft_harmonic_mode_approaches_classical_limit() {
        let cv = harmonic_heat_capacity(1.0, T);
        assert!(close(cv, GAS_CONSTANT, 1e-4));
        let u = harmonic_energy(1.0, T);
        assert!(close(u, GAS_CONSTANT * T / 1000.0, 1e-2));
    }

    #[test]
    fn ln_q_bot_is_ln_q_v0_minus_half_reduced_frequency() {
        let x = reduced_frequency(500.0, T);
        assert!(close(
            harmonic_ln_q_bot(500.0, T),
            harmonic_ln_q_v0(500.0, T) - x / 2.0,
            1e-12
        ));
    }

    #[test]
    fn truhlar_raises_soft_mode_except_zpe() {
        let treatment = Truhlar { raise_to: 100.0 };
        let soft = treatment.contribution(&unscaled(40.0), T);
        let floor = Harmonic.contribution(&unscaled(100.0), T);
        assert_eq!(soft.zpe, harmonic_zpe(40.0));
        assert_eq!(soft.energy, floor.energy);
        assert_eq!(soft.entropy, floor.entropy);
        assert_eq!(soft.heat_capacity, floor.heat_capacity);
        assert_eq!(soft.ln_q_v0, floor.ln_q_v0);
    }

    #[test]
    fn truhlar_leaves_stiff_modes_untouched() {
        let treatment = Truhlar { raise_to: 100.0 };
        let mode = unscaled(250.0);
        assert_eq!(treatment.contribution(&mode, T), Harmonic.contribution(&mode, T));
    }

    #[test]
    fn grimme_changes_only_entropy_below_threshold() {
        let treatment = Grimme {
            threshold: 100.0,
            bav: DEFAULT_BAV,
        };
        let mode = unscaled(20.0);
        let harmonic = Harmonic.contribution(&mode, T);
        let damped = treatment.contribution(&mode, T);
        assert!(damped.entropy < harmonic.entropy);
        assert_eq!(damped.energy, harmonic.energy);
        assert_eq!(damped.heat_capacity, harmonic.heat_capacity);
    }

    #[test]
    fn interpolation_is_harmonic_at_threshold() {
        let treatment = Minenkov {
            threshold: 100.0,
            bav: DEFAULT_BAV,
        };
        let mode = unscaled(100.0);
        assert_eq!(treatment.contribution(&mode, T), Harmonic.contribution(&mode, T));
    }

    #[test]
    fn minenkov_blends_energy_toward_half_rt() {
        let treatment = Minenkov {
            threshold: 100.0,
            bav: DEFAULT_BAV,
        };
        let soft = treatment.contribution(&unscaled(5.0), T);
        let half_rt = 0.5 * GAS_CONSTANT * T / 1000.0;
        assert!(close(soft.energy, half_rt, 1e-3));
        assert!(close(soft.heat_capacity, 0.5 * GAS_CONSTANT, 1e-3));
    }

    #[test]
    fn head_gordon_energy_interpolation_is_opt_in() {
        let mode = unscaled(30.0);
        let plain = HeadGordon {
            threshold: 100.0,
            bav: QCHEM_BAV,
            interpolate_energy: false,
        };
        let with_energy = HeadGordon {
            interpolate_energy: true,
            ..plain
        };
        let harmonic = Harmonic.contribution(&mode, T);
        assert_eq!(plain.contribution(&mode, T).energy, harmonic.energy);
        assert_ne!(with_energy.contribution(&mode, T).energy, harmonic.energy);
    }

    #[test]
    fn qchem_preset_is_overridden_outside_head_gordon() {
        let resolved = resolve_bav(TreatmentKind::Grimme, BavPreset::QChem);
        assert_eq!(resolved.value, DEFAULT_BAV);
        assert!(resolved.warning.is_some());

        let honored = resolve_bav(TreatmentKind::HeadGordon, BavPreset::QChem);
        assert_eq!(honored.value, QCHEM_BAV);
        assert!(honored.warning.is_none());
    }

    #[test]
    fn default_preset_never_warns() {
        for kind in [TreatmentKind::Harmonic, TreatmentKind::Grimme, TreatmentKind::Truhlar] {
            assert!(resolve_bav(kind, BavPreset::Grimme).warning.is_none());
        }
    }

    #[test]
    fn scaling_applies_per_quantity() {
        let scaling = FrequencyScaling {
            zpe: 0.9,
            heat: 0.8,
            entropy: 0.7,
            heat_capacity: 0.6,
        };
        let mode = ScaledMode::new(1000.0, &scaling);
        assert_eq!(mode.zpe, 900.0);
        assert_eq!(mode.energy, 800.0);
        assert_eq!(mode.entropy, 700.0);
        assert_eq!(mode.heat_capacity, 600.0);
    }

    #[test]
    fn build_selects_requested_treatment() {
        let params = TreatmentParameters {
            kind: TreatmentKind::Minenkov,
            ..Default::default()
        };
        assert_eq!(params.build().name(), "minenkov");
    }
}
