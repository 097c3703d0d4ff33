//! # Thermochemistry Module
//!
//! Rigid-rotor / harmonic-oscillator statistical mechanics for an ideal-gas molecule.
//!
//! - [`system`] - [`system::ThermoSystem`], a prepared record frozen with its inertia and symmetry
//! - [`treatment`] - Per-mode vibrational schemes behind the [`treatment::LowFrequencyTreatment`]
//!   trait (harmonic, Truhlar, Grimme, Minenkov, Head-Gordon) and the four frequency scalings
//! - [`partition`] - Translational, rotational and electronic contributions
//! - [`contribution`] - The additive value types the contributions are expressed in
//! - [`calculator`] - Combines everything into a [`calculator::ThermoResult`] at one (T, P) point
//!
//! All quantities are molar: energies in kJ/mol, entropies and heat capacities in J/(mol·K).
//! Conversion to kcal, cal and Hartree happens only when results are reported.

pub mod calculator;
pub mod contribution;
pub mod partition;
pub mod system;
pub mod treatment;

pub use calculator::{Conditions, ModeReduction, ThermoCalculator, ThermoResult};
pub use system::ThermoSystem;
pub use treatment::{BavPreset, FrequencyScaling, LowFrequencyTreatment, TreatmentKind, TreatmentParameters};
