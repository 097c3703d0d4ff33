//! Physical constants and unit conversion factors (CODATA 2018).

use std::f64::consts::PI;

/// Boltzmann constant, J/K.
pub const BOLTZMANN: f64 = 1.380_649e-23;
/// Planck constant, J·s.
pub const PLANCK: f64 = 6.626_070_15e-34;
/// Avogadro constant, 1/mol.
pub const AVOGADRO: f64 = 6.022_140_76e23;
/// Molar gas constant, J/(mol·K).
pub const GAS_CONSTANT: f64 = BOLTZMANN * AVOGADRO;
/// Speed of light in cm/s; multiplies a wavenumber (cm⁻¹) to give a frequency in Hz.
pub const WAVENUMBER_TO_HZ: f64 = 2.997_924_58e10;

pub const AMU_TO_KG: f64 = 1.660_539_066_60e-27;
pub const BOHR_TO_ANGSTROM: f64 = 0.529_177_210_903;
pub const HARTREE_TO_KJ_PER_MOL: f64 = 2625.499_639_479_9;
pub const HARTREE_TO_EV: f64 = 27.211_386_245_988;
pub const EV_TO_J: f64 = 1.602_176_634e-19;
pub const CAL_TO_J: f64 = 4.184;
pub const ATM_TO_PA: f64 = 101_325.0;

/// Converts a moment of inertia from amu·Bohr² to kg·m².
pub const AMU_BOHR2_TO_KG_M2: f64 = AMU_TO_KG * (BOHR_TO_ANGSTROM * 1e-10) * (BOHR_TO_ANGSTROM * 1e-10);

/// Rotational constant (GHz) for a moment of inertia of 1 amu·Bohr².
pub fn rotational_constant_ghz(moment_amu_bohr2: f64) -> f64 {
    PLANCK / (8.0 * PI * PI * moment_amu_bohr2 * AMU_BOHR2_TO_KG_M2) / 1e9
}

/// Rotational temperature (K) for a moment of inertia in amu·Bohr².
pub fn rotational_temperature(moment_amu_bohr2: f64) -> f64 {
    PLANCK * PLANCK / (8.0 * PI * PI * moment_amu_bohr2 * AMU_BOHR2_TO_KG_M2 * BOLTZMANN)
}
