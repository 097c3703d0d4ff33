//! Translational, rotational and electronic partition functions of an ideal gas molecule.

use super::contribution::Component;
use crate::core::constants::{
    AMU_BOHR2_TO_KG_M2, AMU_TO_KG, ATM_TO_PA, AVOGADRO, BOLTZMANN, EV_TO_J, GAS_CONSTANT, PLANCK,
};
use crate::core::models::record::ElectronicLevel;
use crate::core::symmetry::{InertiaAnalysis, RotorKind};
use std::f64::consts::PI;

/// Ideal-gas translation of a particle of `total_mass` amu at `pressure` atm.
pub fn translational(total_mass: f64, temperature: f64, pressure: f64) -> Component {
    let kt = BOLTZMANN * temperature;
    let mass = total_mass * AMU_TO_KG;
    let ln_q = 1.5 * (2.0 * PI * mass * kt / (PLANCK * PLANCK)).ln() + (kt / (pressure * ATM_TO_PA)).ln();
    Component::new(
        1.5 * GAS_CONSTANT * temperature / 1000.0,
        GAS_CONSTANT * (ln_q + 2.5),
        1.5 * GAS_CONSTANT,
        ln_q,
    )
}

/// Rigid-rotor rotation; a single atom contributes nothing.
pub fn rotational(inertia: &InertiaAnalysis, symmetry_number: u32, temperature: f64) -> Component {
    let kt = BOLTZMANN * temperature;
    let sigma = f64::from(symmetry_number.max(1));
    match inertia.rotor {
        RotorKind::Atom => Component::default(),
        RotorKind::Linear => {
            let moment = inertia.moments[2] * AMU_BOHR2_TO_KG_M2;
            let ln_q = (8.0 * PI * PI * moment * kt / (sigma * PLANCK * PLANCK)).ln();
            Component::new(
                GAS_CONSTANT * temperature / 1000.0,
                GAS_CONSTANT * (ln_q + 1.0),
                GAS_CONSTANT,
                ln_q,
            )
        }
        RotorKind::Nonlinear => {
            let product: f64 = inertia.moments.iter().map(|m| m * AMU_BOHR2_TO_KG_M2).product();
            let ln_q = PI.sqrt().ln() - sigma.ln()
                + 1.5 * (8.0 * PI * PI * kt / (PLANCK * PLANCK)).ln()
                + 0.5 * product.ln();
            Component::new(
                1.5 * GAS_CONSTANT * temperature / 1000.0,
                GAS_CONSTANT * (ln_q + 1.5),
                1.5 * GAS_CONSTANT,
                ln_q,
            )
        }
    }
}

/// Electronic contribution from a list of levels (eV above the ground state).
pub fn electronic(levels: &[ElectronicLevel], temperature: f64) -> Component {
    if levels.is_empty() {
        return Component::default();
    }
    let kt = BOLTZMANN * temperature;
    let mut q = 0.0;
    let mut first_moment = 0.0;
    let mut second_moment = 0.0;
    for level in levels {
        let energy = level.energy_ev * EV_TO_J;
        let weight = f64::from(level.degeneracy) * (-energy / kt).exp();
        q += weight;
        first_moment += weight * energy;
        second_moment += weight * energy * energy;
    }
    let mean = first_moment / q;
    let variance = (second_moment / q - mean * mean).max(0.0);
    let energy = AVOGADRO * mean;
    Component::new(
        energy / 1000.0,
        GAS_CONSTANT * q.ln() + energy / temperature,
        GAS_CONSTANT * variance / (kt * kt),
        q.ln(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;
    use crate::core::symmetry::inertia::analyze;
    use nalgebra::Point3;

    const T: f64 = 298.15;

    fn atom(symbol: &str, x: f64, y: f64, z: f64) -> Atom {
        Atom::new(Element::from_symbol(symbol).unwrap(), Point3::new(x, y, z))
    }

    #[test]
    fn argon_translational_entropy_matches_sackur_tetrode() {
        let component = translational(39.948, T, 1.0);
        // 154.85 J/(mol K) at 1 bar, less R ln(1.01325) at 1 atm.
        assert!((component.entropy - 154.736).abs() < 0.01);
        assert!((component.heat_capacity - 1.5 * GAS_CONSTANT).abs() < 1e-12);
    }

    #[test]
    fn doubling_pressure_lowers_ln_q_by_ln_two() {
        let low = translational(18.0, T, 1.0);
        let high = translational(18.0, T, 2.0);
        assert!((low.ln_q - high.ln_q - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn single_atom_has_no_rotation() {
        let inertia = analyze(&[atom("Ne", 0.0, 0.0, 0.0)]).unwrap();
        assert_eq!(rotational(&inertia, 1, T), Component::default());
    }

    #[test]
    fn linear_rotor_heat_capacity_is_r() {
        let inertia = analyze(&[atom("C", 0.0, 0.0, 0.0), atom("O", 0.0, 0.0, 1.128)]).unwrap();
        let component = rotational(&inertia, 1, T);
        assert!((component.heat_capacity - GAS_CONSTANT).abs() < 1e-12);
        assert!((component.energy - GAS_CONSTANT * T / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn symmetry_number_divides_rotational_q() {
        let inertia = analyze(&[
            atom("O", 0.0, 0.0, 0.1173),
            atom("H", 0.0, 0.7572, -0.4692),
            atom("H", 0.0, -0.7572, -0.4692),
        ])
        .unwrap();
        let asymmetric = rotational(&inertia, 1, T);
        let symmetric = rotational(&inertia, 2, T);
        assert!((asymmetric.ln_q - symmetric.ln_q - 2f64.ln()).abs() < 1e-12);
        assert!((symmetric.heat_capacity - 1.5 * GAS_CONSTANT).abs() < 1e-12);
    }

    #[test]
    fn degenerate_ground_level_contributes_r_ln_g() {
        let component = electronic(&[ElectronicLevel::new(0.0, 3)], T);
        assert_eq!(component.energy, 0.0);
        assert_eq!(component.heat_capacity, 0.0);
        assert!((component.entropy - GAS_CONSTANT * 3f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn low_lying_excited_level_adds_energy_and_heat_capacity() {
        let levels = [ElectronicLevel::new(0.0, 2), ElectronicLevel::new(0.05, 2)];
        let component = electronic(&levels, T);
        assert!(component.energy > 0.0);
        assert!(component.heat_capacity > 0.0);
        assert!(component.ln_q > 2f64.ln());
    }
}
