//! Plain-text console report for a single-point result.
//!
//! Detail grows with the print level: 1 gives the final quantities, 2 adds the system
//! description and the per-component breakdown, 3 adds one line per vibrational mode.
//! Level 0 renders nothing.

use crate::core::constants::{rotational_constant_ghz, rotational_temperature};
use crate::core::thermo::calculator::{to_cal, to_kcal};
use crate::core::thermo::contribution::Component;
use crate::core::thermo::treatment::FrequencyScaling;
use crate::core::thermo::{ThermoResult, ThermoSystem};
use std::fmt::{self, Write};

/// What the report needs besides the system and the result.
#[derive(Debug, Clone, Copy)]
pub struct ReportSettings<'a> {
    pub print_level: u8,
    pub treatment: &'a str,
    pub scaling: &'a FrequencyScaling,
    pub condensed_phase: bool,
}

pub fn render_report(system: &ThermoSystem, result: &ThermoResult, settings: &ReportSettings) -> String {
    let mut out = String::new();
    if write_report(&mut out, system, result, settings).is_err() {
        out.clear();
    }
    out
}

pub fn write_report(
    out: &mut impl Write,
    system: &ThermoSystem,
    result: &ThermoResult,
    settings: &ReportSettings,
) -> fmt::Result {
    if settings.print_level == 0 {
        return Ok(());
    }
    if settings.print_level >= 2 {
        write_system(out, system, settings)?;
        write_components(out, result)?;
    }
    if settings.print_level >= 3 {
        write_modes(out, system, result)?;
    }
    write_summary(out, result)
}

fn write_system(out: &mut impl Write, system: &ThermoSystem, settings: &ReportSettings) -> fmt::Result {
    let record = system.record();
    let inertia = system.inertia();
    writeln!(out, " Program: {}", record.program)?;
    writeln!(out, " Atoms: {}    Total mass: {:.6} amu", record.atom_count(), system.total_mass())?;
    writeln!(out, " {:>4} {:>4} {:>12} {:>12} {:>12} {:>12}", "#", "Elem", "Mass", "X", "Y", "Z")?;
    for (i, atom) in system.atoms().iter().enumerate() {
        writeln!(
            out,
            " {:>4} {:>4} {:12.6} {:12.6} {:12.6} {:12.6}",
            i + 1,
            atom.symbol(),
            atom.mass,
            atom.position.x,
            atom.position.y,
            atom.position.z
        )?;
    }
    writeln!(
        out,
        " Point group: {} (detected {})    Rotational symmetry number: {}",
        system.point_group(),
        system.detected_point_group(),
        system.symmetry_number()
    )?;
    writeln!(
        out,
        " Principal moments (amu Bohr^2): {:14.6} {:14.6} {:14.6}",
        inertia.moments[0], inertia.moments[1], inertia.moments[2]
    )?;
    if !inertia.is_single_atom() {
        let nonzero: Vec<f64> = inertia.moments.iter().copied().filter(|&m| m > 1e-3).collect();
        let constants: Vec<String> = nonzero
            .iter()
            .map(|&m| format!("{:.6}", rotational_constant_ghz(m)))
            .collect();
        let temperatures: Vec<String> = nonzero
            .iter()
            .map(|&m| format!("{:.6}", rotational_temperature(m)))
            .collect();
        writeln!(out, " Rotational constants (GHz): {}", constants.join("  "))?;
        writeln!(out, " Rotational temperatures (K): {}", temperatures.join("  "))?;
    }
    writeln!(
        out,
        " Electronic levels: {}",
        record
            .electronic_levels
            .iter()
            .map(|l| format!("{:.6} eV (g={})", l.energy_ev, l.degeneracy))
            .collect::<Vec<_>>()
            .join(", ")
    )?;
    writeln!(
        out,
        " Frequencies: {} ({} imaginary, {} used)",
        record.frequency_count(),
        record.imaginary_count(),
        system.vibrational_modes().count()
    )?;
    writeln!(out, " Low-frequency treatment: {}", settings.treatment)?;
    writeln!(
        out,
        " Scale factors: ZPE {:.4}  heat {:.4}  S {:.4}  CV {:.4}",
        settings.scaling.zpe, settings.scaling.heat, settings.scaling.entropy, settings.scaling.heat_capacity
    )?;
    if settings.condensed_phase {
        writeln!(out, " Translation and rotation omitted (condensed phase)")?;
    }
    writeln!(out)
}

fn component_row(out: &mut impl Write, name: &str, c: &Component) -> fmt::Result {
    writeln!(
        out,
        " {:<12}{:12.3}{:12.3}{:12.3}{:16.6}",
        name,
        to_kcal(c.energy),
        to_cal(c.entropy),
        to_cal(c.heat_capacity),
        c.ln_q
    )
}

fn write_components(out: &mut impl Write, result: &ThermoResult) -> fmt::Result {
    writeln!(
        out,
        " {:<12}{:>12}{:>12}{:>12}{:>16}",
        "Component", "U(kcal/mol)", "S(cal/mol/K)", "CV", "ln q"
    )?;
    component_row(out, "Translation", &result.translation)?;
    component_row(out, "Rotation", &result.rotation)?;
    let vibration = Component::new(
        result.vibration.energy + result.vibration.zpe,
        result.vibration.entropy,
        result.vibration.heat_capacity,
        result.vibration.ln_q_v0,
    );
    component_row(out, "Vibration", &vibration)?;
    component_row(out, "Electronic", &result.electronic)?;
    writeln!(out)
}

fn write_modes(out: &mut impl Write, system: &ThermoSystem, result: &ThermoResult) -> fmt::Result {
    write_mode_rows(out, system.vibrational_modes(), result)?;
    writeln!(out)
}

/// One row per vibrational mode: wavenumber, then ZPE and U in kcal/mol, S and CV in cal/mol/K.
pub fn write_mode_rows(
    out: &mut impl Write,
    wavenumbers: impl Iterator<Item = f64>,
    result: &ThermoResult,
) -> fmt::Result {
    writeln!(
        out,
        " {:>5}{:>12}{:>12}{:>12}{:>12}{:>12}",
        "Mode", "cm^-1", "ZPE", "U", "S", "CV"
    )?;
    for (i, (wavenumber, mode)) in wavenumbers.zip(&result.modes).enumerate() {
        writeln!(
            out,
            " {:>5}{:12.2}{:12.4}{:12.4}{:12.4}{:12.4}",
            i + 1,
            wavenumber,
            to_kcal(mode.zpe),
            to_kcal(mode.energy),
            to_cal(mode.entropy),
            to_cal(mode.heat_capacity)
        )?;
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, r: &ThermoResult) -> fmt::Result {
    writeln!(
        out,
        " Thermochemistry at T = {:.3} K, P = {:.3} atm",
        r.conditions.temperature, r.conditions.pressure
    )?;
    writeln!(out, " Zero-point energy:          {:12.3} kcal/mol {:12.3} kJ/mol", to_kcal(r.zpe()), r.zpe())?;
    writeln!(out, " Thermal correction to U:    {:12.3} kcal/mol", to_kcal(r.u_correction()))?;
    writeln!(out, " Thermal correction to H:    {:12.3} kcal/mol", to_kcal(r.h_correction()))?;
    writeln!(out, " Thermal correction to G:    {:12.3} kcal/mol", to_kcal(r.g_correction()))?;
    writeln!(out, " Electronic energy:          {:16.6} a.u.", r.electronic_energy)?;
    writeln!(out, " U = E + Ucorr:              {:16.6} a.u.", r.u_total())?;
    writeln!(out, " H = E + Hcorr:              {:16.6} a.u.", r.h_total())?;
    writeln!(out, " G = E + Gcorr:              {:16.6} a.u.", r.g_total())?;
    writeln!(out, " S:                          {:12.3} cal/mol/K", to_cal(r.entropy()))?;
    writeln!(out, " CV:                         {:12.3} cal/mol/K", to_cal(r.heat_capacity_v()))?;
    writeln!(out, " CP:                         {:12.3} cal/mol/K", to_cal(r.heat_capacity_p()))?;
    writeln!(out, " q(V=0)/NA:                  {:16.6e}", r.q_v0_per_avogadro())?;
    writeln!(out, " q(bot)/NA:                  {:16.6e}", r.q_bot_per_avogadro())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::program::ProgramKind;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;
    use crate::core::models::record::{ElectronicLevel, MolecularRecord};
    use crate::core::symmetry::SymmetryDetector;
    use crate::core::thermo::calculator::{Conditions, ThermoCalculator};
    use crate::core::thermo::treatment::Harmonic;
    use nalgebra::Point3;

    fn carbon_monoxide() -> ThermoSystem {
        let mut record = MolecularRecord::new(ProgramKind::Orca);
        record.atoms = vec![
            Atom::new(Element::from_symbol("C").unwrap(), Point3::new(0.0, 0.0, 0.0)),
            Atom::new(Element::from_symbol("O").unwrap(), Point3::new(0.0, 0.0, 1.128)),
        ];
        record.wavenumbers = vec![2170.0];
        record.electronic_energy = -113.3;
        record.electronic_levels = vec![ElectronicLevel::ground_state(1)];
        ThermoSystem::analyze(record, &SymmetryDetector::new()).unwrap()
    }

    fn render(level: u8) -> String {
        let system = carbon_monoxide();
        let scaling = FrequencyScaling::default();
        let calc = ThermoCalculator::new(&system, Box::new(Harmonic), &scaling);
        let result = calc.evaluate(Conditions::new(298.15, 1.0));
        let settings = ReportSettings {
            print_level: level,
            treatment: "harmonic",
            scaling: &scaling,
            condensed_phase: false,
        };
        render_report(&system, &result, &settings)
    }

    #[test]
    fn silent_level_renders_nothing() {
        assert!(render(0).is_empty());
    }

    #[test]
    fn level_one_has_only_final_quantities() {
        let text = render(1);
        assert!(text.contains("Zero-point energy"));
        assert!(text.contains("G = E + Gcorr"));
        assert!(!text.contains("Point group"));
        assert!(!text.contains("Mode"));
    }

    #[test]
    fn level_two_adds_system_and_components() {
        let text = render(2);
        assert!(text.contains("Point group: C*v"));
        assert!(text.contains("Rotational constants (GHz)"));
        assert!(text.contains("Translation"));
        assert!(!text.contains("cm^-1"));
    }

    #[test]
    fn level_three_lists_every_mode() {
        let text = render(3);
        assert!(text.contains("cm^-1"));
        assert!(text.contains("2170.00"));
    }
}
