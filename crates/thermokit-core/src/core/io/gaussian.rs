use super::error::LoadError;
use super::program::ProgramKind;
use super::text::{last_line_with, parse_fields, parse_number};
use super::traits::OutputLoader;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::record::MolecularRecord;
use nalgebra::Point3;
use once_cell::sync::Lazy;
use regex::Regex;

static SCF_DONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"SCF Done:\s+E\([^)]*\)\s*=\s*(-?\d+\.\d+)").expect("valid SCF regex")
});
static MULTIPLICITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Multiplicity\s*=\s*(\d+)").expect("valid multiplicity regex"));
static ATOM_MASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Atom\s+(\d+)\s+has atomic number\s+\d+\s+and mass\s+(\d+\.\d+)")
        .expect("valid mass regex")
});

/// Gaussian `.log`/`.out` files.
pub struct GaussianLoader;

impl OutputLoader for GaussianLoader {
    fn program(&self) -> ProgramKind {
        ProgramKind::Gaussian
    }

    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError> {
        parse_gaussian_format(text, ProgramKind::Gaussian)
    }
}

/// Parses Gaussian-formatted output. Also used for the `g98.out` files written by xTB, which
/// carry geometry and frequencies but no energy or multiplicity.
pub(crate) fn parse_gaussian_format(
    text: &str,
    program: ProgramKind,
) -> Result<MolecularRecord, LoadError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut record = MolecularRecord::new(program);

    record.atoms = parse_orientation(&lines)?;
    record.wavenumbers = parse_frequencies(&lines)?;

    if let Some(caps) = SCF_DONE.captures_iter(text).last() {
        record.electronic_energy = parse_number(&caps[1], 0)?;
    }
    if let Some(caps) = MULTIPLICITY.captures(text) {
        record.spin_multiplicity = parse_number(&caps[1], 0)?;
    }
    for caps in ATOM_MASS.captures_iter(text) {
        let index: usize = parse_number(&caps[1], 0)?;
        let mass: f64 = parse_number(&caps[2], 0)?;
        if let Some(atom) = index.checked_sub(1).and_then(|i| record.atoms.get_mut(i)) {
            atom.reported_mass = Some(mass);
        }
    }
    Ok(record)
}

fn parse_orientation(lines: &[&str]) -> Result<Vec<Atom>, LoadError> {
    let header = last_line_with(lines, "Standard orientation:")
        .or_else(|| last_line_with(lines, "Input orientation:"))
        .ok_or(LoadError::MissingSection("Standard orientation"))?;

    // Header, dashes, two column-title lines, dashes.
    let mut atoms = Vec::new();
    for (line_no, line) in lines.iter().enumerate().skip(header + 5) {
        if line.trim_start().starts_with("---") {
            break;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(LoadError::parse(line_no, "truncated orientation row"));
        }
        let atomic_number: i64 = parse_number(fields[1], line_no)?;
        if atomic_number < 1 {
            // Ghost atoms and dummy centers carry no mass.
            continue;
        }
        let element = Element::from_number(atomic_number as u32)
            .ok_or_else(|| LoadError::UnknownElement(fields[1].to_string()))?;
        let n = fields.len();
        let [x, y, z] = parse_fields(&fields, [n - 3, n - 2, n - 1], line_no)?;
        atoms.push(Atom::new(element, Point3::new(x, y, z)));
    }
    if atoms.is_empty() {
        return Err(LoadError::MissingSection("Standard orientation"));
    }
    Ok(atoms)
}

/// Frequencies from the last `Harmonic frequencies` section. High-precision (`---`) rows are
/// followed by a regular section, so resetting at each header keeps only the regular values.
fn parse_frequencies(lines: &[&str]) -> Result<Vec<f64>, LoadError> {
    let mut wavenumbers = Vec::new();
    for (line_no, line) in lines.iter().enumerate() {
        if line.contains("Harmonic frequencies (cm**-1)") {
            wavenumbers.clear();
            continue;
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with("Frequencies --") {
            for token in trimmed.split_whitespace().skip(2) {
                wavenumbers.push(parse_number(token, line_no)?);
            }
        }
    }
    Ok(wavenumbers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER_LOG: &str = "\
 Entering Gaussian System, Link 0=g16
 Copyright (c) 1988-2019, Gaussian, Inc.  All Rights Reserved.
 Charge =  0 Multiplicity = 1
                         Standard orientation:
 ---------------------------------------------------------------------
 Center     Atomic      Atomic             Coordinates (Angstroms)
 Number     Number       Type             X           Y           Z
 ---------------------------------------------------------------------
      1          8           0        0.000000    0.000000    0.119262
      2          1           0        0.000000    0.763239   -0.477047
      3          1           0        0.000000   -0.763239   -0.477047
 ---------------------------------------------------------------------
 SCF Done:  E(RB3LYP) =  -76.4089533990     A.U. after   10 cycles
 Harmonic frequencies (cm**-1), IR intensities (KM/Mole), Raman scattering
                      1                      2                      3
                     A1                     A1                     B2
 Frequencies --   1602.4385              3715.3740              3815.7498
 - Thermochemistry -
 Atom     1 has atomic number  8 and mass  15.99491
 Atom     2 has atomic number  1 and mass   1.00783
 Atom     3 has atomic number  1 and mass   1.00783
";

    #[test]
    fn parses_geometry_energy_frequencies_and_masses() {
        let record = GaussianLoader.parse(WATER_LOG).unwrap();
        assert_eq!(record.program, ProgramKind::Gaussian);
        assert_eq!(record.atom_count(), 3);
        assert_eq!(record.atoms[0].symbol(), "O");
        assert!((record.atoms[1].position.y - 0.763239).abs() < 1e-9);
        assert!((record.electronic_energy + 76.408953399).abs() < 1e-9);
        assert_eq!(record.wavenumbers, vec![1602.4385, 3715.3740, 3815.7498]);
        assert_eq!(record.spin_multiplicity, 1);
        assert_eq!(record.atoms[0].reported_mass, Some(15.99491));
    }

    #[test]
    fn imaginary_frequencies_keep_their_sign() {
        let text = WATER_LOG.replace("1602.4385", "-210.5000");
        let record = GaussianLoader.parse(&text).unwrap();
        assert_eq!(record.wavenumbers[0], -210.5);
        assert_eq!(record.imaginary_count(), 1);
    }

    #[test]
    fn missing_orientation_is_reported() {
        let err = GaussianLoader.parse(" Gaussian, Inc.\n SCF Done:  E(RHF) = -1.0 A.U.").unwrap_err();
        assert!(matches!(err, LoadError::MissingSection(_)));
    }

    #[test]
    fn malformed_coordinates_are_a_parse_error() {
        let text = WATER_LOG.replace("0.763239   -0.477047", "0.76x239   -0.477047");
        assert!(matches!(
            GaussianLoader.parse(&text),
            Err(LoadError::Parse { .. })
        ));
    }
}
