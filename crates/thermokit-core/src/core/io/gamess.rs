use super::error::LoadError;
use super::program::ProgramKind;
use super::text::{
    drop_rigid_body_modes, element_from_charge, last_line_with, parse_fields, parse_number,
};
use super::traits::OutputLoader;
use crate::core::constants::BOHR_TO_ANGSTROM;
use crate::core::models::atom::Atom;
use crate::core::models::record::MolecularRecord;
use nalgebra::Point3;
use once_cell::sync::Lazy;
use regex::Regex;

static FINAL_ENERGY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"FINAL\s+\S+\s+ENERGY IS\s+(-?\d+\.\d+)").expect("valid energy regex")
});
static MULTIPLICITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"SPIN MULTIPLICITY\s*=\s*(\d+)").expect("valid multiplicity regex")
});
static RIGID_MODES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"MODES\s+(\d+)\s+TO\s+(\d+)\s+ARE TAKEN AS ROTATIONS AND TRANSLATIONS")
        .expect("valid rigid-mode regex")
});

/// GAMESS-US `.log`/`.gms` output.
pub struct GamessLoader;

impl OutputLoader for GamessLoader {
    fn program(&self) -> ProgramKind {
        ProgramKind::Gamess
    }

    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError> {
        let lines: Vec<&str> = text.lines().collect();
        let mut record = MolecularRecord::new(ProgramKind::Gamess);

        record.atoms = parse_geometry(&lines)?;
        apply_masses(&lines, &mut record.atoms)?;

        let all_modes = parse_frequencies(&lines)?;
        record.wavenumbers = match RIGID_MODES.captures(text) {
            Some(caps) => {
                let first: usize = parse_number(&caps[1], 0)?;
                let last: usize = parse_number(&caps[2], 0)?;
                all_modes
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| !(first..=last).contains(&(i + 1)))
                    .map(|(_, w)| w)
                    .collect()
            }
            None => drop_rigid_body_modes(&record.atoms, all_modes),
        };

        if let Some(caps) = FINAL_ENERGY.captures_iter(text).last() {
            record.electronic_energy = parse_number(&caps[1], 0)?;
        }
        if let Some(caps) = MULTIPLICITY.captures(text) {
            record.spin_multiplicity = parse_number(&caps[1], 0)?;
        }
        Ok(record)
    }
}

/// The last geometry: either the input block in Bohr or an optimization step in Angstroms.
fn parse_geometry(lines: &[&str]) -> Result<Vec<Atom>, LoadError> {
    let bohr = last_line_with(lines, "COORDINATES (BOHR)");
    let angs = last_line_with(lines, "COORDINATES OF ALL ATOMS ARE (ANGS)");
    let (first_row, scale) = match (bohr, angs) {
        (Some(b), Some(a)) if a > b => (a + 3, 1.0),
        (Some(b), _) => (b + 2, BOHR_TO_ANGSTROM),
        (None, Some(a)) => (a + 3, 1.0),
        (None, None) => return Err(LoadError::MissingSection("COORDINATES (BOHR)")),
    };

    let mut atoms = Vec::new();
    for (line_no, line) in lines.iter().enumerate().skip(first_row) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            break;
        }
        let charge: f64 = parse_number(fields[1], line_no)?;
        let element = element_from_charge(charge)?;
        let [x, y, z] = parse_fields(&fields, [2, 3, 4], line_no)?;
        atoms.push(Atom::new(element, Point3::new(x, y, z) * scale));
    }
    if atoms.is_empty() {
        return Err(LoadError::MissingSection("COORDINATES (BOHR)"));
    }
    Ok(atoms)
}

fn apply_masses(lines: &[&str], atoms: &mut [Atom]) -> Result<(), LoadError> {
    let Some(header) = last_line_with(lines, "ATOMIC WEIGHTS (AMU)") else {
        return Ok(());
    };
    let rows = lines
        .iter()
        .enumerate()
        .skip(header + 1)
        .skip_while(|(_, l)| l.trim().is_empty())
        .take_while(|(_, l)| !l.trim().is_empty());
    for ((line_no, line), atom) in rows.zip(atoms.iter_mut()) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let Some(mass) = fields.last() {
            atom.reported_mass = Some(parse_number(mass, line_no)?);
        }
    }
    Ok(())
}

/// `FREQUENCY:` rows, where an `I` token marks the preceding value as imaginary.
fn parse_frequencies(lines: &[&str]) -> Result<Vec<f64>, LoadError> {
    let mut wavenumbers: Vec<f64> = Vec::new();
    for (line_no, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix("FREQUENCY:") else {
            continue;
        };
        for token in rest.split_whitespace() {
            if token == "I" {
                if let Some(last) = wavenumbers.last_mut() {
                    *last = -last.abs();
                }
            } else {
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
          ******************************************************
          *         GAMESS VERSION = 30 SEP 2021 (R2)          *
          ******************************************************
     SPIN MULTIPLICITY                =    1
 ATOM      ATOMIC                      COORDINATES (BOHR)
           CHARGE         X                   Y                   Z
 O           8.0     0.0000000000        0.0000000000        0.2216000000
 H           1.0     0.0000000000        1.4300000000       -0.8864000000
 H           1.0     0.0000000000       -1.4300000000       -0.8864000000

          FINAL RHF ENERGY IS      -76.0107465155 AFTER  10 ITERATIONS
     ATOMIC WEIGHTS (AMU)

    1     O                 15.99491
    2     H                  1.00782
    3     H                  1.00782

     MODES 1 TO 6 ARE TAKEN AS ROTATIONS AND TRANSLATIONS.
       FREQUENCY:         5.28 I       3.45 I       0.12         1.23         2.34
       FREQUENCY:         4.56      1750.10      4140.20      4260.30
";

    #[test]
    fn converts_bohr_geometry_and_drops_listed_rigid_modes() {
        let record = GamessLoader.parse(WATER_LOG).unwrap();
        assert_eq!(record.atom_count(), 3);
        assert!((record.atoms[1].position.y - 1.43 * BOHR_TO_ANGSTROM).abs() < 1e-10);
        assert_eq!(record.wavenumbers, vec![1750.10, 4140.20, 4260.30]);
        assert!((record.electronic_energy + 76.0107465155).abs() < 1e-10);
        assert_eq!(record.atoms[2].reported_mass, Some(1.00782));
    }

    #[test]
    fn imaginary_marker_negates_preceding_value() {
        let lines = ["  FREQUENCY:   120.5 I   300.0"];
        assert_eq!(parse_frequencies(&lines).unwrap(), vec![-120.5, 300.0]);
    }
}
