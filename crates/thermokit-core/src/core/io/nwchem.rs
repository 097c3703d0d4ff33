use super::error::LoadError;
use super::program::ProgramKind;
use super::text::{
    element_from_charge, element_from_label, last_line_with, parse_fields, parse_number,
    without_zero_modes,
};
use super::traits::OutputLoader;
use crate::core::models::atom::Atom;
use crate::core::models::record::MolecularRecord;
use nalgebra::Point3;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static TOTAL_ENERGY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Total \S+ energy\s*=\s*(-?\d+\.\d+)").expect("valid energy regex")
});
static MULTIPLICITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)spin multiplicity:\s*(\d+)").expect("valid multiplicity regex")
});

pub struct NwChemLoader;

impl OutputLoader for NwChemLoader {
    fn program(&self) -> ProgramKind {
        ProgramKind::NwChem
    }

    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError> {
        let lines: Vec<&str> = text.lines().collect();
        let mut record = MolecularRecord::new(ProgramKind::NwChem);

        let (atoms, tags) = parse_geometry(&lines)?;
        record.atoms = atoms;
        let masses = parse_mass_table(&lines)?;
        for (atom, tag) in record.atoms.iter_mut().zip(&tags) {
            if let Some(&mass) = masses.get(tag.as_str()) {
                atom.reported_mass = Some(mass);
            }
        }

        record.wavenumbers = parse_frequencies(&lines)?;
        if let Some(caps) = TOTAL_ENERGY.captures_iter(text).last() {
            record.electronic_energy = parse_number(&caps[1], 0)?;
        }
        if let Some(caps) = MULTIPLICITY.captures(text) {
            record.spin_multiplicity = parse_number(&caps[1], 0)?;
        }
        Ok(record)
    }
}

/// Rows of the `No. Tag Charge X Y Z` table; the element comes from the nuclear charge, falling
/// back to the tag for zero-charge (ghost or ECP-stripped) centers.
fn parse_geometry(lines: &[&str]) -> Result<(Vec<Atom>, Vec<String>), LoadError> {
    let header = lines
        .iter()
        .rposition(|l| l.contains("No.") && l.contains("Tag") && l.contains("Charge"))
        .ok_or(LoadError::MissingSection("geometry"))?;

    let mut atoms = Vec::new();
    let mut tags = Vec::new();
    for (line_no, line) in lines.iter().enumerate().skip(header + 2) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            break;
        }
        let charge: f64 = parse_number(fields[2], line_no)?;
        let element = element_from_charge(charge).or_else(|_| element_from_label(fields[1]))?;
        let [x, y, z] = parse_fields(&fields, [3, 4, 5], line_no)?;
        atoms.push(Atom::new(element, Point3::new(x, y, z)));
        tags.push(fields[1].to_string());
    }
    if atoms.is_empty() {
        return Err(LoadError::MissingSection("geometry"));
    }
    Ok((atoms, tags))
}

fn parse_mass_table(lines: &[&str]) -> Result<HashMap<String, f64>, LoadError> {
    let mut masses = HashMap::new();
    let Some(header) = last_line_with(lines, "Atomic Mass") else {
        return Ok(masses);
    };
    let rows = lines
        .iter()
        .enumerate()
        .skip(header + 2)
        .skip_while(|(_, l)| l.trim().is_empty())
        .take_while(|(_, l)| !l.trim().is_empty());
    for (line_no, line) in rows {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let [tag, mass] = fields.as_slice() {
            masses.insert(tag.to_string(), parse_number(mass, line_no)?);
        }
    }
    Ok(masses)
}

/// Values of the last `P.Frequency` block (projected, rigid-body modes printed as zero).
fn parse_frequencies(lines: &[&str]) -> Result<Vec<f64>, LoadError> {
    let mut wavenumbers = Vec::new();
    for (line_no, line) in lines.iter().enumerate() {
        if line.contains("Projected Frequencies") {
            wavenumbers.clear();
            continue;
        }
        if let Some(rest) = line.trim_start().strip_prefix("P.Frequency") {
            for token in rest.split_whitespace() {
                wavenumbers.push(parse_number(token, line_no)?);
            }
        }
    }
    Ok(without_zero_modes(wavenumbers))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER_OUT: &str = "\
              Northwest Computational Chemistry Package (NWChem) 7.0.2
  No.       Tag          Charge          X              Y              Z
 ---- ---------------- ---------- -------------- -------------- --------------
    1 O                    8.0000     0.00000000     0.00000000     0.11726921
    2 H                    1.0000     0.75698224     0.00000000    -0.46907685
    3 H                    1.0000    -0.75698224     0.00000000    -0.46907685

      Atomic Mass
      -----------

      O                 15.994910
      H                  1.007825

          Spin multiplicity:  1
         Total DFT energy =      -76.419737926855
             (Projected Frequencies expressed in cm-1)
 P.Frequency        0.00        0.00        0.00        0.00        0.00        0.00
 P.Frequency     1609.33     3727.23     3847.85
";

    #[test]
    fn parses_geometry_masses_energy_and_projected_frequencies() {
        let record = NwChemLoader.parse(WATER_OUT).unwrap();
        assert_eq!(record.atom_count(), 3);
        assert_eq!(record.atoms[1].symbol(), "H");
        assert_eq!(record.atoms[1].reported_mass, Some(1.007825));
        assert_eq!(record.wavenumbers, vec![1609.33, 3727.23, 3847.85]);
        assert!((record.electronic_energy + 76.419737926855).abs() < 1e-12);
        assert_eq!(record.spin_multiplicity, 1);
    }
}
