use super::error::LoadError;
use super::program::ProgramKind;
use super::text::{element_from_label, last_line_with, parse_fields, parse_number};
use super::traits::OutputLoader;
use crate::core::models::atom::Atom;
use crate::core::models::record::MolecularRecord;
use nalgebra::Point3;

/// CP2K output of a `VIBRATIONAL_ANALYSIS` run.
pub struct Cp2kLoader;

impl OutputLoader for Cp2kLoader {
    fn program(&self) -> ProgramKind {
        ProgramKind::Cp2k
    }

    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError> {
        let lines: Vec<&str> = text.lines().collect();
        let mut record = MolecularRecord::new(ProgramKind::Cp2k);
        record.atoms = parse_coordinates(&lines)?;

        for (line_no, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.contains("Total FORCE_EVAL") {
                if let Some(value) = trimmed.split_whitespace().last() {
                    record.electronic_energy = parse_number(value, line_no)?;
                }
            } else if let Some(rest) = trimmed.strip_prefix("VIB|Frequency (cm^-1)") {
                for token in rest.split_whitespace() {
                    record.wavenumbers.push(parse_number(token, line_no)?);
                }
            } else if trimmed.starts_with("DFT| Multiplicity") {
                if let Some(value) = trimmed.split_whitespace().last() {
                    record.spin_multiplicity = parse_number(value, line_no)?;
                }
            }
        }
        Ok(record)
    }
}

/// `Atom Kind Element Z X Y Z Z(eff) Mass` rows following `ATOMIC COORDINATES IN angstrom`.
fn parse_coordinates(lines: &[&str]) -> Result<Vec<Atom>, LoadError> {
    let header = last_line_with(lines, "ATOMIC COORDINATES IN angstrom")
        .ok_or(LoadError::MissingSection("ATOMIC COORDINATES IN angstrom"))?;
    let mut atoms = Vec::new();
    for (line_no, line) in lines
        .iter()
        .enumerate()
        .skip(header + 1)
        .skip_while(|(_, l)| !l.trim_start().chars().next().is_some_and(|c| c.is_ascii_digit()))
    {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 7 {
            break;
        }
        let element = element_from_label(fields[2])?;
        let [x, y, z] = parse_fields(&fields, [4, 5, 6], line_no)?;
        let mut atom = Atom::new(element, Point3::new(x, y, z));
        if let Some(mass) = fields.get(8) {
            atom.reported_mass = Some(parse_number(mass, line_no)?);
        }
        atoms.push(atom);
    }
    if atoms.is_empty() {
        return Err(LoadError::MissingSection("ATOMIC COORDINATES IN angstrom"));
    }
    Ok(atoms)
}
