use super::error::LoadError;
use super::program::ProgramKind;
use super::text::{element_from_label, last_line_with, parse_fields, parse_number};
use super::traits::OutputLoader;
use crate::core::models::atom::Atom;
use crate::core::models::record::MolecularRecord;
use nalgebra::Point3;

pub struct QChemLoader;

impl OutputLoader for QChemLoader {
    fn program(&self) -> ProgramKind {
        ProgramKind::QChem
    }

    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError> {
        let lines: Vec<&str> = text.lines().collect();
        let mut record = MolecularRecord::new(ProgramKind::QChem);
        record.atoms = parse_orientation(&lines)?;
        record.spin_multiplicity = parse_multiplicity(&lines)?.unwrap_or(1);

        for (line_no, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if let Some((_, value)) = trimmed.split_once("Total energy in the final basis set =") {
                record.electronic_energy = parse_number(value, line_no)?;
            } else if let Some(rest) = trimmed.strip_prefix("Frequency:") {
                for token in rest.split_whitespace() {
                    record.wavenumbers.push(parse_number(token, line_no)?);
                }
            }
        }
        Ok(record)
    }
}

fn parse_orientation(lines: &[&str]) -> Result<Vec<Atom>, LoadError> {
    let header = last_line_with(lines, "Standard Nuclear Orientation")
        .ok_or(LoadError::MissingSection("Standard Nuclear Orientation"))?;
    let mut atoms = Vec::new();
    for (line_no, line) in lines.iter().enumerate().skip(header + 3) {
        if line.trim_start().starts_with("---") {
            break;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(LoadError::parse(line_no, "truncated orientation row"));
        }
        let element = element_from_label(fields[1])?;
        let [x, y, z] = parse_fields(&fields, [2, 3, 4], line_no)?;
        atoms.push(Atom::new(element, Point3::new(x, y, z)));
    }
    if atoms.is_empty() {
        return Err(LoadError::MissingSection("Standard Nuclear Orientation"));
    }
    Ok(atoms)
}

/// Charge and multiplicity from the echoed `$molecule` section.
fn parse_multiplicity(lines: &[&str]) -> Result<Option<i32>, LoadError> {
    let Some(start) = lines
        .iter()
        .position(|l| l.trim().eq_ignore_ascii_case("$molecule"))
    else {
        return Ok(None);
    };
    let Some((line_no, line)) = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, l)| !l.trim().is_empty())
    else {
        return Ok(None);
    };
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        [_, mult] => Ok(Some(parse_number(mult, line_no)?)),
        _ => Ok(None),
    }
}
