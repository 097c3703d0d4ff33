use super::error::LoadError;
use super::program::ProgramKind;
use super::text::{element_from_label, last_line_with, parse_fields, parse_number, without_zero_modes};
use super::traits::OutputLoader;
use crate::core::models::atom::Atom;
use crate::core::models::record::MolecularRecord;
use nalgebra::Point3;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static FINAL_ENERGY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"FINAL SINGLE POINT ENERGY\s+(-?\d+\.\d+)").expect("valid energy regex")
});
static MULTIPLICITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Multiplicity\s+Mult\s+\.+\s+(\d+)").expect("valid multiplicity regex")
});
static FREQUENCY_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+:\s+(\S+)\s+cm\*\*-1").expect("valid frequency regex")
});

pub struct OrcaLoader;

impl OutputLoader for OrcaLoader {
    fn program(&self) -> ProgramKind {
        ProgramKind::Orca
    }

    /// Falls back to an energy-only record (no frequencies) when the full parse fails but a
    /// `FINAL SINGLE POINT ENERGY` line is present. The fallback keeps the coordinate block when
    /// it is readable; without one the record has no atoms and is rejected downstream with
    /// `NoAtomsLoaded`.
    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError> {
        match parse_full(text) {
            Ok(record) => Ok(record),
            Err(err) => {
                let Some(energy) = last_final_energy(text) else {
                    return Err(err);
                };
                warn!(
                    error = %err,
                    "Full ORCA parse failed; continuing with the final single-point energy only."
                );
                let lines: Vec<&str> = text.lines().collect();
                let mut record = MolecularRecord::new(ProgramKind::Orca);
                record.atoms = parse_coordinates(&lines).unwrap_or_default();
                record.electronic_energy = energy;
                record.spin_multiplicity = parse_multiplicity(text).unwrap_or(1);
                Ok(record)
            }
        }
    }
}

fn parse_full(text: &str) -> Result<MolecularRecord, LoadError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut record = MolecularRecord::new(ProgramKind::Orca);
    record.atoms = parse_coordinates(&lines)?;
    apply_masses(&lines, &mut record.atoms)?;
    record.wavenumbers = parse_frequencies(&lines)?;
    record.electronic_energy =
        last_final_energy(text).ok_or(LoadError::MissingSection("FINAL SINGLE POINT ENERGY"))?;
    record.spin_multiplicity = parse_multiplicity(text).unwrap_or(1);
    Ok(record)
}

fn last_final_energy(text: &str) -> Option<f64> {
    FINAL_ENERGY
        .captures_iter(text)
        .last()
        .and_then(|caps| caps[1].parse().ok())
}

fn parse_multiplicity(text: &str) -> Option<i32> {
    MULTIPLICITY
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

fn parse_coordinates(lines: &[&str]) -> Result<Vec<Atom>, LoadError> {
    let header = last_line_with(lines, "CARTESIAN COORDINATES (ANGSTROEM)")
        .ok_or(LoadError::MissingSection("CARTESIAN COORDINATES (ANGSTROEM)"))?;
    let mut atoms = Vec::new();
    for (line_no, line) in lines.iter().enumerate().skip(header + 2) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            break;
        }
        if fields.len() < 4 {
            return Err(LoadError::parse(line_no, "truncated coordinate row"));
        }
        let element = element_from_label(fields[0])?;
        let [x, y, z] = parse_fields(&fields, [1, 2, 3], line_no)?;
        atoms.push(Atom::new(element, Point3::new(x, y, z)));
    }
    if atoms.is_empty() {
        return Err(LoadError::MissingSection("CARTESIAN COORDINATES (ANGSTROEM)"));
    }
    Ok(atoms)
}

/// Masses from the `CARTESIAN COORDINATES (A.U.)` table (`NO LB ZA FRAG MASS X Y Z`).
fn apply_masses(lines: &[&str], atoms: &mut [Atom]) -> Result<(), LoadError> {
    let Some(header) = last_line_with(lines, "CARTESIAN COORDINATES (A.U.)") else {
        return Ok(());
    };
    let rows = lines
        .iter()
        .enumerate()
        .skip(header + 3)
        .take_while(|(_, l)| !l.trim().is_empty());
    for ((line_no, line), atom) in rows.zip(atoms.iter_mut()) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let Some(mass) = fields.get(4) {
            atom.reported_mass = Some(parse_number(mass, line_no)?);
        }
    }
    Ok(())
}

fn parse_frequencies(lines: &[&str]) -> Result<Vec<f64>, LoadError> {
    let Some(header) = last_line_with(lines, "VIBRATIONAL FREQUENCIES") else {
        return Ok(Vec::new());
    };
    let mut wavenumbers = Vec::new();
    for (line_no, line) in lines.iter().enumerate().skip(header + 1) {
        if line.contains("NORMAL MODES") || line.contains("IR SPECTRUM") {
            break;
        }
        if let Some(caps) = FREQUENCY_ROW.captures(line) {
            wavenumbers.push(parse_number(&caps[1], line_no)?);
        }
    }
    Ok(without_zero_modes(wavenumbers))
}
