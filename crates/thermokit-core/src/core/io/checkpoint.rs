//! The `.otm` checkpoint format: a plain-text snapshot of a prepared molecular record.
//!
//! ```text
//! *E
//!   -76.408953399
//! *wavenum
//!   1602.4385
//! *atoms
//! O      15.99491462     0.00000000     0.00000000     0.11926200
//! *elevel
//!      0.000000     1
//! ```
//!
//! `*atoms` rows carry symbol, mass (amu) and Cartesian position (Angstroms); `*elevel` rows an
//! excitation energy (eV) and a degeneracy. Masses stored in a checkpoint are used as-is when it
//! is loaded again.

use super::error::LoadError;
use super::program::ProgramKind;
use super::text::{element_from_label, parse_fields, parse_number};
use super::traits::OutputLoader;
use crate::core::models::atom::Atom;
use crate::core::models::record::{ElectronicLevel, MolecularRecord};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Energy,
    Wavenumbers,
    Atoms,
    Levels,
}

pub struct CheckpointLoader;

impl OutputLoader for CheckpointLoader {
    fn program(&self) -> ProgramKind {
        ProgramKind::Checkpoint
    }

    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError> {
        let mut record = MolecularRecord::new(ProgramKind::Checkpoint);
        let mut section = None;

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('*') {
                section = Some(match name.trim().to_ascii_lowercase().as_str() {
                    "e" => Section::Energy,
                    "wavenum" => Section::Wavenumbers,
                    "atoms" => Section::Atoms,
                    "elevel" => Section::Levels,
                    other => {
                        return Err(LoadError::parse(line_no, format!("unknown section '*{other}'")));
                    }
                });
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            match section {
                None => return Err(LoadError::parse(line_no, "data before the first section")),
                Some(Section::Energy) => record.electronic_energy = parse_number(fields[0], line_no)?,
                Some(Section::Wavenumbers) => {
                    for token in &fields {
                        record.wavenumbers.push(parse_number(token, line_no)?);
                    }
                }
                Some(Section::Atoms) => {
                    if fields.len() < 5 {
                        return Err(LoadError::parse(line_no, "atom rows need symbol, mass, x, y, z"));
                    }
                    let element = element_from_label(fields[0])?;
                    let mass: f64 = parse_number(fields[1], line_no)?;
                    let [x, y, z] = parse_fields(&fields, [2, 3, 4], line_no)?;
                    let mut atom = Atom::new(element, Point3::new(x, y, z)).with_reported_mass(mass);
                    atom.mass = mass;
                    record.atoms.push(atom);
                }
                Some(Section::Levels) => {
                    if fields.len() < 2 {
                        return Err(LoadError::parse(line_no, "level rows need energy and degeneracy"));
                    }
                    let energy: f64 = parse_number(fields[0], line_no)?;
                    let degeneracy: u32 = parse_number(fields[1], line_no)?;
                    record.electronic_levels.push(ElectronicLevel::new(energy, degeneracy.max(1)));
                }
            }
        }

        if record.atoms.is_empty() {
            return Err(LoadError::MissingSection("*atoms"));
        }
        if let Some(ground) = record.electronic_levels.first() {
            record.spin_multiplicity = ground.degeneracy as i32;
        }
        Ok(record)
    }
}

pub fn write_checkpoint(record: &MolecularRecord, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "*E")?;
    writeln!(writer, "  {:.9}", record.electronic_energy)?;
    writeln!(writer, "*wavenum")?;
    for w in &record.wavenumbers {
        writeln!(writer, "  {w:.4}")?;
    }
    writeln!(writer, "*atoms")?;
    for atom in &record.atoms {
        writeln!(
            writer,
            "{:<4}{:14.8}{:15.8}{:15.8}{:15.8}",
            atom.symbol(),
            atom.mass,
            atom.position.x,
            atom.position.y,
            atom.position.z
        )?;
    }
    writeln!(writer, "*elevel")?;
    for level in &record.electronic_levels {
        writeln!(writer, "{:13.6}{:6}", level.energy_ev, level.degeneracy)?;
    }
    Ok(())
}

pub fn write_checkpoint_file(record: &MolecularRecord, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_checkpoint(record, &mut writer)?;
    writer.flush()
}
