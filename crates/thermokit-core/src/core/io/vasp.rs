use super::error::LoadError;
use super::program::ProgramKind;
use super::text::{drop_rigid_body_modes, element_from_label, last_line_with, parse_fields, parse_number};
use super::traits::OutputLoader;
use crate::core::constants::HARTREE_TO_EV;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::record::MolecularRecord;
use nalgebra::Point3;
use once_cell::sync::Lazy;
use regex::Regex;

static MODE_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+\s+f(/i)?\s*=.*?(\d+\.\d+)\s+cm-1").expect("valid mode regex")
});

/// VASP `OUTCAR` from an `IBRION = 5..8` finite-difference run on an isolated molecule.
pub struct VaspLoader;

impl OutputLoader for VaspLoader {
    fn program(&self) -> ProgramKind {
        ProgramKind::Vasp
    }

    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError> {
        let lines: Vec<&str> = text.lines().collect();
        let mut record = MolecularRecord::new(ProgramKind::Vasp);

        let species = parse_species(&lines)?;
        let positions = parse_positions(&lines)?;
        let expected: usize = species.iter().map(|s| s.count).sum();
        if positions.len() != expected {
            return Err(LoadError::Inconsistency(format!(
                "{} positions for {} ions listed per type",
                positions.len(),
                expected
            )));
        }
        let kinds = species
            .iter()
            .flat_map(|s| std::iter::repeat_n(s, s.count));
        record.atoms = kinds
            .zip(positions)
            .map(|(s, p)| {
                let atom = Atom::new(s.element, p);
                match s.mass {
                    Some(m) => atom.with_reported_mass(m),
                    None => atom,
                }
            })
            .collect();

        let mut wavenumbers = Vec::new();
        for (line_no, line) in lines.iter().enumerate() {
            if let Some(rest) = line.split("energy  without entropy=").nth(1) {
                if let Some(value) = rest.split_whitespace().next() {
                    let ev: f64 = parse_number(value, line_no)?;
                    record.electronic_energy = ev / HARTREE_TO_EV;
                }
            }
            if line.contains("Eigenvectors and eigenvalues of the dynamical matrix") {
                wavenumbers.clear();
            }
            if let Some(caps) = MODE_ROW.captures(line) {
                let value: f64 = parse_number(&caps[2], line_no)?;
                wavenumbers.push(if caps.get(1).is_some() { -value } else { value });
            }
        }
        record.wavenumbers = drop_rigid_body_modes(&record.atoms, wavenumbers);
        Ok(record)
    }
}

struct Species {
    element: &'static Element,
    count: usize,
    mass: Option<f64>,
}

/// One entry per POTCAR: `VRHFIN =O: s2p4` gives the element, `POMASS = 16.000;` the mass,
/// `ions per type` the counts.
fn parse_species(lines: &[&str]) -> Result<Vec<Species>, LoadError> {
    let mut elements = Vec::new();
    let mut masses = Vec::new();
    let mut counts = Vec::new();
    for (line_no, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("VRHFIN =") {
            let label = rest.split(':').next().unwrap_or("").trim();
            elements.push(element_from_label(label)?);
        } else if let Some(rest) = trimmed.strip_prefix("POMASS =") {
            if let Some((value, _)) = rest.split_once(';') {
                masses.push(parse_number::<f64>(value, line_no)?);
            }
        } else if let Some(rest) = trimmed.strip_prefix("ions per type =") {
            counts = rest
                .split_whitespace()
                .map(|t| parse_number(t, line_no))
                .collect::<Result<Vec<usize>, _>>()?;
        }
    }
    if elements.is_empty() || counts.len() != elements.len() {
        return Err(LoadError::MissingSection("ions per type"));
    }
    Ok(elements
        .into_iter()
        .zip(counts)
        .enumerate()
        .map(|(i, (element, count))| Species {
            element,
            count,
            mass: masses.get(i).copied(),
        })
        .collect())
}

fn parse_positions(lines: &[&str]) -> Result<Vec<Point3<f64>>, LoadError> {
    let header =
        last_line_with(lines, "TOTAL-FORCE").ok_or(LoadError::MissingSection("POSITION"))?;
    let mut positions = Vec::new();
    for (line_no, line) in lines.iter().enumerate().skip(header + 2) {
        if line.trim_start().starts_with("---") {
            break;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [x, y, z] = parse_fields(&fields, [0, 1, 2], line_no)?;
        positions.push(Point3::new(x, y, z));
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CO_OUTCAR: &str = "\
 vasp.6.3.0 20Jan22 (build Mar 01 2022) complex
   VRHFIN =C: s2p2
   POMASS =   12.011; ZVAL   =    4.000    mass and valenz
   VRHFIN =O: s2p4
   POMASS =   16.000; ZVAL   =    6.000    mass and valenz
   ions per type =               1   1
 POSITION                                       TOTAL-FORCE (eV/Angst)
 -----------------------------------------------------------------------------------
      5.00000      5.00000      4.43600         0.000000      0.000000      0.001234
      5.00000      5.00000      5.56400         0.000000      0.000000     -0.001234
 -----------------------------------------------------------------------------------
  energy  without entropy=      -14.80112398  energy(sigma->0) =      -14.80112398
 Eigenvectors and eigenvalues of the dynamical matrix
   1 f  =   63.867000 THz   401.288000 2PiTHz 2130.400000 cm-1   264.138000 meV
   2 f  =    0.300000 THz     1.884956 2PiTHz   10.006923 cm-1     1.240710 meV
   3 f  =    0.200000 THz     1.256637 2PiTHz    6.671282 cm-1     0.827140 meV
   4 f/i=    0.100000 THz     0.628319 2PiTHz    3.335641 cm-1     0.413570 meV
   5 f/i=    0.150000 THz     0.942478 2PiTHz    5.003461 cm-1     0.620355 meV
   6 f/i=    0.250000 THz     1.570796 2PiTHz    8.339102 cm-1     1.033925 meV
";

    #[test]
    fn builds_atoms_from_species_and_drops_rigid_modes() {
        let record = VaspLoader.parse(CO_OUTCAR).unwrap();
        assert_eq!(record.atom_count(), 2);
        assert_eq!(record.atoms[0].symbol(), "C");
        assert_eq!(record.atoms[1].reported_mass, Some(16.0));
        assert_eq!(record.wavenumbers, vec![2130.4]);
        assert!((record.electronic_energy * HARTREE_TO_EV + 14.80112398).abs() < 1e-9);
    }

    #[test]
    fn inconsistent_ion_counts_are_rejected() {
        let text = CO_OUTCAR.replace("ions per type =               1   1", "ions per type = 2 1");
        assert!(matches!(
            VaspLoader.parse(&text),
            Err(LoadError::Inconsistency(_))
        ));
    }
}
