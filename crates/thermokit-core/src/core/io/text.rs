//! Small parsing helpers shared by the program loaders.

use super::error::LoadError;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::symmetry::inertia::{self, RotorKind};
use std::str::FromStr;

pub(crate) fn parse_number<T: FromStr>(token: &str, line: usize) -> Result<T, LoadError> {
    token
        .trim()
        .parse()
        .map_err(|_| LoadError::parse(line, format!("invalid number '{token}'")))
}

/// Parses the fields at `indices` of a whitespace-split line as floats.
pub(crate) fn parse_fields(
    fields: &[&str],
    indices: [usize; 3],
    line: usize,
) -> Result<[f64; 3], LoadError> {
    let mut out = [0.0; 3];
    for (slot, &index) in out.iter_mut().zip(indices.iter()) {
        let token = fields
            .get(index)
            .ok_or_else(|| LoadError::parse(line, "line has too few fields"))?;
        *slot = parse_number(token, line)?;
    }
    Ok(out)
}

/// Index of the last line containing `marker`.
pub(crate) fn last_line_with(lines: &[&str], marker: &str) -> Option<usize> {
    lines.iter().rposition(|l| l.contains(marker))
}

/// All floats following `marker` on a line, e.g. the values of a `Frequencies --` row.
pub(crate) fn numbers_after(line: &str, marker: &str, line_no: usize) -> Result<Vec<f64>, LoadError> {
    let Some(pos) = line.find(marker) else {
        return Ok(Vec::new());
    };
    line[pos + marker.len()..]
        .split_whitespace()
        .map(|t| parse_number(t, line_no))
        .collect()
}

/// Resolves labels such as `C`, `C12` or `Cl_a` to an element.
pub(crate) fn element_from_label(label: &str) -> Result<&'static Element, LoadError> {
    let alphabetic: String = label.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if let Some(element) = Element::from_symbol(&alphabetic) {
        return Ok(element);
    }
    // "CA1"-style labels: fall back to the first letter alone.
    alphabetic
        .get(..1)
        .and_then(Element::from_symbol)
        .ok_or_else(|| LoadError::UnknownElement(label.to_string()))
}

pub(crate) fn element_from_charge(charge: f64) -> Result<&'static Element, LoadError> {
    let number = charge.round();
    if number < 1.0 {
        return Err(LoadError::UnknownElement(format!("nuclear charge {charge}")));
    }
    Element::from_number(number as u32)
        .ok_or_else(|| LoadError::UnknownElement(format!("nuclear charge {charge}")))
}

/// Drops exact-zero entries that programs print for projected-out rigid-body modes.
pub(crate) fn without_zero_modes(wavenumbers: Vec<f64>) -> Vec<f64> {
    wavenumbers.into_iter().filter(|w| w.abs() >= 1e-3).collect()
}

/// When a program reports all 3N Cartesian modes, removes the rigid-body ones: the 3, 5 or 6
/// entries of smallest magnitude for an atom, a linear or a nonlinear molecule.
pub(crate) fn drop_rigid_body_modes(atoms: &[Atom], wavenumbers: Vec<f64>) -> Vec<f64> {
    if wavenumbers.len() != 3 * atoms.len() {
        return wavenumbers;
    }
    let Ok(analysis) = inertia::analyze(atoms) else {
        return wavenumbers;
    };
    let rigid = match analysis.rotor {
        RotorKind::Atom => 3,
        RotorKind::Linear => 5,
        RotorKind::Nonlinear => 6,
    };
    let mut order: Vec<usize> = (0..wavenumbers.len()).collect();
    order.sort_by(|&a, &b| wavenumbers[a].abs().total_cmp(&wavenumbers[b].abs()));
    let mut keep = vec![true; wavenumbers.len()];
    for &index in order.iter().take(rigid) {
        keep[index] = false;
    }
    wavenumbers
        .into_iter()
        .zip(keep)
        .filter_map(|(w, k)| k.then_some(w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn labels_with_suffixes_resolve_to_elements() {
        assert_eq!(element_from_label("Cl2").unwrap().symbol, "Cl");
        assert_eq!(element_from_label("H_a").unwrap().symbol, "H");
        assert_eq!(element_from_label("CA1").unwrap().symbol, "Ca");
        assert!(element_from_label("123").is_err());
    }

    #[test]
    fn nuclear_charges_round_to_elements() {
        assert_eq!(element_from_charge(8.0).unwrap().symbol, "O");
        assert_eq!(element_from_charge(5.9999).unwrap().symbol, "C");
        assert!(element_from_charge(0.0).is_err());
    }

    #[test]
    fn numbers_after_marker_are_collected() {
        let values = numbers_after(" Frequencies --   1595.12  3650.0  3755.3", "--", 0).unwrap();
        assert_eq!(values, vec![1595.12, 3650.0, 3755.3]);
        assert!(numbers_after(" Frequencies --  abc", "--", 0).is_err());
    }

    #[test]
    fn rigid_body_modes_are_dropped_only_for_full_cartesian_lists() {
        let h = Element::from_symbol("H").unwrap();
        let atoms = vec![
            Atom::new(h, Point3::new(0.0, 0.0, 0.0)),
            Atom::new(h, Point3::new(0.0, 0.0, 0.74)),
        ];
        let full = vec![-3.0, 0.5, 4400.0, 1.0, -0.2, 2.0];
        assert_eq!(drop_rigid_body_modes(&atoms, full), vec![4400.0]);

        let partial = vec![12.0, 4400.0];
        assert_eq!(drop_rigid_body_modes(&atoms, partial.clone()), partial);
    }
}
