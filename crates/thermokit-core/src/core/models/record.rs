use super::atom::Atom;
use crate::core::io::program::ProgramKind;

/// One electronic energy level, relative to the ground state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectronicLevel {
    /// Excitation energy in eV.
    pub energy_ev: f64,
    pub degeneracy: u32,
}

impl ElectronicLevel {
    pub fn new(energy_ev: f64, degeneracy: u32) -> Self {
        Self {
            energy_ev,
            degeneracy,
        }
    }

    /// The default ground level for a given spin multiplicity. Non-physical multiplicities
    /// (zero or negative) fall back to a non-degenerate level.
    pub fn ground_state(spin_multiplicity: i32) -> Self {
        Self::new(0.0, spin_multiplicity.max(1) as u32)
    }
}

/// Everything a loader extracts from one program output.
///
/// The record is filled in by a loader and completed by preparation (mass policy, default
/// electronic levels, imaginary-mode handling). Vibrational wavenumbers are signed; a negative
/// value denotes an imaginary mode.
#[derive(Debug, Clone, PartialEq)]
pub struct MolecularRecord {
    pub program: ProgramKind,
    pub atoms: Vec<Atom>,
    /// Vibrational wavenumbers in cm⁻¹.
    pub wavenumbers: Vec<f64>,
    /// Electronic energy in Hartree.
    pub electronic_energy: f64,
    pub spin_multiplicity: i32,
    /// Empty until a loader or preparation supplies levels.
    pub electronic_levels: Vec<ElectronicLevel>,
}

impl MolecularRecord {
    pub fn new(program: ProgramKind) -> Self {
        Self {
            program,
            atoms: Vec::new(),
            wavenumbers: Vec::new(),
            electronic_energy: 0.0,
            spin_multiplicity: 1,
            electronic_levels: Vec::new(),
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn frequency_count(&self) -> usize {
        self.wavenumbers.len()
    }

    pub fn total_mass(&self) -> f64 {
        self.atoms.iter().map(|a| a.mass).sum()
    }

    pub fn imaginary_count(&self) -> usize {
        self.wavenumbers.iter().filter(|&&w| w < 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    #[test]
    fn ground_state_degeneracy_follows_multiplicity() {
        assert_eq!(ElectronicLevel::ground_state(3).degeneracy, 3);
        assert_eq!(ElectronicLevel::ground_state(0).degeneracy, 1);
        assert_eq!(ElectronicLevel::ground_state(-2).degeneracy, 1);
    }

    #[test]
    fn total_mass_sums_atom_masses() {
        let mut record = MolecularRecord::new(ProgramKind::Gaussian);
        let h = Element::from_symbol("H").unwrap();
        record.atoms.push(Atom::new(h, Point3::origin()));
        record.atoms.push(Atom::new(h, Point3::new(0.74, 0.0, 0.0)));
        assert!((record.total_mass() - 2.0 * h.average_mass).abs() < 1e-12);
        assert_eq!(record.atom_count(), 2);
    }

    #[test]
    fn imaginary_count_counts_negative_wavenumbers() {
        let mut record = MolecularRecord::new(ProgramKind::Orca);
        record.wavenumbers = vec![-120.0, 300.0, -5.0, 1000.0];
        assert_eq!(record.imaginary_count(), 2);
        assert_eq!(record.frequency_count(), 4);
    }
}
