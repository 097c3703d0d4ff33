use crate::core::models::atom::Atom;
use crate::core::models::record::{ElectronicLevel, MolecularRecord};
use crate::core::symmetry::inertia::analyze;
use crate::core::symmetry::{GeometryError, InertiaAnalysis, PointGroup, SymmetryDetector};

/// A prepared molecular record frozen together with its geometry and symmetry facts.
///
/// Built once per input and shared read-only by every (T, P) evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermoSystem {
    record: MolecularRecord,
    inertia: InertiaAnalysis,
    detected_group: PointGroup,
    point_group: PointGroup,
}

impl ThermoSystem {
    /// Runs inertia analysis and point-group detection on a prepared record.
    pub fn analyze(record: MolecularRecord, detector: &SymmetryDetector) -> Result<Self, GeometryError> {
        if record.atoms.is_empty() {
            return Err(GeometryError::NoAtoms);
        }
        let inertia = analyze(&record.atoms)?;
        let detected_group = detector.detect_with(&record.atoms, &inertia);
        Ok(Self {
            record,
            inertia,
            detected_group,
            point_group: detected_group,
        })
    }

    /// Replaces the point group used for the symmetry number; the detected group is kept.
    pub fn with_point_group(mut self, point_group: PointGroup) -> Self {
        self.point_group = point_group;
        self
    }

    pub fn record(&self) -> &MolecularRecord {
        &self.record
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.record.atoms
    }

    pub fn inertia(&self) -> &InertiaAnalysis {
        &self.inertia
    }

    pub fn point_group(&self) -> PointGroup {
        self.point_group
    }

    pub fn detected_point_group(&self) -> PointGroup {
        self.detected_group
    }

    pub fn symmetry_number(&self) -> u32 {
        self.point_group.symmetry_number()
    }

    pub fn total_mass(&self) -> f64 {
        self.inertia.total_mass
    }

    /// Electronic energy in Hartree.
    pub fn electronic_energy(&self) -> f64 {
        self.record.electronic_energy
    }

    pub fn electronic_levels(&self) -> &[ElectronicLevel] {
        &self.record.electronic_levels
    }

    /// All wavenumbers as stored, imaginary modes included.
    pub fn wavenumbers(&self) -> &[f64] {
        &self.record.wavenumbers
    }

    /// Wavenumbers that enter the vibrational sums: real, non-zero, and none for a single atom.
    pub fn vibrational_modes(&self) -> impl Iterator<Item = f64> + '_ {
        let single_atom = self.inertia.is_single_atom();
        self.record
            .wavenumbers
            .iter()
            .copied()
            .filter(move |&w| !single_atom && w > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::program::ProgramKind;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    fn water() -> MolecularRecord {
        let mut record = MolecularRecord::new(ProgramKind::Gaussian);
        let o = Element::from_symbol("O").unwrap();
        let h = Element::from_symbol("H").unwrap();
        record.atoms = vec![
            Atom::new(o, Point3::new(0.0, 0.0, 0.1173)),
            Atom::new(h, Point3::new(0.0, 0.7572, -0.4692)),
            Atom::new(h, Point3::new(0.0, -0.7572, -0.4692)),
        ];
        record.wavenumbers = vec![-120.0, 0.0, 1600.0, 3700.0, 3800.0];
        record
    }

    #[test]
    fn empty_record_is_rejected_before_analysis() {
        let record = MolecularRecord::new(ProgramKind::Orca);
        assert_eq!(
            ThermoSystem::analyze(record, &SymmetryDetector::new()),
            Err(GeometryError::NoAtoms)
        );
    }

    #[test]
    fn analysis_assigns_detected_group() {
        let system = ThermoSystem::analyze(water(), &SymmetryDetector::new()).unwrap();
        assert_eq!(system.point_group(), PointGroup::Cnv(2));
        assert_eq!(system.symmetry_number(), 2);
    }

    #[test]
    fn hint_overrides_symmetry_number_but_not_detection() {
        let system = ThermoSystem::analyze(water(), &SymmetryDetector::new())
            .unwrap()
            .with_point_group(PointGroup::C1);
        assert_eq!(system.symmetry_number(), 1);
        assert_eq!(system.detected_point_group(), PointGroup::Cnv(2));
    }

    #[test]
    fn vibrational_modes_skip_imaginary_and_zero() {
        let system = ThermoSystem::analyze(water(), &SymmetryDetector::new()).unwrap();
        let modes: Vec<f64> = system.vibrational_modes().collect();
        assert_eq!(modes, vec![1600.0, 3700.0, 3800.0]);
    }

    #[test]
    fn single_atom_has_no_vibrational_modes() {
        let mut record = MolecularRecord::new(ProgramKind::Gaussian);
        record.atoms = vec![Atom::new(Element::from_symbol("Ar").unwrap(), Point3::origin())];
        record.wavenumbers = vec![50.0];
        let system = ThermoSystem::analyze(record, &SymmetryDetector::new()).unwrap();
        assert_eq!(system.vibrational_modes().count(), 0);
        assert_eq!(system.point_group(), PointGroup::Kh);
    }
}
