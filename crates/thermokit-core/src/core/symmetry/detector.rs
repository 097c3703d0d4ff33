use super::inertia::{self, GeometryError, InertiaAnalysis, RotorKind};
use super::operations::{CenteredFrame, SymmetryOperation};
use super::point_group::PointGroup;
use crate::core::models::atom::Atom;
use itertools::Itertools;
use nalgebra::Vector3;
use tracing::trace;

const DEFAULT_TOLERANCE: f64 = 0.05;
const DEFAULT_EIGEN_TOLERANCE: f64 = 0.01;
const DEFAULT_MAX_ORDER: u32 = 8;

/// Assigns a Schoenflies point group by testing candidate operations against the geometry.
///
/// The search follows the usual classification of rotors: linear molecules are split by
/// inversion symmetry, symmetric tops are searched along their unique axis, spherical tops
/// through axes built from triplets of equivalent atoms, and asymmetric tops along their
/// principal axes.
#[derive(Debug, Clone)]
pub struct SymmetryDetector {
    tolerance: f64,
    eigen_tolerance: f64,
    max_order: u32,
}

impl Default for SymmetryDetector {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            eigen_tolerance: DEFAULT_EIGEN_TOLERANCE,
            max_order: DEFAULT_MAX_ORDER,
        }
    }
}

impl SymmetryDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance tolerance in Angstroms for matching an atom to its image.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Highest rotation order searched along a symmetric-top axis.
    pub fn with_max_order(mut self, max_order: u32) -> Self {
        self.max_order = max_order.max(2);
        self
    }

    pub fn detect(&self, atoms: &[Atom]) -> Result<PointGroup, GeometryError> {
        let inertia = inertia::analyze(atoms)?;
        Ok(self.detect_with(atoms, &inertia))
    }

    /// Same as [`detect`](Self::detect) for callers that already hold the inertia analysis.
    pub fn detect_with(&self, atoms: &[Atom], inertia: &InertiaAnalysis) -> PointGroup {
        let frame = CenteredFrame::new(atoms, &inertia.center_of_mass.coords);
        let group = match inertia.rotor {
            RotorKind::Atom => PointGroup::Kh,
            RotorKind::Linear => {
                if self.holds(&frame, &SymmetryOperation::inversion()) {
                    PointGroup::DInfH
                } else {
                    PointGroup::CInfV
                }
            }
            RotorKind::Nonlinear => self.classify_nonlinear(&frame, inertia),
        };
        trace!(point_group = %group, "Point group assigned.");
        group
    }

    fn holds(&self, frame: &CenteredFrame, op: &SymmetryOperation) -> bool {
        frame.is_invariant_under(op, self.tolerance)
    }

    fn classify_nonlinear(&self, frame: &CenteredFrame, inertia: &InertiaAnalysis) -> PointGroup {
        let [ia, ib, ic] = inertia.moments;
        let degenerate = |x: f64, y: f64| (x - y).abs() <= self.eigen_tolerance * ic;
        match (degenerate(ia, ib), degenerate(ib, ic)) {
            (true, true) => self.spherical_top(frame, inertia),
            (true, false) => self.symmetric_top(frame, inertia, &inertia.axes[2]),
            (false, true) => self.symmetric_top(frame, inertia, &inertia.axes[0]),
            (false, false) => self.asymmetric_top(frame, inertia),
        }
    }

    fn asymmetric_top(&self, frame: &CenteredFrame, inertia: &InertiaAnalysis) -> PointGroup {
        let c2_axes: Vec<&Vector3<f64>> = inertia
            .axes
            .iter()
            .filter(|axis| self.holds(frame, &SymmetryOperation::rotation(axis, 2)))
            .collect();
        match c2_axes.as_slice() {
            [] => self.without_rotation(frame, inertia),
            [axis] => self.cyclic(frame, axis, 2),
            [axis, ..] => self.dihedral(frame, axis, 2),
        }
    }

    fn symmetric_top(
        &self,
        frame: &CenteredFrame,
        inertia: &InertiaAnalysis,
        unique_axis: &Vector3<f64>,
    ) -> PointGroup {
        match self.rotation_order(frame, unique_axis) {
            Some(order) if self.has_perpendicular_c2(frame, unique_axis) => {
                self.dihedral(frame, unique_axis, order)
            }
            Some(order) => self.cyclic(frame, unique_axis, order),
            None => self.asymmetric_top(frame, inertia),
        }
    }

    fn spherical_top(&self, frame: &CenteredFrame, inertia: &InertiaAnalysis) -> PointGroup {
        let Some(order) = self.spherical_rotation_order(frame) else {
            return self.symmetric_top(frame, inertia, &inertia.axes[0]);
        };
        let has_inversion = self.holds(frame, &SymmetryOperation::inversion());
        match order {
            5 if has_inversion => PointGroup::Ih,
            5 => PointGroup::I,
            4 if has_inversion => PointGroup::Oh,
            4 => PointGroup::O,
            _ if has_inversion => PointGroup::Th,
            _ if self.has_mirror(frame, self.pair_difference_normals(frame, None)) => PointGroup::Td,
            _ => PointGroup::T,
        }
    }

    fn without_rotation(&self, frame: &CenteredFrame, inertia: &InertiaAnalysis) -> PointGroup {
        if self.holds(frame, &SymmetryOperation::inversion()) {
            PointGroup::Ci
        } else if self.has_mirror(frame, inertia.axes.to_vec()) {
            PointGroup::Cs
        } else {
            PointGroup::C1
        }
    }

    fn cyclic(&self, frame: &CenteredFrame, axis: &Vector3<f64>, order: u32) -> PointGroup {
        if self.holds(frame, &SymmetryOperation::reflection(axis)) {
            PointGroup::Cnh(order)
        } else if self.has_vertical_mirror(frame, axis) {
            PointGroup::Cnv(order)
        } else if self.holds(frame, &SymmetryOperation::improper_rotation(axis, 2 * order)) {
            PointGroup::S2n(2 * order)
        } else {
            PointGroup::Cn(order)
        }
    }

    fn dihedral(&self, frame: &CenteredFrame, axis: &Vector3<f64>, order: u32) -> PointGroup {
        if self.holds(frame, &SymmetryOperation::reflection(axis)) {
            PointGroup::Dnh(order)
        } else if self.has_vertical_mirror(frame, axis) {
            PointGroup::Dnd(order)
        } else {
            PointGroup::Dn(order)
        }
    }

    /// Highest Cn (n ≥ 2) about `axis`, if any.
    fn rotation_order(&self, frame: &CenteredFrame, axis: &Vector3<f64>) -> Option<u32> {
        (2..=self.max_order)
            .rev()
            .find(|&n| self.holds(frame, &SymmetryOperation::rotation(axis, n)))
    }

    fn has_perpendicular_c2(&self, frame: &CenteredFrame, axis: &Vector3<f64>) -> bool {
        let axis = axis.normalize();
        let coords = frame.coords();
        let from_atoms = coords.iter().copied();
        let from_midpoints = self
            .equivalent_pairs(frame)
            .map(|(i, j)| (coords[i] + coords[j]) * 0.5);
        from_atoms
            .chain(from_midpoints)
            .map(|v| v - axis * v.dot(&axis))
            .filter(|v| v.norm() > self.tolerance)
            .any(|v| self.holds(frame, &SymmetryOperation::rotation(&v, 2)))
    }

    fn has_vertical_mirror(&self, frame: &CenteredFrame, axis: &Vector3<f64>) -> bool {
        let axis = axis.normalize();
        let mut normals = self.pair_difference_normals(frame, Some(&axis));
        normals.extend(frame.coords().iter().map(|c| axis.cross(c)));
        self.has_mirror(frame, normals)
    }

    fn has_mirror(&self, frame: &CenteredFrame, normals: Vec<Vector3<f64>>) -> bool {
        normals
            .into_iter()
            .filter(|n| n.norm() > self.tolerance)
            .any(|n| self.holds(frame, &SymmetryOperation::reflection(&n)))
    }

    /// Normals of the planes that would swap each pair of equivalent atoms, optionally
    /// projected perpendicular to `axis`.
    fn pair_difference_normals(
        &self,
        frame: &CenteredFrame,
        axis: Option<&Vector3<f64>>,
    ) -> Vec<Vector3<f64>> {
        let coords = frame.coords();
        self.equivalent_pairs(frame)
            .map(|(i, j)| {
                let d = coords[i] - coords[j];
                match axis {
                    Some(axis) => d - axis * d.dot(axis),
                    None => d,
                }
            })
            .collect()
    }

    fn equivalent_pairs<'f>(
        &self,
        frame: &'f CenteredFrame,
    ) -> impl Iterator<Item = (usize, usize)> + 'f {
        let atoms = frame.atoms();
        (0..atoms.len())
            .tuple_combinations()
            .filter(move |&(i, j)| atoms[i].is_equivalent_to(&atoms[j]))
    }

    /// Highest rotation order found among axes built from triplets of the smallest set of
    /// equivalent off-center atoms. C2 candidates come from pair sums, C3 to C5 from triangle
    /// normals.
    fn spherical_rotation_order(&self, frame: &CenteredFrame) -> Option<u32> {
        let coords = frame.coords();
        let atoms = frame.atoms();
        let off_center: Vec<usize> = (0..atoms.len())
            .filter(|&i| coords[i].norm() > self.tolerance)
            .collect();
        let test_set = off_center
            .iter()
            .map(|&i| {
                off_center
                    .iter()
                    .copied()
                    .filter(|&j| atoms[i].is_equivalent_to(&atoms[j]))
                    .collect::<Vec<_>>()
            })
            .min_by_key(Vec::len)?;

        let mut present = [false; 6];
        for (a, b, c) in test_set.iter().map(|&i| coords[i]).tuple_combinations() {
            if !present[2] {
                present[2] = [a + b, a + c, b + c].iter().any(|axis| {
                    axis.norm() > self.tolerance
                        && self.holds(frame, &SymmetryOperation::rotation(axis, 2))
                });
            }
            let normal = (b - a).cross(&(c - a));
            if normal.norm() > self.tolerance {
                for order in 3..=5 {
                    if !present[order as usize]
                        && self.holds(frame, &SymmetryOperation::rotation(&normal, order))
                    {
                        present[order as usize] = true;
                        break;
                    }
                }
            }
            if present[2] && present[3] && (present[4] || present[5]) {
                break;
            }
        }
        (2..=5u32).rev().find(|&order| present[order as usize]).filter(|&order| order >= 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    fn molecule(geometry: &[(&str, [f64; 3])]) -> Vec<Atom> {
        geometry.iter()
            .map(|(symbol, [x, y, z])| {
                Atom::new(Element::from_symbol(symbol).unwrap(), Point3::new(*x, *y, *z))
            })
            .collect()
    }

    fn ring(symbol: &str, count: usize, radius: f64, z: f64, phase_deg: f64) -> Vec<(&str, [f64; 3])> {
        (0..count)
            .map(|k| {
                let angle = (phase_deg + 360.0 * k as f64 / count as f64).to_radians();
                (symbol, [radius * angle.cos(), radius * angle.sin(), z])
            })
            .collect()
    }

    fn detect(geometry: &[(&str, [f64; 3])]) -> PointGroup {
        SymmetryDetector::default().detect(&molecule(geometry)).unwrap()
    }

    #[test]
    fn empty_input_reports_no_atoms() {
        assert_eq!(SymmetryDetector::default().detect(&[]), Err(GeometryError::NoAtoms));
    }

    #[test]
    fn single_atom_is_kh() {
        assert_eq!(detect(&[("Ne", [0.3, 0.0, 0.0])]), PointGroup::Kh);
    }

    #[test]
    fn linear_molecules_split_on_inversion() {
        let co2 = [("C", [0.0, 0.0, 0.0]), ("O", [0.0, 0.0, 1.16]), ("O", [0.0, 0.0, -1.16])];
        assert_eq!(detect(&co2), PointGroup::DInfH);
        let hcn = [("H", [0.0, 0.0, -1.07]), ("C", [0.0, 0.0, 0.0]), ("N", [0.0, 0.0, 1.16])];
        assert_eq!(detect(&hcn), PointGroup::CInfV);
    }

    #[test]
    fn water_is_c2v() {
        let water = [
            ("O", [0.0, 0.0, 0.1173]),
            ("H", [0.0, 0.7572, -0.4692]),
            ("H", [0.0, -0.7572, -0.4692]),
        ];
        assert_eq!(detect(&water), PointGroup::Cnv(2));
    }

    #[test]
    fn hydrogen_peroxide_is_c2() {
        let h2o2 = [
            ("O", [0.0, 0.7375, -0.0528]),
            ("O", [0.0, -0.7375, -0.0528]),
            ("H", [0.8190, 0.8170, 0.4220]),
            ("H", [-0.8190, -0.8170, 0.4220]),
        ];
        assert_eq!(detect(&h2o2), PointGroup::Cn(2));
    }

    #[test]
    fn ammonia_is_c3v() {
        let mut nh3 = vec![("N", [0.0, 0.0, 0.1])];
        nh3.extend(ring("H", 3, 0.94, -0.27, 0.0));
        assert_eq!(detect(&nh3), PointGroup::Cnv(3));
    }

    #[test]
    fn boron_trifluoride_is_d3h() {
        let mut bf3 = vec![("B", [0.0, 0.0, 0.0])];
        bf3.extend(ring("F", 3, 1.31, 0.0, 0.0));
        assert_eq!(detect(&bf3), PointGroup::Dnh(3));
    }

    #[test]
    fn benzene_is_d6h() {
        let mut benzene = ring("C", 6, 1.39, 0.0, 0.0);
        benzene.extend(ring("H", 6, 2.47, 0.0, 0.0));
        assert_eq!(detect(&benzene), PointGroup::Dnh(6));
    }

    #[test]
    fn staggered_ethane_is_d3d() {
        let mut ethane = vec![("C", [0.0, 0.0, 0.765]), ("C", [0.0, 0.0, -0.765])];
        ethane.extend(ring("H", 3, 1.02, 1.16, 0.0));
        ethane.extend(ring("H", 3, 1.02, -1.16, 60.0));
        assert_eq!(detect(&ethane), PointGroup::Dnd(3));
    }

    #[test]
    fn ethylene_is_d2h() {
        let ethylene = [
            ("C", [0.0, 0.0, 0.667]),
            ("C", [0.0, 0.0, -0.667]),
            ("H", [0.0, 0.923, 1.232]),
            ("H", [0.0, -0.923, 1.232]),
            ("H", [0.0, 0.923, -1.232]),
            ("H", [0.0, -0.923, -1.232]),
        ];
        assert_eq!(detect(&ethylene), PointGroup::Dnh(2));
    }

    #[test]
    fn methane_is_td() {
        let a = 0.629;
        let methane = [
            ("C", [0.0, 0.0, 0.0]),
            ("H", [a, a, a]),
            ("H", [a, -a, -a]),
            ("H", [-a, a, -a]),
            ("H", [-a, -a, a]),
        ];
        assert_eq!(detect(&methane), PointGroup::Td);
    }

    #[test]
    fn sulfur_hexafluoride_is_oh() {
        let d = 1.56;
        let sf6 = [
            ("S", [0.0, 0.0, 0.0]),
            ("F", [d, 0.0, 0.0]),
            ("F", [-d, 0.0, 0.0]),
            ("F", [0.0, d, 0.0]),
            ("F", [0.0, -d, 0.0]),
            ("F", [0.0, 0.0, d]),
            ("F", [0.0, 0.0, -d]),
        ];
        assert_eq!(detect(&sf6), PointGroup::Oh);
    }

    #[test]
    fn planar_hypochlorous_acid_is_cs() {
        let hocl = [
            ("O", [0.0, 0.0, 0.0]),
            ("H", [0.97, 0.0, 0.0]),
            ("Cl", [-0.31, 1.66, 0.0]),
        ];
        assert_eq!(detect(&hocl), PointGroup::Cs);
    }

    #[test]
    fn chiral_methane_derivative_is_c1() {
        let chfclbr = [
            ("C", [0.0, 0.0, 0.0]),
            ("H", [0.0, 0.0, 1.09]),
            ("F", [1.273, 0.0, -0.450]),
            ("Cl", [-0.834, 1.444, -0.589]),
            ("Br", [-0.914, -1.583, -0.646]),
        ];
        assert_eq!(detect(&chfclbr), PointGroup::C1);
    }
}
