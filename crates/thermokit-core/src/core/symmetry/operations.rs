use crate::core::models::atom::Atom;
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use std::f64::consts::PI;

/// A point-symmetry operation about the origin, stored as an orthogonal 3×3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryOperation {
    matrix: Matrix3<f64>,
}

impl SymmetryOperation {
    pub fn inversion() -> Self {
        Self {
            matrix: -Matrix3::identity(),
        }
    }

    /// Proper rotation by 2π/order about `axis`.
    pub fn rotation(axis: &Vector3<f64>, order: u32) -> Self {
        let angle = 2.0 * PI / order as f64;
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle);
        Self {
            matrix: rotation.into_inner(),
        }
    }

    /// Reflection through the plane with the given normal.
    pub fn reflection(normal: &Vector3<f64>) -> Self {
        let n = normal.normalize();
        Self {
            matrix: Matrix3::identity() - 2.0 * n * n.transpose(),
        }
    }

    /// Rotation by 2π/order about `axis` followed by reflection through the perpendicular plane.
    pub fn improper_rotation(axis: &Vector3<f64>, order: u32) -> Self {
        let rotation = Self::rotation(axis, order);
        let reflection = Self::reflection(axis);
        Self {
            matrix: reflection.matrix * rotation.matrix,
        }
    }

    #[inline]
    pub fn apply(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.matrix * point
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }
}

/// Atoms expressed relative to their center of mass, ready for operation testing.
#[derive(Debug)]
pub struct CenteredFrame<'a> {
    atoms: &'a [Atom],
    coords: Vec<Vector3<f64>>,
}

impl<'a> CenteredFrame<'a> {
    pub fn new(atoms: &'a [Atom], center: &Vector3<f64>) -> Self {
        let coords = atoms.iter().map(|a| a.position.coords - center).collect();
        Self { atoms, coords }
    }

    pub fn atoms(&self) -> &'a [Atom] {
        self.atoms
    }

    pub fn coords(&self) -> &[Vector3<f64>] {
        &self.coords
    }

    /// Whether `op` maps every atom onto an equivalent atom within `tolerance` (Angstroms).
    pub fn is_invariant_under(&self, op: &SymmetryOperation, tolerance: f64) -> bool {
        self.coords.iter().zip(self.atoms).all(|(coord, atom)| {
            let image = op.apply(coord);
            self.coords
                .iter()
                .zip(self.atoms)
                .any(|(other, other_atom)| {
                    atom.is_equivalent_to(other_atom) && (other - image).norm() < tolerance
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    const EPS: f64 = 1e-12;

    #[test]
    fn rotation_by_quarter_turn_maps_x_onto_y() {
        let op = SymmetryOperation::rotation(&Vector3::z(), 4);
        let image = op.apply(&Vector3::x());
        assert!((image - Vector3::y()).norm() < EPS);
    }

    #[test]
    fn reflection_flips_only_the_normal_component() {
        let op = SymmetryOperation::reflection(&Vector3::new(0.0, 0.0, 2.0));
        let image = op.apply(&Vector3::new(1.0, 2.0, 3.0));
        assert!((image - Vector3::new(1.0, 2.0, -3.0)).norm() < EPS);
    }

    #[test]
    fn improper_rotation_of_order_two_is_inversion() {
        let s2 = SymmetryOperation::improper_rotation(&Vector3::new(1.0, 1.0, 0.0), 2);
        let inversion = SymmetryOperation::inversion();
        assert!((s2.matrix() - inversion.matrix()).norm() < EPS);
    }

    #[test]
    fn frame_detects_invariance_with_equivalent_atoms_only() {
        let h = Element::from_symbol("H").unwrap();
        let f = Element::from_symbol("F").unwrap();
        let atoms = vec![
            Atom::new(h, Point3::new(1.0, 0.0, 0.0)),
            Atom::new(f, Point3::new(-1.0, 0.0, 0.0)),
        ];
        let frame = CenteredFrame::new(&atoms, &Vector3::zeros());
        let c2 = SymmetryOperation::rotation(&Vector3::z(), 2);
        assert!(!frame.is_invariant_under(&c2, 0.05));
        let mirror = SymmetryOperation::reflection(&Vector3::y());
        assert!(frame.is_invariant_under(&mirror, 0.05));
    }
}
