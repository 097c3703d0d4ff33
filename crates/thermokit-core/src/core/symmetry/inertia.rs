use crate::core::constants::BOHR_TO_ANGSTROM;
use crate::core::models::atom::Atom;
use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use thiserror::Error;

/// Sum of principal moments (amu·Bohr²) below which the system is a single point mass.
pub const SINGLE_ATOM_THRESHOLD: f64 = 1e-10;
/// Smallest principal moment (amu·Bohr²) below which the system is linear.
pub const LINEAR_THRESHOLD: f64 = 1e-3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("No atoms loaded")]
    NoAtoms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotorKind {
    Atom,
    Linear,
    Nonlinear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InertiaAnalysis {
    /// Total mass in amu.
    pub total_mass: f64,
    /// Center of mass in Angstroms.
    pub center_of_mass: Point3<f64>,
    /// Principal moments in amu·Bohr², ascending.
    pub moments: [f64; 3],
    /// Unit principal axes, in the same order as `moments`.
    pub axes: [Vector3<f64>; 3],
    pub rotor: RotorKind,
}

impl InertiaAnalysis {
    #[inline]
    pub fn is_linear(&self) -> bool {
        self.rotor == RotorKind::Linear
    }

    #[inline]
    pub fn is_single_atom(&self) -> bool {
        self.rotor == RotorKind::Atom
    }
}

pub fn center_of_mass(atoms: &[Atom]) -> Result<Point3<f64>, GeometryError> {
    if atoms.is_empty() {
        return Err(GeometryError::NoAtoms);
    }
    let total_mass: f64 = atoms.iter().map(|a| a.mass).sum();
    let weighted = atoms
        .iter()
        .fold(Vector3::zeros(), |acc, a| acc + a.position.coords * a.mass);
    Ok(Point3::from(weighted / total_mass))
}

/// Inertia tensor about the center of mass, amu·Bohr².
pub fn inertia_tensor(atoms: &[Atom]) -> Result<Matrix3<f64>, GeometryError> {
    let com = center_of_mass(atoms)?;
    let mut tensor = Matrix3::zeros();
    for atom in atoms {
        let r = (atom.position - com) / BOHR_TO_ANGSTROM;
        let r2 = r.norm_squared();
        tensor += (Matrix3::identity() * r2 - r * r.transpose()) * atom.mass;
    }
    Ok(tensor)
}

pub fn analyze(atoms: &[Atom]) -> Result<InertiaAnalysis, GeometryError> {
    let tensor = inertia_tensor(atoms)?;
    let center_of_mass = center_of_mass(atoms)?;
    let total_mass = atoms.iter().map(|a| a.mass).sum();

    let eigen = SymmetricEigen::new(tensor);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    // Numerical noise can leave tiny negative eigenvalues for point masses and linear systems.
    let moments = order.map(|i| eigen.eigenvalues[i].max(0.0));
    let axes = order.map(|i| eigen.eigenvectors.column(i).normalize());

    let rotor = if moments.iter().sum::<f64>() < SINGLE_ATOM_THRESHOLD {
        RotorKind::Atom
    } else if moments[0] < LINEAR_THRESHOLD {
        RotorKind::Linear
    } else {
        RotorKind::Nonlinear
    };

    Ok(InertiaAnalysis {
        total_mass,
        center_of_mass,
        moments,
        axes,
        rotor,
    })
}
