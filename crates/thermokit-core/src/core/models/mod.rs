//! # Core Models Module
//!
//! Plain data types describing a molecule as it comes out of a quantum-chemistry program.
//!
//! - [`element`] - Static periodic-table data (symbols, average and isotope masses)
//! - [`atom`] - A single atom with element, mass and Cartesian position
//! - [`record`] - The [`record::MolecularRecord`] produced by every loader: atoms, vibrational
//!   wavenumbers, electronic energy, spin multiplicity and electronic levels
//!
//! Records carry no derived data; inertia, symmetry and thermochemistry are computed from them
//! by the [`crate::core::symmetry`] and [`crate::core::thermo`] modules.

pub mod atom;
pub mod element;
pub mod record;
