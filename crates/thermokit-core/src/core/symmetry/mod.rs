//! # Symmetry & Geometry Module
//!
//! Rigid-rotor analysis of a molecular geometry.
//!
//! - [`inertia`] - Center of mass, inertia tensor and principal moments (amu·Bohr²), with the
//!   single-atom / linear / nonlinear rotor classification used by the partition functions
//! - [`operations`] - Rotations, reflections, improper rotations and the tolerance-based test of
//!   whether a geometry is invariant under one of them
//! - [`point_group`] - The closed set of Schoenflies groups and their rotational symmetry numbers
//! - [`detector`] - Point-group assignment by searching candidate operations
//!
//! Every entry point rejects an empty atom list with [`inertia::GeometryError::NoAtoms`] before
//! doing any arithmetic.

pub mod detector;
pub mod inertia;
pub mod operations;
pub mod point_group;

pub use detector::SymmetryDetector;
pub use inertia::{GeometryError, InertiaAnalysis, RotorKind};
pub use point_group::PointGroup;
