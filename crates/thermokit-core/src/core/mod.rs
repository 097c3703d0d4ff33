//! # Core Module
//!
//! The stateless foundation of ThermoKit: data models, geometry, statistical mechanics and
//! program-output parsing. Nothing here holds configuration or spawns threads.
//!
//! ## Architecture
//!
//! - **Constants** ([`constants`]) - CODATA 2018 physical constants and unit conversions
//! - **Molecular Representation** ([`models`]) - Elements, atoms and the molecular record
//! - **Geometry & Symmetry** ([`symmetry`]) - Inertia analysis, point groups, symmetry numbers
//! - **Statistical Mechanics** ([`thermo`]) - Partition functions and low-frequency treatments
//! - **File I/O** ([`io`]) - Program detection, one loader per program, checkpoint files
//!
//! ## Data Flow
//!
//! A loader from [`io`] turns a program output into a [`models::record::MolecularRecord`].
//! Once completed by the engine's preparation step, the record is frozen into a
//! [`thermo::ThermoSystem`] together with its [`symmetry`] facts, and a
//! [`thermo::ThermoCalculator`] evaluates it at any number of (T, P) points.

pub mod constants;
pub mod io;
pub mod models;
pub mod symmetry;
pub mod thermo;
