//! Reading quantum-chemistry program outputs and checkpoint files.
//!
//! [`program::ProgramKind`] classifies an input file (by extension for checkpoints and batch
//! manifests, by banner otherwise) and hands out the matching [`traits::OutputLoader`]. Each
//! loader turns the text of one output into a [`MolecularRecord`](crate::core::models::record::MolecularRecord);
//! loaders never compute anything beyond unit conversion.

pub mod checkpoint;
pub mod cp2k;
pub mod error;
pub mod gamess;
pub mod gaussian;
pub mod nwchem;
pub mod orca;
pub mod program;
pub mod qchem;
pub(crate) mod text;
pub mod traits;
pub mod vasp;
pub mod xtb;

pub use error::LoadError;
pub use program::ProgramKind;
pub use traits::OutputLoader;
