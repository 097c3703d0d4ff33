use super::error::LoadError;
use super::program::ProgramKind;
use crate::core::models::record::MolecularRecord;
use std::fs;
use std::path::Path;

/// Turns the text output of one quantum-chemistry program into a [`MolecularRecord`].
///
/// Implementors extract the final geometry, the final electronic energy (Hartree), the
/// vibrational wavenumbers with imaginary modes signed negative, the spin multiplicity and,
/// where the program prints them, atomic masses. Rigid-body (translational and rotational)
/// modes must not appear in the returned wavenumbers.
pub trait OutputLoader: Send + Sync {
    /// The program whose output this loader understands.
    fn program(&self) -> ProgramKind;

    /// Parses the full text of an output file.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a required section is missing or malformed.
    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError>;

    /// Reads the file at `path` and parses it. Invalid UTF-8 sequences are replaced rather than
    /// rejected, since several programs echo binary garbage from their input decks.
    fn load(&self, path: &Path) -> Result<MolecularRecord, LoadError> {
        let bytes = fs::read(path)?;
        self.parse(&String::from_utf8_lossy(&bytes))
    }
}
