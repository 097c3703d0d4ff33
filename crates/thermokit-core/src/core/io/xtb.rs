use super::error::LoadError;
use super::gaussian::parse_gaussian_format;
use super::program::ProgramKind;
use super::traits::OutputLoader;
use crate::core::models::record::MolecularRecord;

/// The Gaussian-style `g98.out` written by `xtb --hess`. It carries the geometry and
/// frequencies only; the electronic energy must come from an external override.
pub struct XtbLoader;

impl OutputLoader for XtbLoader {
    fn program(&self) -> ProgramKind {
        ProgramKind::Xtb
    }

    fn parse(&self, text: &str) -> Result<MolecularRecord, LoadError> {
        parse_gaussian_format(text, ProgramKind::Xtb)
    }
}
