use super::checkpoint::CheckpointLoader;
use super::cp2k::Cp2kLoader;
use super::gamess::GamessLoader;
use super::gaussian::GaussianLoader;
use super::nwchem::NwChemLoader;
use super::orca::OrcaLoader;
use super::qchem::QChemLoader;
use super::traits::OutputLoader;
use super::vasp::VaspLoader;
use super::xtb::XtbLoader;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// The kind of input a file represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Gaussian,
    Orca,
    Gamess,
    NwChem,
    Cp2k,
    Vasp,
    Xtb,
    QChem,
    /// A `.otm` checkpoint written by this library.
    Checkpoint,
    /// A newline-delimited list of input files.
    BatchManifest,
    Unknown,
}

impl ProgramKind {
    /// Classifies a file, by extension for checkpoints and manifests and by content otherwise.
    pub fn detect(path: &Path) -> io::Result<ProgramKind> {
        if let Some(kind) = Self::from_extension(path) {
            return Ok(kind);
        }
        let bytes = fs::read(path)?;
        Ok(Self::from_content(&String::from_utf8_lossy(&bytes)))
    }

    pub fn from_extension(path: &Path) -> Option<ProgramKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "otm" => Some(ProgramKind::Checkpoint),
            "list" | "txt" => Some(ProgramKind::BatchManifest),
            _ => None,
        }
    }

    /// Matches program banners. The first matching signature wins.
    pub fn from_content(text: &str) -> ProgramKind {
        let first_line = text.lines().next().unwrap_or("").trim_start();
        if text.contains("Gaussian, Inc.") {
            ProgramKind::Gaussian
        } else if text.contains("Entering Gaussian System") || text.contains("x T B") {
            ProgramKind::Xtb
        } else if text.contains("O   R   C   A") {
            ProgramKind::Orca
        } else if text.contains("GAMESS VERSION")
            || (text.contains("GAMESS") && text.contains("IOWA STATE UNIVERSITY"))
        {
            ProgramKind::Gamess
        } else if text.contains("Northwest Computational Chemistry Package") {
            ProgramKind::NwChem
        } else if text.contains("CP2K|") {
            ProgramKind::Cp2k
        } else if first_line.starts_with("vasp.") || text.contains("POTCAR:") {
            ProgramKind::Vasp
        } else if text.contains("Q-Chem") {
            ProgramKind::QChem
        } else {
            ProgramKind::Unknown
        }
    }

    /// The loader that parses this kind of file, if it holds a single molecule.
    pub fn loader(&self) -> Option<&'static dyn OutputLoader> {
        match self {
            ProgramKind::Gaussian => Some(&GaussianLoader),
            ProgramKind::Orca => Some(&OrcaLoader),
            ProgramKind::Gamess => Some(&GamessLoader),
            ProgramKind::NwChem => Some(&NwChemLoader),
            ProgramKind::Cp2k => Some(&Cp2kLoader),
            ProgramKind::Vasp => Some(&VaspLoader),
            ProgramKind::Xtb => Some(&XtbLoader),
            ProgramKind::QChem => Some(&QChemLoader),
            ProgramKind::Checkpoint => Some(&CheckpointLoader),
            ProgramKind::BatchManifest | ProgramKind::Unknown => None,
        }
    }
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgramKind::Gaussian => "Gaussian",
            ProgramKind::Orca => "ORCA",
            ProgramKind::Gamess => "GAMESS-US",
            ProgramKind::NwChem => "NWChem",
            ProgramKind::Cp2k => "CP2K",
            ProgramKind::Vasp => "VASP",
            ProgramKind::Xtb => "xTB",
            ProgramKind::QChem => "Q-Chem",
            ProgramKind::Checkpoint => "checkpoint",
            ProgramKind::BatchManifest => "batch manifest",
            ProgramKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn extensions_take_precedence_over_content() {
        assert_eq!(
            ProgramKind::from_extension(Path::new("mol.OTM")),
            Some(ProgramKind::Checkpoint)
        );
        assert_eq!(
            ProgramKind::from_extension(Path::new("conformers.list")),
            Some(ProgramKind::BatchManifest)
        );
        assert_eq!(
            ProgramKind::from_extension(Path::new("files.txt")),
            Some(ProgramKind::BatchManifest)
        );
        assert_eq!(ProgramKind::from_extension(Path::new("job.log")), None);
        assert_eq!(ProgramKind::from_extension(Path::new("OUTCAR")), None);
    }

    #[test]
    fn banners_identify_programs() {
        let cases = [
            (" Copyright (c) 1988-2019, Gaussian, Inc.  All Rights Reserved.", ProgramKind::Gaussian),
            ("                 * O   R   C   A *", ProgramKind::Orca),
            ("          GAMESS VERSION = 30 SEP 2021 (R2)", ProgramKind::Gamess),
            ("              Northwest Computational Chemistry Package (NWChem) 7.0.2", ProgramKind::NwChem),
            (" CP2K| version string:  CP2K version 9.1", ProgramKind::Cp2k),
            ("vasp.6.3.0 20Jan22 (build Mar 01 2022) complex", ProgramKind::Vasp),
            (" Entering Gaussian System, Link 0=g98", ProgramKind::Xtb),
            ("                  Welcome to Q-Chem", ProgramKind::QChem),
            ("nothing recognizable here", ProgramKind::Unknown),
        ];
        for (text, expected) in cases {
            assert_eq!(ProgramKind::from_content(text), expected, "{text}");
        }
    }

    #[test]
    fn gaussian_banner_wins_over_link_zero_line() {
        let text = " Entering Gaussian System, Link 0=g16\n Gaussian, Inc.";
        assert_eq!(ProgramKind::from_content(text), ProgramKind::Gaussian);
    }

    #[test]
    fn detect_reads_file_content() {
        let mut file = NamedTempFile::with_suffix(".out").unwrap();
        writeln!(file, "  * O   R   C   A *").unwrap();
        assert_eq!(ProgramKind::detect(file.path()).unwrap(), ProgramKind::Orca);
    }

    #[test]
    fn every_single_molecule_kind_has_a_loader() {
        for kind in [
            ProgramKind::Gaussian,
            ProgramKind::Orca,
            ProgramKind::Gamess,
            ProgramKind::NwChem,
            ProgramKind::Cp2k,
            ProgramKind::Vasp,
            ProgramKind::Xtb,
            ProgramKind::QChem,
            ProgramKind::Checkpoint,
        ] {
            assert_eq!(kind.loader().unwrap().program(), kind);
        }
        assert!(ProgramKind::BatchManifest.loader().is_none());
        assert!(ProgramKind::Unknown.loader().is_none());
    }
}
