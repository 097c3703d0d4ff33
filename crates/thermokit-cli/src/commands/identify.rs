use crate::cli::IdentifyArgs;
use crate::error::{CliError, Result};
use std::path::Path;
use thermokit::core::io::program::ProgramKind;
use tracing::debug;

pub fn run(args: IdentifyArgs) -> Result<()> {
    for path in &args.files {
        let kind = identify(path)?;
        println!("{}: {}", path.display(), kind);
    }
    Ok(())
}

fn identify(path: &Path) -> Result<ProgramKind> {
    if !path.is_file() {
        return Err(CliError::Argument(format!(
            "Input file not found: {}",
            path.display()
        )));
    }
    let kind = ProgramKind::detect(path)?;
    debug!(path = %path.display(), %kind, "Classified input");
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_by_banner_and_extension() {
        let dir = tempdir().unwrap();
        let orca = dir.path().join("job.out");
        fs::write(&orca, "                                 * O   R   C   A *\n").unwrap();
        let list = dir.path().join("conformers.list");
        fs::write(&list, "a.log\n").unwrap();
        let other = dir.path().join("notes.dat");
        fs::write(&other, "nothing to see\n").unwrap();

        assert_eq!(identify(&orca).unwrap(), ProgramKind::Orca);
        assert_eq!(identify(&list).unwrap(), ProgramKind::BatchManifest);
        assert_eq!(identify(&other).unwrap(), ProgramKind::Unknown);
    }

    #[test]
    fn missing_file_is_an_argument_error() {
        let dir = tempdir().unwrap();
        let result = identify(&dir.path().join("absent.log"));
        assert!(matches!(result, Err(CliError::Argument(_))));
    }
}
