use super::config::{MassMode, ThermoConfig};
use super::error::EngineError;
use super::governor::diagnostics::DiagnosticsCollector;
use super::output::output_path;
use crate::core::io::ProgramKind;
use crate::core::io::checkpoint::write_checkpoint_file;
use crate::core::models::record::{ElectronicLevel, MolecularRecord};
use crate::core::symmetry::{PointGroup, SymmetryDetector};
use crate::core::thermo::ThermoSystem;
use crate::core::thermo::treatment::{LowFrequencyTreatment, resolve_bav};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A record turned into an immutable system, plus what preparation wrote or changed.
#[derive(Debug)]
pub struct PreparedSystem {
    pub system: ThermoSystem,
    pub checkpoint: Option<PathBuf>,
    /// Imaginary modes reclassified as real.
    pub reclassified: usize,
}

/// Completes a loaded record and freezes it, with its symmetry, into a [`ThermoSystem`].
///
/// Order: mass policy, default electronic levels, optional checkpoint, external energy,
/// imaginary-mode reclassification, geometry and symmetry analysis. The checkpoint therefore
/// stores the loaded energy, never the override.
pub fn prepare_system(
    mut record: MolecularRecord,
    config: &ThermoConfig,
    source: &Path,
    diagnostics: &DiagnosticsCollector,
) -> Result<PreparedSystem, EngineError> {
    if record.atoms.is_empty() {
        return Err(EngineError::NoAtomsLoaded);
    }

    if record.program != ProgramKind::Checkpoint {
        apply_mass_policy(&mut record, config.mass_mode);
    }
    ensure_electronic_levels(&mut record);

    let checkpoint = if config.output.write_checkpoint {
        let path = output_path(source, config.output.output_dir.as_deref(), "otm");
        write_checkpoint_file(&record, &path).map_err(|e| EngineError::write(&path, e))?;
        info!("Checkpoint written to {}", path.display());
        Some(path)
    } else {
        None
    };

    if let Some(energy) = config.external_energy {
        debug!(loaded = record.electronic_energy, external = energy, "Overriding electronic energy");
        record.electronic_energy = energy;
    }

    let reclassified = reclassify_imaginary(&mut record, config.imaginary_threshold);
    if reclassified > 0 {
        info!(
            "{reclassified} imaginary mode(s) below {} cm^-1 treated as real",
            config.imaginary_threshold
        );
    }
    let remaining = record.imaginary_count();
    if remaining > 0 {
        let message = format!("{remaining} imaginary frequency(ies) excluded from the vibrational sums");
        warn!("{}: {message}", source.display());
        diagnostics.warning(Some(source), message);
    }

    let system = ThermoSystem::analyze(record, &SymmetryDetector::new())?;
    let system = apply_point_group_hint(system, config.point_group_hint.as_deref(), source, diagnostics);
    debug!(
        point_group = %system.point_group(),
        symmetry_number = system.symmetry_number(),
        rotor = ?system.inertia().rotor,
        "Geometry analyzed"
    );

    Ok(PreparedSystem {
        system,
        checkpoint,
        reclassified,
    })
}

pub fn apply_mass_policy(record: &mut MolecularRecord, mode: MassMode) {
    for atom in &mut record.atoms {
        atom.mass = match mode {
            MassMode::Average => atom.element.average_mass,
            MassMode::Isotope => atom.element.isotope_mass,
            MassMode::Reported => atom.reported_mass.unwrap_or(atom.element.average_mass),
        };
    }
}

/// Supplies the ground level (degeneracy = spin multiplicity) when none were loaded.
pub fn ensure_electronic_levels(record: &mut MolecularRecord) {
    if record.electronic_levels.is_empty() {
        record
            .electronic_levels
            .push(ElectronicLevel::ground_state(record.spin_multiplicity));
    }
}

/// Flips imaginary modes with a magnitude below `threshold` to real; returns how many.
pub fn reclassify_imaginary(record: &mut MolecularRecord, threshold: f64) -> usize {
    let mut count = 0;
    for w in record.wavenumbers.iter_mut().filter(|w| **w < 0.0 && w.abs() < threshold) {
        *w = w.abs();
        count += 1;
    }
    count
}

fn apply_point_group_hint(
    system: ThermoSystem,
    hint: Option<&str>,
    source: &Path,
    diagnostics: &DiagnosticsCollector,
) -> ThermoSystem {
    let Some(hint) = hint else {
        return system;
    };
    match hint.parse::<PointGroup>() {
        Ok(group) => {
            let detected = system.detected_point_group();
            if group != detected {
                let message = format!("Point group {group} given, but {detected} was detected; using {group}");
                warn!("{}: {message}", source.display());
                diagnostics.warning(Some(source), message);
            }
            system.with_point_group(group)
        }
        Err(err) => {
            let message = format!("Ignoring point group hint: {err}");
            warn!("{}: {message}", source.display());
            diagnostics.warning(Some(source), message);
            system
        }
    }
}

/// Instantiates the configured treatment, downgrading an inapplicable Bav preset.
pub fn build_treatment(
    config: &ThermoConfig,
    source: Option<&Path>,
    diagnostics: &DiagnosticsCollector,
) -> Box<dyn LowFrequencyTreatment> {
    let resolution = resolve_bav(config.low_frequency.treatment, config.low_frequency.bav);
    if let Some(message) = resolution.warning {
        warn!("{message}");
        diagnostics.warning(source, message);
    }
    config.treatment_parameters(resolution.value).build()
}
