use crate::error::{CliError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thermokit::core::thermo::{BavPreset, TreatmentKind};
use thermokit::engine::config::{MassMode, ScanRange, ScanStrategy};
use toml::{Table, Value};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConditions {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature_scan: Option<ScanRange>,
    pub pressure_scan: Option<ScanRange>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileScaling {
    pub zpe: Option<f64>,
    pub heat: Option<f64>,
    pub entropy: Option<f64>,
    pub heat_capacity: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileLowFrequency {
    pub treatment: Option<TreatmentKind>,
    pub raise_threshold: Option<f64>,
    pub interpolation_threshold: Option<f64>,
    pub bav: Option<BavPreset>,
    pub interpolate_energy: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileExecution {
    pub threads: Option<usize>,
    pub strategy: Option<ScanStrategy>,
    pub memory_limit_mb: Option<u64>,
    pub max_open_files: Option<usize>,
}

/// The settings file as written by the user. Every field is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub conditions: Option<FileConditions>,
    pub scaling: Option<FileScaling>,
    pub low_frequency: Option<FileLowFrequency>,
    pub execution: Option<FileExecution>,
    pub mass_mode: Option<MassMode>,
    pub condensed_phase: Option<bool>,
    pub imaginary_threshold: Option<f64>,
    pub energy: Option<f64>,
    pub point_group: Option<String>,
    pub print_level: Option<u8>,
    pub write_checkpoint: Option<bool>,
    pub write_mode_contributions: Option<bool>,
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_table(table: Table) -> Result<Self> {
        Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| CliError::Config(e.to_string()))
    }
}

/// Reads a settings file into an untyped table so overrides can be merged before validation.
pub fn read_table(path: &Path) -> Result<Table> {
    debug!("Reading settings from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| CliError::SettingsFile {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    toml::from_str(&content).map_err(|e: toml::de::Error| CliError::SettingsFile {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Applies `key=value` overrides. Dotted keys address nested tables; values are read as TOML
/// literals and fall back to plain strings.
pub fn apply_set_values(table: &mut Table, set_values: &[String]) -> Result<()> {
    for kv_pair in set_values {
        let Some((key, raw)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{kv_pair}'. Expected KEY=VALUE."
            )));
        };
        let segments: Vec<&str> = key.trim().split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(CliError::Config(format!("Invalid --set key: '{key}'")));
        }

        let mut current = &mut *table;
        for segment in &segments[..segments.len() - 1] {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            current = match entry {
                Value::Table(inner) => inner,
                _ => {
                    return Err(CliError::Config(format!(
                        "Cannot set '{key}': '{segment}' is not a table"
                    )));
                }
            };
        }
        let leaf = segments[segments.len() - 1];
        current.insert(leaf.to_string(), parse_literal(raw.trim()));
    }
    Ok(())
}

fn parse_literal(raw: &str) -> Value {
    toml::from_str::<Table>(&format!("value = {raw}"))
        .ok()
        .and_then(|mut t| t.remove("value"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
