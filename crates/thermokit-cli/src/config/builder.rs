use super::file::{self, FileConfig};
use super::locate;
use crate::cli::ThermoArgs;
use crate::error::{CliError, Result};
use thermokit::engine::config::{ScanRange, ThermoConfig, ThermoConfigBuilder};
use toml::Table;

/// Resolves the settings file and `-S` overrides, then layers the command-line options on top.
pub fn build_config(args: &ThermoArgs, threads: Option<usize>) -> Result<ThermoConfig> {
    let file_config = load_file_config(args)?;
    merge(args, threads, file_config)
}

fn load_file_config(args: &ThermoArgs) -> Result<FileConfig> {
    let mut table = match locate::settings_path(args.config.as_deref(), args.no_settings) {
        Some(path) => file::read_table(&path)?,
        None => Table::new(),
    };
    file::apply_set_values(&mut table, &args.set_values)?;
    FileConfig::from_table(table)
}

fn set<T>(
    builder: ThermoConfigBuilder,
    value: Option<T>,
    apply: impl FnOnce(ThermoConfigBuilder, T) -> ThermoConfigBuilder,
) -> ThermoConfigBuilder {
    match value {
        Some(v) => apply(builder, v),
        None => builder,
    }
}

fn flag(enabled: bool) -> Option<bool> {
    enabled.then_some(true)
}

fn scan_from_args(values: Option<&Vec<f64>>, option: &str) -> Result<Option<ScanRange>> {
    match values.map(Vec::as_slice) {
        None => Ok(None),
        Some(&[low, high, step]) => Ok(Some(ScanRange::new(low, high, step))),
        Some(other) => Err(CliError::Argument(format!(
            "--{option} takes LOW HIGH STEP, got {} value(s)",
            other.len()
        ))),
    }
}

fn merge(args: &ThermoArgs, threads: Option<usize>, file: FileConfig) -> Result<ThermoConfig> {
    let conditions = file.conditions.unwrap_or_default();
    let scaling = file.scaling.unwrap_or_default();
    let low = file.low_frequency.unwrap_or_default();
    let execution = file.execution.unwrap_or_default();

    let temperature_scan =
        scan_from_args(args.temp_scan.as_ref(), "temp-scan")?.or(conditions.temperature_scan);
    let pressure_scan =
        scan_from_args(args.pressure_scan.as_ref(), "pressure-scan")?.or(conditions.pressure_scan);
    let condensed_phase = args.ipmode.map(|mode| mode == 1).or(file.condensed_phase);

    let mut builder = ThermoConfig::builder();
    builder = set(builder, args.temperature.or(conditions.temperature), ThermoConfigBuilder::temperature);
    builder = set(builder, args.pressure.or(conditions.pressure), ThermoConfigBuilder::pressure);
    builder = set(builder, temperature_scan, ThermoConfigBuilder::temperature_scan);
    builder = set(builder, pressure_scan, ThermoConfigBuilder::pressure_scan);

    builder = set(builder, args.scale_zpe.or(scaling.zpe), ThermoConfigBuilder::scale_zpe);
    builder = set(builder, args.scale_heat.or(scaling.heat), ThermoConfigBuilder::scale_heat);
    builder = set(builder, args.scale_entropy.or(scaling.entropy), ThermoConfigBuilder::scale_entropy);
    builder = set(
        builder,
        args.scale_cv.or(scaling.heat_capacity),
        ThermoConfigBuilder::scale_heat_capacity,
    );

    builder = set(
        builder,
        args.low_vib_treatment.map(Into::into).or(low.treatment),
        ThermoConfigBuilder::treatment,
    );
    builder = set(builder, args.ravib.or(low.raise_threshold), ThermoConfigBuilder::raise_threshold);
    builder = set(
        builder,
        args.intpvib.or(low.interpolation_threshold),
        ThermoConfigBuilder::interpolation_threshold,
    );
    builder = set(builder, args.bav.map(Into::into).or(low.bav), ThermoConfigBuilder::bav);
    builder = set(
        builder,
        flag(args.hg_energy).or(low.interpolate_energy),
        ThermoConfigBuilder::interpolate_energy,
    );

    builder = set(builder, args.mass_mode.map(Into::into).or(file.mass_mode), ThermoConfigBuilder::mass_mode);
    builder = set(builder, condensed_phase, ThermoConfigBuilder::condensed_phase);
    builder = set(
        builder,
        args.imag_real.or(file.imaginary_threshold),
        ThermoConfigBuilder::imaginary_threshold,
    );
    builder = set(builder, args.energy.or(file.energy), ThermoConfigBuilder::external_energy);
    builder = set(
        builder,
        args.point_group.clone().or(file.point_group),
        |b, hint: String| b.point_group_hint(hint),
    );

    builder = set(builder, args.print_level.or(file.print_level), ThermoConfigBuilder::print_level);
    builder = set(
        builder,
        flag(args.output_otm).or(file.write_checkpoint),
        ThermoConfigBuilder::write_checkpoint,
    );
    builder = set(
        builder,
        flag(args.vibcon).or(file.write_mode_contributions),
        ThermoConfigBuilder::write_mode_contributions,
    );
    builder = set(builder, args.output_dir.clone().or(file.output_dir), ThermoConfigBuilder::output_dir);

    builder = set(builder, threads.or(execution.threads), ThermoConfigBuilder::threads);
    builder = set(builder, args.strategy.map(Into::into).or(execution.strategy), ThermoConfigBuilder::strategy);
    builder = set(
        builder,
        args.memory_limit.or(execution.memory_limit_mb),
        ThermoConfigBuilder::memory_limit_mb,
    );
    builder = set(
        builder,
        args.max_open_files.or(execution.max_open_files),
        ThermoConfigBuilder::max_open_files,
    );

    Ok(builder.build()?)
}
