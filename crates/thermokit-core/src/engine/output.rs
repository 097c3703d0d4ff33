use super::error::EngineError;
use crate::core::thermo::ThermoResult;
use crate::core::thermo::calculator::{to_cal, to_kcal};
use crate::engine::report::write_mode_rows;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const UHG_HEADER: &str = "Ucorr, Hcorr and Gcorr are in kcal/mol; U, H and G are in a.u.";
const UHG_COLUMNS: &str =
    "     T(K)      P(atm)  Ucorr     Hcorr     Gcorr            U                H                G";
const SCQ_HEADER: &str = "S, CV and CP are in cal/mol/K; q(V=0)/NA and q(bot)/NA are unitless";
const SCQ_COLUMNS: &str =
    "    T(K)       P(atm)    S         CV        CP        q(V=0)/NA      q(bot)/NA";
const VIBCON_HEADER: &str = "Contributions of each vibrational mode; ZPE and U in kcal/mol, S and CV in cal/mol/K";

/// `<dir>/<input stem>.<extension>`, where `dir` defaults to the input's own directory.
pub fn output_path(input: &Path, output_dir: Option<&Path>, extension: &str) -> PathBuf {
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let mut name: OsString = input
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("thermo"));
    name.push(".");
    name.push(extension);
    dir.join(name)
}

/// C-style `%W.Pe`: mantissa, `e`, signed exponent of at least two digits, right-aligned.
pub fn format_scientific(value: f64, width: usize, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{value:>width$}");
    }
    let raw = format!("{value:.precision$e}");
    let formatted = match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => raw,
    };
    format!("{formatted:>width$}")
}

pub fn write_uhg(writer: &mut impl Write, results: &[ThermoResult]) -> io::Result<()> {
    writeln!(writer, "{UHG_HEADER}")?;
    writeln!(writer)?;
    writeln!(writer, "{UHG_COLUMNS}")?;
    for r in results {
        writeln!(
            writer,
            "{:10.3}{:10.3}{:10.3}{:10.3}{:10.3}{:17.6}{:17.6}{:17.6}",
            r.conditions.temperature,
            r.conditions.pressure,
            to_kcal(r.u_correction()),
            to_kcal(r.h_correction()),
            to_kcal(r.g_correction()),
            r.u_total(),
            r.h_total(),
            r.g_total(),
        )?;
    }
    Ok(())
}

pub fn write_scq(writer: &mut impl Write, results: &[ThermoResult]) -> io::Result<()> {
    writeln!(writer, "{SCQ_HEADER}")?;
    writeln!(writer)?;
    writeln!(writer, "{SCQ_COLUMNS}")?;
    for r in results {
        writeln!(
            writer,
            "{:10.3}{:10.3}{:10.3}{:10.3}{:10.3}{}{}",
            r.conditions.temperature,
            r.conditions.pressure,
            to_cal(r.entropy()),
            to_cal(r.heat_capacity_v()),
            to_cal(r.heat_capacity_p()),
            format_scientific(r.q_v0_per_avogadro(), 16, 6),
            format_scientific(r.q_bot_per_avogadro(), 16, 6),
        )?;
    }
    Ok(())
}

/// Per-mode contributions, one block per (T, P) point in the order of `results`.
pub fn write_vibcon(writer: &mut impl Write, wavenumbers: &[f64], results: &[ThermoResult]) -> io::Result<()> {
    writeln!(writer, "{VIBCON_HEADER}")?;
    for r in results {
        let mut block = String::new();
        write_mode_rows(&mut block, wavenumbers.iter().copied(), r)
            .map_err(|_| io::Error::other("formatting mode contributions failed"))?;
        writeln!(writer)?;
        writeln!(
            writer,
            " T = {:.3} K, P = {:.3} atm",
            r.conditions.temperature, r.conditions.pressure
        )?;
        write!(writer, "{block}")?;
    }
    Ok(())
}

fn write_table(
    path: &Path,
    results: &[ThermoResult],
    write: fn(&mut BufWriter<File>, &[ThermoResult]) -> io::Result<()>,
) -> Result<(), EngineError> {
    let io_result = File::create(path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write(&mut writer, results)?;
        writer.flush()
    });
    io_result.map_err(|e| EngineError::write(path, e))
}

/// Writes `<stem>.UHG` and `<stem>.SCq` with one row per result, in the given order.
pub fn write_scan_tables(
    input: &Path,
    output_dir: Option<&Path>,
    results: &[ThermoResult],
) -> Result<Vec<PathBuf>, EngineError> {
    let uhg = output_path(input, output_dir, "UHG");
    write_table(&uhg, results, |w, r| write_uhg(w, r))?;
    let scq = output_path(input, output_dir, "SCq");
    write_table(&scq, results, |w, r| write_scq(w, r))?;
    Ok(vec![uhg, scq])
}

/// Writes `<stem>.vibcon` with the per-mode contributions of every result.
pub fn write_mode_table(
    input: &Path,
    output_dir: Option<&Path>,
    wavenumbers: &[f64],
    results: &[ThermoResult],
) -> Result<PathBuf, EngineError> {
    let path = output_path(input, output_dir, "vibcon");
    let io_result = File::create(&path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write_vibcon(&mut writer, wavenumbers, results)?;
        writer.flush()
    });
    io_result.map_err(|e| EngineError::write(&path, e))?;
    Ok(path)
}
