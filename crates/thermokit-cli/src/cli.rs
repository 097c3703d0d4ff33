use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use thermokit::core::thermo::{BavPreset, TreatmentKind};
use thermokit::engine::config::{MassMode, ScanStrategy};

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ThermoKit CLI - Statistical thermochemistry (ZPE, U, H, G, S, CV, partition functions) from quantum-chemistry program outputs.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of threads to use. Capped at the physical (or scheduler-allocated) core count.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute thermochemistry for one or more program outputs, checkpoints or file lists.
    Thermo(ThermoArgs),
    /// Print the program each file was produced by.
    Identify(IdentifyArgs),
}

/// Arguments for the `thermo` subcommand.
#[derive(Args, Debug, Default)]
pub struct ThermoArgs {
    /// Input files: program outputs, `.otm` checkpoints, or `.list`/`.txt` file lists.
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    // --- Conditions ---
    /// Temperature in K.
    #[arg(short = 'T', long, value_name = "K")]
    pub temperature: Option<f64>,

    /// Scan temperatures from LOW to HIGH (inclusive) in steps of STEP.
    #[arg(long, num_args = 3, value_names = ["LOW", "HIGH", "STEP"])]
    pub temp_scan: Option<Vec<f64>>,

    /// Pressure in atm.
    #[arg(short = 'P', long, value_name = "ATM")]
    pub pressure: Option<f64>,

    /// Scan pressures from LOW to HIGH (inclusive) in steps of STEP.
    #[arg(long, num_args = 3, value_names = ["LOW", "HIGH", "STEP"])]
    pub pressure_scan: Option<Vec<f64>>,

    // --- Frequency scaling ---
    /// Scale factor applied to frequencies for the zero-point energy.
    #[arg(long, value_name = "FACTOR")]
    pub scale_zpe: Option<f64>,

    /// Scale factor applied to frequencies for the thermal energy.
    #[arg(long, value_name = "FACTOR")]
    pub scale_heat: Option<f64>,

    /// Scale factor applied to frequencies for the entropy.
    #[arg(long, value_name = "FACTOR")]
    pub scale_entropy: Option<f64>,

    /// Scale factor applied to frequencies for the heat capacity.
    #[arg(long = "scale-cv", value_name = "FACTOR")]
    pub scale_cv: Option<f64>,

    // --- Low-frequency treatment ---
    /// Treatment of low-frequency modes.
    #[arg(long, value_enum, value_name = "TREATMENT")]
    pub low_vib_treatment: Option<TreatmentArg>,

    /// Truhlar: wavenumber (cm^-1) that lower modes are raised to.
    #[arg(long, value_name = "CM-1")]
    pub ravib: Option<f64>,

    /// Free-rotor schemes: interpolation threshold (cm^-1).
    #[arg(long, value_name = "CM-1")]
    pub intpvib: Option<f64>,

    /// Average moment of inertia preset for the free-rotor reference.
    #[arg(long, value_enum, value_name = "PRESET")]
    pub bav: Option<BavArg>,

    /// Head-Gordon: interpolate the thermal energy as well as the entropy.
    #[arg(long)]
    pub hg_energy: bool,

    // --- System ---
    /// Source of atomic masses.
    #[arg(long, value_enum, value_name = "MODE")]
    pub mass_mode: Option<MassModeArg>,

    /// Phase model: 0 gas, 1 condensed (translation and rotation omitted).
    #[arg(long, value_name = "0|1", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub ipmode: Option<u8>,

    /// Treat imaginary frequencies smaller than this magnitude (cm^-1) as real.
    #[arg(long, value_name = "CM-1")]
    pub imag_real: Option<f64>,

    /// Electronic energy in Hartree, replacing the one read from the file.
    #[arg(short = 'E', long, value_name = "HARTREE", allow_hyphen_values = true)]
    pub energy: Option<f64>,

    /// Point group to use instead of the detected one (e.g. C2v, D*h).
    #[arg(long, value_name = "GROUP")]
    pub point_group: Option<String>,

    // --- Output ---
    /// Write a `.otm` checkpoint of every loaded record.
    #[arg(long)]
    pub output_otm: bool,

    /// Write the contribution of every vibrational mode to `<basename>.vibcon`.
    #[arg(long)]
    pub vibcon: bool,

    /// Console detail: 0 silent, 1 final quantities, 2 adds system data, 3 adds every mode.
    #[arg(long, value_name = "0-3", value_parser = clap::value_parser!(u8).range(0..=3))]
    pub print_level: Option<u8>,

    /// Directory for scan tables and checkpoints. Defaults to each input's directory.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    // --- Execution ---
    /// How scan work is spread across threads.
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub strategy: Option<StrategyArg>,

    /// Memory ceiling in MB. Derived from system memory when unset.
    #[arg(long, value_name = "MB")]
    pub memory_limit: Option<u64>,

    /// Maximum number of input files open at once.
    #[arg(long, value_name = "NUM")]
    pub max_open_files: Option<usize>,

    // --- Settings ---
    /// Settings file in TOML format.
    #[arg(short, long, value_name = "PATH", conflicts_with = "no_settings")]
    pub config: Option<PathBuf>,

    /// Ignore any settings file.
    #[arg(long)]
    pub no_settings: bool,

    /// Set a settings value, overriding the settings file.
    /// Can be used multiple times. Example: -S low-frequency.treatment=grimme
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `identify` subcommand.
#[derive(Args, Debug)]
pub struct IdentifyArgs {
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreatmentArg {
    Harmonic,
    Truhlar,
    Grimme,
    Minenkov,
    HeadGordon,
}

impl From<TreatmentArg> for TreatmentKind {
    fn from(arg: TreatmentArg) -> Self {
        match arg {
            TreatmentArg::Harmonic => TreatmentKind::Harmonic,
            TreatmentArg::Truhlar => TreatmentKind::Truhlar,
            TreatmentArg::Grimme => TreatmentKind::Grimme,
            TreatmentArg::Minenkov => TreatmentKind::Minenkov,
            TreatmentArg::HeadGordon => TreatmentKind::HeadGordon,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BavArg {
    Grimme,
    QChem,
}

impl From<BavArg> for BavPreset {
    fn from(arg: BavArg) -> Self {
        match arg {
            BavArg::Grimme => BavPreset::Grimme,
            BavArg::QChem => BavPreset::QChem,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassModeArg {
    Average,
    Isotope,
    Reported,
}

impl From<MassModeArg> for MassMode {
    fn from(arg: MassModeArg) -> Self {
        match arg {
            MassModeArg::Average => MassMode::Average,
            MassModeArg::Isotope => MassMode::Isotope,
            MassModeArg::Reported => MassMode::Reported,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Auto,
    GridPoints,
    PerMode,
    Serial,
}

impl From<StrategyArg> for ScanStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => ScanStrategy::Auto,
            StrategyArg::GridPoints => ScanStrategy::GridPoints,
            StrategyArg::PerMode => ScanStrategy::PerMode,
            StrategyArg::Serial => ScanStrategy::Serial,
        }
    }
}
