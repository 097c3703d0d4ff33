//! Settings resolution for the `thermo` command.
//!
//! Values come from four layers, highest precedence first: command-line options, `-S key=value`
//! overrides, the settings file, and the library defaults of
//! [`ThermoConfigBuilder`](thermokit::engine::config::ThermoConfigBuilder).

pub mod builder;
pub mod file;
pub mod locate;

pub use builder::build_config;
