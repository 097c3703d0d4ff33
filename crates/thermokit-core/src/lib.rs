//! # ThermoKit Core Library
//!
//! Statistical thermochemistry from quantum-chemistry program outputs: zero-point energy,
//! thermal corrections to U, H and G, entropy, heat capacities and partition functions.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same strict three-layer separation throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularRecord`, `ThermoSystem`),
//!   geometry and point-group analysis, the statistical-mechanics formulas and the program
//!   loaders.
//!
//! - **[`engine`]: The Logic Core.** Validated configuration, the error taxonomy, record
//!   preparation, the resource governor (memory, threads, file handles, diagnostics,
//!   cancellation), the temperature/pressure scan orchestrator and result writers.
//!
//! - **[`workflows`]: The Public API.** Single-file and batch entry points that tie `engine` and
//!   `core` together and always return structured outcomes.

pub mod core;
pub mod engine;
pub mod workflows;
