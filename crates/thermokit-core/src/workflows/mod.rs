//! # Workflows Module
//!
//! Top-level entry points that take input files from disk to finished results.
//!
//! ## Overview
//!
//! A workflow resolves the program behind each input, loads and prepares the record,
//! evaluates it at one point or over a temperature/pressure grid, and writes the scan
//! tables. All shared limits come from the [`RunContext`](crate::engine::context::RunContext)
//! passed in, so one governor, cancellation token and progress reporter serve every file.
//!
//! ## Architecture
//!
//! - **Batch** ([`batch`]) - The entry point. Runs files concurrently within the thread
//!   budget, keeps outcomes in input order, and routes file lists to the ensemble workflow.
//! - **Single file** ([`thermo`]) - Loading, preparation, scan or single point, reporting.
//! - **Ensemble** ([`ensemble`]) - Single points for every file of a list, combined with
//!   Boltzmann weights from their Gibbs energies.

pub mod batch;
pub mod ensemble;
pub mod thermo;

pub use batch::run;
pub use thermo::{FileOutcome, RunOutcome};
