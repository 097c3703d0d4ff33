//! # Engine Module
//!
//! The stateful layer between the stateless [`crate::core`] and the public workflows.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - [`config::ThermoConfig`] and its validating builder
//! - **Error Handling** ([`error`]) - The [`error::EngineError`] taxonomy every workflow reports
//! - **Preparation** ([`prepare`]) - Mass policy, default levels, checkpoints, imaginary modes,
//!   point-group hints and treatment selection
//! - **Scanning** ([`scan`]) - Grid enumeration, parallel strategy selection and evaluation
//! - **Output** ([`output`], [`report`]) - `.UHG`/`.SCq` tables and the console report
//! - **Resource Governor** ([`governor`]) - Memory, threads, file handles and diagnostics
//! - **Run Services** ([`context`], [`cancel`], [`progress`]) - What a front end passes in
//!
//! Only the governor's counters and diagnostics are mutated concurrently; everything else
//! is either owned by one task or read-only.

pub mod cancel;
pub mod config;
pub mod context;
pub mod error;
pub mod governor;
pub mod output;
pub mod prepare;
pub mod progress;
pub mod report;
pub mod scan;
