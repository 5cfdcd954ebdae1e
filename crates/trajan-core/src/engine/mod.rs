//! # Engine Module
//!
//! Analysis machinery shared by the workflows: parameters, error types,
//! progress reporting and the coordinate ensemble.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Chunk size and frame limits, built and validated
//!   through [`config::AnalysisConfigBuilder`]
//! - **Error Handling** ([`error`]) - [`error::AnalysisError`] and the coarse
//!   [`error::ErrorKind`] classification callers branch on
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Ensemble** ([`ensemble`]) - Frame superposition onto a fixed reference,
//!   per-frame RMSD and per-atom RMSF

pub mod config;
pub mod ensemble;
pub mod error;
pub mod progress;
