//! # TRAJAN Core Library
//!
//! Structural deviation analysis of molecular dynamics trajectories: per-frame
//! RMSD against a fixed reference conformation and per-residue RMSF over the
//! aligned ensemble, computed while streaming the trajectory in bounded chunks.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`),
//!   file readers for reference structures (PDB) and trajectories (DCD), and
//!   pure geometry such as least-squares superposition.
//!
//! - **[`engine`]: The Logic Core.** Analysis configuration, typed errors,
//!   progress reporting and the coordinate `Ensemble` that superposes frames
//!   and accumulates RMSD/RMSF statistics.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into
//!   complete procedures. [`workflows::analyze::run`] takes a reference path and
//!   a trajectory path and returns the four result series.

pub mod core;
pub mod engine;
pub mod workflows;
