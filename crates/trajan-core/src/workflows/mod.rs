//! # Workflows Module
//!
//! High-level entry points that run a complete analysis from input files to
//! result series.
//!
//! - **Trajectory Analysis** ([`analyze`]) - Per-frame RMSD and per-residue RMSF of
//!   a DCD trajectory against a PDB reference, streamed in bounded chunks.

pub mod analyze;
