//! # Core Module
//!
//! Fundamental building blocks for trajectory analysis.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains and systems
//! - **File I/O** ([`io`]) - PDB reference structures, DCD trajectories and result export
//! - **Utilities** ([`utils`]) - Residue/atom identifiers and superposition geometry

pub mod io;
pub mod models;
pub mod utils;
