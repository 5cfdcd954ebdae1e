//! Provides input/output functionality for the file formats an analysis touches.
//!
//! Reference structures are read through the [`traits::MolecularFile`] trait
//! ([`pdb`]). Trajectories are streamed frame range by frame range through
//! [`dcd::DcdReader`], which never loads more frames than requested. Result
//! series are exported as CSV by [`results`].

pub mod dcd;
pub mod pdb;
pub mod results;
pub mod traits;
