//! # Core Models Module
//!
//! Data structures that represent the reference structure of an analysis.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom with name, serial, element and coordinates
//! - [`residue`] - Residue grouping of atoms, keyed by number and insertion code
//! - [`chain`] - Ordered residue list under a single-character identifier
//! - [`system`] - Complete molecular system in file order
//! - [`selection`] - Atom subsets (alpha carbons) and how trajectory frames map onto them
//! - [`ids`] - Stable identifier types for atoms, residues, and chains
//!
//! ## Usage
//!
//! ```ignore
//! use trajan::core::models::{atom::Atom, system::MolecularSystem};
//!
//! let mut system = MolecularSystem::new();
//! let chain_id = system.add_chain('A');
//! let residue_id = system.push_residue(chain_id, 1, ' ', "ALA")?;
//! system.add_atom_to_residue(residue_id, Atom::new("CA", residue_id, Point3::origin()))?;
//!
//! let calpha = system.select_alpha_carbons();
//! ```

pub mod atom;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod selection;
pub mod system;
