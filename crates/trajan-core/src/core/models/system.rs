use super::atom::Atom;
use super::chain::Chain;
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::Residue;
use super::selection::Selection;
use crate::core::utils::identifiers::is_alpha_carbon;
use nalgebra::Point3;
use slotmap::SlotMap;
use std::collections::HashMap;

/// Represents a complete molecular system with atoms, residues and chains.
///
/// Besides the slot-map storage, the system remembers the order in which atoms
/// and chains were added. Trajectory frames index atoms by their position in
/// the structure file, so file order is part of the model.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues using a slot map for efficient ID management.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains using a slot map for efficient ID management.
    chains: SlotMap<ChainId, Chain>,
    /// Atom IDs in the order they were added (file order).
    atom_order: Vec<AtomId>,
    /// Chain IDs in the order they were first seen.
    chain_order: Vec<ChainId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over all atoms in file order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(AtomId, &Atom)` pairs.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atom_order
            .iter()
            .filter_map(|&id| self.atoms.get(id).map(|atom| (id, atom)))
    }

    /// Returns the number of atoms in the system.
    pub fn atom_count(&self) -> usize {
        self.atom_order.len()
    }

    /// Returns `true` if the system holds no atoms.
    pub fn is_empty(&self) -> bool {
        self.atom_order.is_empty()
    }

    /// Returns an iterator over all residues in the system.
    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues.iter()
    }

    /// Retrieves an immutable reference to a chain by its ID.
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Returns an iterator over all chains in the order they were first added.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(|&id| self.chains.get(id).map(|chain| (id, chain)))
    }

    /// Adds a new chain to the system or returns the existing one.
    ///
    /// This method is idempotent; if a chain with the given ID already exists,
    /// it returns the existing chain ID without creating a duplicate.
    pub fn add_chain(&mut self, id: char) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id));
        self.chain_id_map.insert(id, chain_id);
        self.chain_order.push(chain_id);
        chain_id
    }

    /// Appends a new residue to a chain.
    ///
    /// Residues are never looked up by key: a key that re-appears after other
    /// residues (e.g. solvent segments restarting their numbering) gets a new
    /// residue, so non-contiguous records never merge.
    ///
    /// # Return
    ///
    /// Returns `Some(ResidueId)` if successful, otherwise `None` if the chain doesn't exist.
    pub fn push_residue(
        &mut self,
        chain_id: ChainId,
        residue_number: isize,
        insertion_code: char,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let residue_id = self
            .residues
            .insert(Residue::new(residue_number, insertion_code, name, chain_id));
        chain.residues.push(residue_id);
        Some(residue_id)
    }

    /// Adds an atom to a specific residue.
    ///
    /// # Return
    ///
    /// Returns `Some(AtomId)` if successful, otherwise `None` if the residue doesn't exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }

        let atom_id = self.atoms.insert(atom);
        self.atom_order.push(atom_id);
        self.residues[residue_id].add_atom(atom_id);

        Some(atom_id)
    }

    /// Returns the coordinates of every atom in file order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.atoms_iter().map(|(_, atom)| atom.position).collect()
    }

    /// Selects the backbone alpha carbons of all amino-acid residues.
    ///
    /// The selection keeps file order and records each atom's file-order index,
    /// its reference position and the sequence number of its residue.
    pub fn select_alpha_carbons(&self) -> Selection {
        let mut selection = Selection::new(self.atom_count());
        for (index, (_, atom)) in self.atoms_iter().enumerate() {
            let Some(residue) = self.residues.get(atom.residue_id) else {
                continue;
            };
            if is_alpha_carbon(&atom.name, &residue.name) {
                selection.push(index, atom.position, residue.number);
            }
        }
        selection
    }
}
