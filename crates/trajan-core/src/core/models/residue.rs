use super::ids::{AtomId, ChainId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: isize,             // Residue sequence number from source file
    pub insertion_code: char,      // Insertion code, ' ' when absent
    pub name: String,              // Name of the residue (e.g., "ALA", "GLY")
    pub chain_id: ChainId,         // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>, // Atoms belonging to this residue, in file order
}

impl Residue {
    pub(crate) fn new(number: isize, insertion_code: char, name: &str, chain_id: ChainId) -> Self {
        Self {
            number,
            insertion_code,
            name: name.to_string(),
            chain_id,
            atoms: Vec::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_id: AtomId) {
        self.atoms.push(atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    fn dummy_chain_id(n: u64) -> ChainId {
        ChainId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let chain_id = dummy_chain_id(1);
        let residue = Residue::new(10, ' ', "GLY", chain_id);
        assert_eq!(residue.number, 10);
        assert_eq!(residue.insertion_code, ' ');
        assert_eq!(residue.name, "GLY");
        assert_eq!(residue.chain_id, chain_id);
        assert!(residue.atoms().is_empty());
    }

    #[test]
    fn add_atom_keeps_file_order() {
        let mut residue = Residue::new(7, 'A', "SER", dummy_chain_id(3));
        let n = dummy_atom_id(1);
        let ca = dummy_atom_id(2);
        residue.add_atom(n);
        residue.add_atom(ca);
        assert_eq!(residue.atoms(), &[n, ca]);
    }
}
