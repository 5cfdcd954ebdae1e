use nalgebra::Point3;

/// How the atoms of a trajectory frame correspond to a [`Selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLayout {
    /// The frame stores exactly the selected atoms, in selection order.
    Selected,
    /// The frame stores every atom of the source structure, in file order.
    Full,
}

/// An ordered subset of the atoms of a [`MolecularSystem`](super::system::MolecularSystem).
///
/// The selection remembers where each atom sits in the full structure so that
/// frames written for the whole system can be reduced to the subset.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    indices: Vec<usize>,
    positions: Vec<Point3<f64>>,
    residue_numbers: Vec<isize>,
    source_atom_count: usize,
}

impl Selection {
    pub(crate) fn new(source_atom_count: usize) -> Self {
        Self {
            indices: Vec::new(),
            positions: Vec::new(),
            residue_numbers: Vec::new(),
            source_atom_count,
        }
    }

    pub(crate) fn push(&mut self, index: usize, position: Point3<f64>, residue_number: isize) {
        self.indices.push(index);
        self.positions.push(position);
        self.residue_numbers.push(residue_number);
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// File-order indices of the selected atoms within the source structure.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Reference coordinates of the selected atoms.
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Residue sequence numbers of the selected atoms, as written in the source file.
    pub fn residue_numbers(&self) -> &[isize] {
        &self.residue_numbers
    }

    /// Total number of atoms in the structure the selection was taken from.
    pub fn source_atom_count(&self) -> usize {
        self.source_atom_count
    }

    /// Decides how frames with `frame_atoms` atoms map onto this selection.
    ///
    /// Returns `None` when the frame size matches neither the selection nor
    /// the full source structure.
    pub fn frame_layout(&self, frame_atoms: usize) -> Option<FrameLayout> {
        if frame_atoms == self.len() {
            Some(FrameLayout::Selected)
        } else if frame_atoms == self.source_atom_count {
            Some(FrameLayout::Full)
        } else {
            None
        }
    }

    /// Reduces a frame to the selected atoms.
    ///
    /// Returns `None` if the frame is shorter than the layout requires.
    pub fn extract(&self, frame: &[Point3<f64>], layout: FrameLayout) -> Option<Vec<Point3<f64>>> {
        match layout {
            FrameLayout::Selected => (frame.len() == self.len()).then(|| frame.to_vec()),
            FrameLayout::Full => self
                .indices
                .iter()
                .map(|&index| frame.get(index).copied())
                .collect(),
        }
    }
}
