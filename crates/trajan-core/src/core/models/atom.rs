use super::ids::ResidueId;
use nalgebra::Point3;

/// Represents an atom of a reference structure.
///
/// Atoms carry the identity needed to select them (name, parent residue) and
/// the coordinates that serve as the superposition target. Trajectory frames
/// only store coordinates, so everything else here comes from the structure
/// file.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The serial number from the source file.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "N", "O").
    pub name: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The element symbol, empty when the source file does not provide one.
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Occupancy of the recorded position.
    pub occupancy: f64,
    /// Isotropic temperature factor.
    pub b_factor: f64,
}

impl Atom {
    /// Creates a new `Atom` with default values for most fields.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `residue_id` - The ID of the residue this atom belongs to.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            residue_id,
            element: String::new(),
            position,
            occupancy: 1.0,
            b_factor: 0.0,
        }
    }
}
