use phf::{Set, phf_set};

pub const ALPHA_CARBON_NAME: &str = "CA";

// Standard amino acids plus the protonation, modified and force-field variants
// commonly written by simulation packages.
static PROTEIN_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "HSD", "HSE", "HSP", "HID", "HIE", "HIP", "HSC", "HSN",
    "CYX", "CYM", "ASH", "GLH", "LYN", "ASX", "GLX", "XLE", "XAA",
    "MSE", "SEP", "TPO", "PTR", "CSO", "HYP", "SEC", "PYL", "MLY", "ORN",
    "NALA", "CALA",
};

pub fn is_protein_residue(residue_name: &str) -> bool {
    PROTEIN_RESIDUE_NAMES.contains(residue_name.trim())
}

/// Returns `true` for the backbone alpha carbon of an amino-acid residue.
///
/// The residue check keeps calcium ions, which are also named `CA`, out of the
/// selection.
pub fn is_alpha_carbon(atom_name: &str, residue_name: &str) -> bool {
    atom_name.trim() == ALPHA_CARBON_NAME && is_protein_residue(residue_name)
}
