use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::dcd::DcdError;
use crate::core::io::pdb::PdbError;

/// Coarse classification of an [`AnalysisError`], for callers that branch on
/// the kind of failure rather than its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoAlphaCarbonAtoms,
    AtomCountMismatch,
    IoFailure,
    ParseFailure,
    Unknown,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No alpha-carbon (CA) atoms found in the PDB file!")]
    NoAlphaCarbonAtoms,

    #[error(
        "Atom count mismatch in frame {frame}: trajectory has {found} atoms, reference has {alpha_carbons} alpha-carbons out of {reference_atoms} atoms"
    )]
    AtomCountMismatch {
        frame: usize,
        found: usize,
        alpha_carbons: usize,
        reference_atoms: usize,
    },

    #[error("Trajectory contains no frames")]
    EmptyTrajectory,

    #[error("Failed to read reference structure: {source}")]
    Structure {
        #[from]
        source: PdbError,
    },

    #[error("Failed to read trajectory: {source}")]
    Trajectory {
        #[from]
        source: DcdError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoAlphaCarbonAtoms => ErrorKind::NoAlphaCarbonAtoms,
            Self::AtomCountMismatch { .. } => ErrorKind::AtomCountMismatch,
            Self::Structure { source } => match source {
                PdbError::Io(_) => ErrorKind::IoFailure,
                _ => ErrorKind::ParseFailure,
            },
            Self::Trajectory { source } => match source {
                DcdError::Io(_) => ErrorKind::IoFailure,
                DcdError::FrameOutOfRange { .. } => ErrorKind::Unknown,
                _ => ErrorKind::ParseFailure,
            },
            Self::EmptyTrajectory | Self::Config { .. } | Self::Internal(_) => ErrorKind::Unknown,
        }
    }
}
