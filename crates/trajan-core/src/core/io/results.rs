use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Column length mismatch: {expected} residues but {found} values")]
    LengthMismatch { expected: usize, found: usize },
}

#[derive(Debug, Serialize)]
struct RmsdRow {
    frame: usize,
    rmsd: f64,
}

#[derive(Debug, Serialize)]
struct RmsfRow {
    residue_index: usize,
    residue_number: isize,
    rmsf: f64,
}

/// Writes one `frame,rmsd` row per frame, with 1-based frame numbers.
pub fn write_rmsd_csv<W: Write>(writer: W, rmsd: &[f64]) -> Result<(), ResultsError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (index, &value) in rmsd.iter().enumerate() {
        csv_writer.serialize(RmsdRow {
            frame: index + 1,
            rmsd: value,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes one `residue_index,residue_number,rmsf` row per selected residue.
pub fn write_rmsf_csv<W: Write>(
    writer: W,
    residue_numbers: &[isize],
    rmsf: &[f64],
) -> Result<(), ResultsError> {
    if residue_numbers.len() != rmsf.len() {
        return Err(ResultsError::LengthMismatch {
            expected: residue_numbers.len(),
            found: rmsf.len(),
        });
    }
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (index, (&residue_number, &value)) in residue_numbers.iter().zip(rmsf).enumerate() {
        csv_writer.serialize(RmsfRow {
            residue_index: index + 1,
            residue_number,
            rmsf: value,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_rmsd_csv_to_path<P: AsRef<Path>>(path: P, rmsd: &[f64]) -> Result<(), ResultsError> {
    let file = std::fs::File::create(path)?;
    write_rmsd_csv(io::BufWriter::new(file), rmsd)
}

pub fn write_rmsf_csv_to_path<P: AsRef<Path>>(
    path: P,
    residue_numbers: &[isize],
    rmsf: &[f64],
) -> Result<(), ResultsError> {
    let file = std::fs::File::create(path)?;
    write_rmsf_csv(io::BufWriter::new(file), residue_numbers, rmsf)
}
