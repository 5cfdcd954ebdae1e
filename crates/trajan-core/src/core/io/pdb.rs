use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::ids::{ChainId, ResidueId};
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    pub header_lines: Vec<String>,
    pub skipped_alt_locs: usize,
    pub ignored_models: bool,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must reach column 54)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> char {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .unwrap_or(' ')
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_optional_float(line: &str, start: usize, end: usize, default: f64) -> f64 {
    slice_and_trim(line, start, end).parse().unwrap_or(default)
}

/// Reader for the fixed-column Protein Data Bank format.
///
/// Only the first model is read. Atoms with an alternate location other than
/// blank or `A` are skipped. Consecutive records with the same chain, residue
/// number, insertion code and residue name form one residue.
pub struct PdbFile;

impl MolecularFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut system = MolecularSystem::new();
        let mut metadata = PdbMetadata::default();

        let mut current_chain: Option<(char, ChainId)> = None;
        let mut current_residue: Option<((isize, char, String), ResidueId)> = None;
        let mut seen_model = false;
        let mut model_complete = false;

        let mut buffer = Vec::new();
        let mut line_num = 0;
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            line_num += 1;
            // Free-text records may carry legacy encodings; only ASCII columns are parsed.
            let text = String::from_utf8_lossy(&buffer);
            let line = text.trim_end_matches(['\n', '\r']);
            let record_type = slice_and_trim(line, 0, 6);

            match record_type {
                "ATOM" | "HETATM" => {
                    if model_complete {
                        metadata.ignored_models = true;
                        break;
                    }
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let alt_loc = column_char(line, 16);
                    if alt_loc != ' ' && alt_loc != 'A' {
                        metadata.skipped_alt_locs += 1;
                        continue;
                    }

                    let name = slice_and_trim(line, 12, 16);
                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let res_name = slice_and_trim(line, 17, 21);
                    let chain_char = column_char(line, 21);

                    let res_seq_str = slice_and_trim(line, 22, 26);
                    let res_seq: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "23-26".into(),
                            value: res_seq_str.into(),
                        },
                    })?;
                    let insertion_code = column_char(line, 26);

                    let x = parse_float(line, line_num, 30, 38)?;
                    let y = parse_float(line, line_num, 38, 46)?;
                    let z = parse_float(line, line_num, 46, 54)?;

                    // Serials overflow five columns in large systems; fall back to file order.
                    let serial = slice_and_trim(line, 6, 11)
                        .parse()
                        .unwrap_or(system.atom_count() + 1);

                    let chain_id = match current_chain {
                        Some((id, chain_id)) if id == chain_char => chain_id,
                        _ => {
                            let chain_id = system.add_chain(chain_char);
                            current_chain = Some((chain_char, chain_id));
                            current_residue = None;
                            chain_id
                        }
                    };

                    let residue_key = (res_seq, insertion_code, res_name.to_string());
                    let residue_id = match &current_residue {
                        Some((key, residue_id)) if *key == residue_key => *residue_id,
                        _ => {
                            let residue_id = system
                                .push_residue(chain_id, res_seq, insertion_code, res_name)
                                .ok_or_else(|| {
                                    PdbError::MissingRecord(format!("chain '{}'", chain_char))
                                })?;
                            current_residue = Some((residue_key, residue_id));
                            residue_id
                        }
                    };

                    let mut atom = Atom::new(name, residue_id, Point3::new(x, y, z));
                    atom.serial = serial;
                    atom.occupancy = parse_optional_float(line, 54, 60, 1.0);
                    atom.b_factor = parse_optional_float(line, 60, 66, 0.0);
                    atom.element = slice_and_trim(line, 76, 78).to_string();
                    system.add_atom_to_residue(residue_id, atom);
                }
                "MODEL" => {
                    if seen_model {
                        metadata.ignored_models = true;
                        break;
                    }
                    seen_model = true;
                }
                "ENDMDL" => model_complete = true,
                "END" => break,
                "TER" | "ANISOU" | "CONECT" | "MASTER" => {}
                _ => {
                    if system.is_empty() && !line.trim().is_empty() {
                        metadata.header_lines.push(line.to_string());
                    }
                }
            }
        }

        if system.is_empty() {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        debug!(
            "Parsed PDB structure with {} atoms ({} alternate locations skipped).",
            system.atom_count(),
            metadata.skipped_alt_locs
        );
        Ok((system, metadata))
    }
}
