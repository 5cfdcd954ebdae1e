//! Reader and writer for CHARMM/NAMD binary DCD trajectories.
//!
//! A DCD file is a sequence of Fortran unformatted records, each framed by a
//! leading and trailing 32-bit byte count. The header holds three records
//! (control block, titles, atom count); each frame then stores an optional
//! unit-cell record followed by one record per axis (X, Y, Z) of `f32`
//! coordinates, plus an optional fourth-dimension record.
//!
//! Every frame has the same size, so [`DcdReader`] derives the frame count
//! from the file size and seeks straight to any frame range.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

const HEADER_RECORD_LEN: i32 = 84;
const TITLE_LINE_LEN: usize = 80;
const UNIT_CELL_RECORD_LEN: i32 = 48;
const MAGIC: &[u8; 4] = b"CORD";
const CHARMM_VERSION: i32 = 24;

/// Coordinates of every atom of one frame, in Angstroms.
pub type Coordinates = Vec<Point3<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

#[derive(Debug, Error)]
pub enum DcdError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid DCD header: {0}")]
    BadHeader(String),
    #[error("Unsupported DCD feature: {0}")]
    Unsupported(String),
    #[error("Corrupt record in frame {frame}: expected {expected} bytes, found marker {found}")]
    BadRecord {
        frame: usize,
        expected: i32,
        found: i32,
    },
    #[error("Frame range {start}..{stop} is outside the trajectory ({available} frames)")]
    FrameOutOfRange {
        start: usize,
        stop: usize,
        available: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DcdHeader {
    pub endianness: Endianness,
    pub declared_frames: usize,
    pub first_step: i32,
    pub step_interval: i32,
    pub timestep: f32,
    pub n_atoms: usize,
    pub has_unit_cell: bool,
    pub has_fourth_dimension: bool,
    pub charmm_version: i32,
    pub titles: Vec<String>,
}

fn read_i32(reader: &mut impl Read, endianness: Endianness) -> io::Result<i32> {
    match endianness {
        Endianness::Little => reader.read_i32::<LittleEndian>(),
        Endianness::Big => reader.read_i32::<BigEndian>(),
    }
}

fn i32_at(bytes: &[u8], index: usize, endianness: Endianness) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[index * 4..index * 4 + 4]);
    match endianness {
        Endianness::Little => i32::from_le_bytes(raw),
        Endianness::Big => i32::from_be_bytes(raw),
    }
}

fn f32_at(bytes: &[u8], index: usize, endianness: Endianness) -> f32 {
    f32::from_bits(i32_at(bytes, index, endianness) as u32)
}

/// Streaming, seekable reader over a DCD file.
#[derive(Debug)]
pub struct DcdReader {
    reader: BufReader<File>,
    header: DcdHeader,
    header_size: u64,
    frame_size: u64,
    n_frames: usize,
    axis_buffer: Vec<f32>,
}

impl DcdReader {
    /// Opens a DCD file and parses its header without touching any frame data.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DcdError> {
        let file = File::open(path.as_ref())?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let header = read_header(&mut reader)?;
        let header_size = reader.stream_position()?;

        let axis_record = 8 + 4 * header.n_atoms as u64;
        let mut frame_size = 3 * axis_record;
        if header.has_unit_cell {
            frame_size += 8 + UNIT_CELL_RECORD_LEN as u64;
        }
        if header.has_fourth_dimension {
            frame_size += axis_record;
        }

        let payload = file_len.saturating_sub(header_size);
        let n_frames = (payload / frame_size) as usize;
        if payload % frame_size != 0 {
            warn!(
                "DCD file has {} trailing bytes after {} complete frames; ignoring them.",
                payload % frame_size,
                n_frames
            );
        }
        if header.declared_frames != n_frames {
            debug!(
                "DCD header declares {} frames but file size holds {}; using file size.",
                header.declared_frames, n_frames
            );
        }

        Ok(Self {
            reader,
            header,
            header_size,
            frame_size,
            n_frames,
            axis_buffer: Vec::new(),
        })
    }

    pub fn header(&self) -> &DcdHeader {
        &self.header
    }

    pub fn n_atoms(&self) -> usize {
        self.header.n_atoms
    }

    /// Number of complete frames stored in the file.
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Reads frames `start..stop` (half-open) in order.
    pub fn read_frames(&mut self, start: usize, stop: usize) -> Result<Vec<Coordinates>, DcdError> {
        if start > stop || stop > self.n_frames {
            return Err(DcdError::FrameOutOfRange {
                start,
                stop,
                available: self.n_frames,
            });
        }

        let offset = self.header_size + start as u64 * self.frame_size;
        self.reader.seek(SeekFrom::Start(offset))?;

        let mut frames = Vec::with_capacity(stop - start);
        for frame_index in start..stop {
            frames.push(self.read_frame(frame_index)?);
        }
        Ok(frames)
    }

    fn read_frame(&mut self, frame_index: usize) -> Result<Coordinates, DcdError> {
        let n_atoms = self.header.n_atoms;
        if self.header.has_unit_cell {
            self.skip_record(frame_index, UNIT_CELL_RECORD_LEN)?;
        }

        let mut coords = vec![Point3::origin(); n_atoms];
        for axis in 0..3 {
            self.read_axis(frame_index)?;
            for (point, &value) in coords.iter_mut().zip(self.axis_buffer.iter()) {
                point[axis] = value as f64;
            }
        }

        if self.header.has_fourth_dimension {
            self.skip_record(frame_index, 4 * n_atoms as i32)?;
        }
        Ok(coords)
    }

    fn read_axis(&mut self, frame_index: usize) -> Result<(), DcdError> {
        let endianness = self.header.endianness;
        let expected = 4 * self.header.n_atoms as i32;
        self.expect_marker(frame_index, expected)?;
        self.axis_buffer.resize(self.header.n_atoms, 0.0);
        match endianness {
            Endianness::Little => self
                .reader
                .read_f32_into::<LittleEndian>(&mut self.axis_buffer)?,
            Endianness::Big => self.reader.read_f32_into::<BigEndian>(&mut self.axis_buffer)?,
        }
        self.expect_marker(frame_index, expected)
    }

    fn skip_record(&mut self, frame_index: usize, expected: i32) -> Result<(), DcdError> {
        self.expect_marker(frame_index, expected)?;
        self.reader.seek_relative(expected as i64)?;
        self.expect_marker(frame_index, expected)
    }

    fn expect_marker(&mut self, frame_index: usize, expected: i32) -> Result<(), DcdError> {
        let found = read_i32(&mut self.reader, self.header.endianness)?;
        if found != expected {
            return Err(DcdError::BadRecord {
                frame: frame_index,
                expected,
                found,
            });
        }
        Ok(())
    }
}

fn read_header(reader: &mut impl Read) -> Result<DcdHeader, DcdError> {
    let mut raw_marker = [0u8; 4];
    reader.read_exact(&mut raw_marker)?;
    let endianness = if i32::from_le_bytes(raw_marker) == HEADER_RECORD_LEN {
        Endianness::Little
    } else if i32::from_be_bytes(raw_marker) == HEADER_RECORD_LEN {
        Endianness::Big
    } else {
        return Err(DcdError::BadHeader(
            "first record is not an 84-byte control block".into(),
        ));
    };

    let mut control = [0u8; HEADER_RECORD_LEN as usize];
    reader.read_exact(&mut control)?;
    if &control[0..4] != MAGIC {
        return Err(DcdError::BadHeader("missing 'CORD' signature".into()));
    }
    expect_header_marker(reader, endianness, HEADER_RECORD_LEN)?;

    // Control integers start after the 4-byte signature.
    let icntrl = &control[4..];
    let declared_frames = i32_at(icntrl, 0, endianness).max(0) as usize;
    let first_step = i32_at(icntrl, 1, endianness);
    let step_interval = i32_at(icntrl, 2, endianness);
    let fixed_atoms = i32_at(icntrl, 8, endianness);
    let timestep = f32_at(icntrl, 9, endianness);
    let charmm_version = i32_at(icntrl, 19, endianness);
    let is_charmm = charmm_version != 0;
    let has_unit_cell = is_charmm && i32_at(icntrl, 10, endianness) != 0;
    let has_fourth_dimension = is_charmm && i32_at(icntrl, 11, endianness) != 0;

    if fixed_atoms != 0 {
        return Err(DcdError::Unsupported(format!(
            "{} fixed atoms",
            fixed_atoms
        )));
    }

    let title_len = read_i32(reader, endianness)?;
    if title_len < 4 {
        return Err(DcdError::BadHeader(format!(
            "title record of {} bytes",
            title_len
        )));
    }
    let mut title_block = vec![0u8; title_len as usize];
    reader.read_exact(&mut title_block)?;
    expect_header_marker(reader, endianness, title_len)?;
    let titles = title_block[4..]
        .chunks(TITLE_LINE_LEN)
        .map(|line| String::from_utf8_lossy(line).trim_end_matches(['\0', ' ']).to_string())
        .filter(|line| !line.is_empty())
        .collect();

    expect_header_marker(reader, endianness, 4)?;
    let n_atoms = read_i32(reader, endianness)?;
    expect_header_marker(reader, endianness, 4)?;
    if n_atoms <= 0 {
        return Err(DcdError::BadHeader(format!("atom count {}", n_atoms)));
    }

    Ok(DcdHeader {
        endianness,
        declared_frames,
        first_step,
        step_interval,
        timestep,
        n_atoms: n_atoms as usize,
        has_unit_cell,
        has_fourth_dimension,
        charmm_version,
        titles,
    })
}

fn expect_header_marker(
    reader: &mut impl Read,
    endianness: Endianness,
    expected: i32,
) -> Result<(), DcdError> {
    let found = read_i32(reader, endianness)?;
    if found != expected {
        return Err(DcdError::BadHeader(format!(
            "record marker {} where {} was expected",
            found, expected
        )));
    }
    Ok(())
}

/// Writes CHARMM-style DCD files.
#[derive(Debug, Clone)]
pub struct DcdWriter {
    n_atoms: usize,
    endianness: Endianness,
    unit_cell: Option<[f64; 6]>,
    timestep: f32,
    step_interval: i32,
    title: String,
}

impl DcdWriter {
    pub fn new(n_atoms: usize) -> Self {
        Self {
            n_atoms,
            endianness: Endianness::Little,
            unit_cell: None,
            timestep: 1.0,
            step_interval: 1,
            title: "Created by trajan".to_string(),
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Stores the same unit cell (CHARMM order `a, gamma, b, beta, alpha, c`) with every frame.
    pub fn with_unit_cell(mut self, cell: [f64; 6]) -> Self {
        self.unit_cell = Some(cell);
        self
    }

    pub fn with_timestep(mut self, timestep: f32, step_interval: i32) -> Self {
        self.timestep = timestep;
        self.step_interval = step_interval;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn write_to_path<P: AsRef<Path>>(
        &self,
        path: P,
        frames: &[Coordinates],
    ) -> Result<(), DcdError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, frames)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to(
        &self,
        writer: &mut impl Write,
        frames: &[Coordinates],
    ) -> Result<(), DcdError> {
        match self.endianness {
            Endianness::Little => self.write_with::<LittleEndian>(writer, frames),
            Endianness::Big => self.write_with::<BigEndian>(writer, frames),
        }
    }

    fn write_with<B: byteorder::ByteOrder>(
        &self,
        writer: &mut impl Write,
        frames: &[Coordinates],
    ) -> Result<(), DcdError> {
        let mut icntrl = [0i32; 20];
        icntrl[0] = frames.len() as i32;
        icntrl[2] = self.step_interval;
        icntrl[3] = self.step_interval * frames.len() as i32;
        icntrl[9] = self.timestep.to_bits() as i32;
        icntrl[10] = self.unit_cell.is_some() as i32;
        icntrl[19] = CHARMM_VERSION;

        writer.write_i32::<B>(HEADER_RECORD_LEN)?;
        writer.write_all(MAGIC)?;
        for value in icntrl {
            writer.write_i32::<B>(value)?;
        }
        writer.write_i32::<B>(HEADER_RECORD_LEN)?;

        let mut title = self.title.clone().into_bytes();
        title.resize(TITLE_LINE_LEN, b' ');
        let title_len = 4 + TITLE_LINE_LEN as i32;
        writer.write_i32::<B>(title_len)?;
        writer.write_i32::<B>(1)?;
        writer.write_all(&title)?;
        writer.write_i32::<B>(title_len)?;

        writer.write_i32::<B>(4)?;
        writer.write_i32::<B>(self.n_atoms as i32)?;
        writer.write_i32::<B>(4)?;

        let axis_len = 4 * self.n_atoms as i32;
        for (index, frame) in frames.iter().enumerate() {
            if frame.len() != self.n_atoms {
                return Err(DcdError::BadRecord {
                    frame: index,
                    expected: axis_len,
                    found: 4 * frame.len() as i32,
                });
            }
            if let Some(cell) = self.unit_cell {
                writer.write_i32::<B>(UNIT_CELL_RECORD_LEN)?;
                for value in cell {
                    writer.write_f64::<B>(value)?;
                }
                writer.write_i32::<B>(UNIT_CELL_RECORD_LEN)?;
            }
            for axis in 0..3 {
                writer.write_i32::<B>(axis_len)?;
                for point in frame {
                    writer.write_f32::<B>(point[axis] as f32)?;
                }
                writer.write_i32::<B>(axis_len)?;
            }
        }
        Ok(())
    }
}
