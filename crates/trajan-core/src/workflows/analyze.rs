use crate::core::io::dcd::{Coordinates, DcdError, DcdReader};
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::MolecularFile;
use crate::engine::config::{AnalysisConfig, ConfigError};
use crate::engine::ensemble::Ensemble;
use crate::engine::error::AnalysisError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Result series of a trajectory analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// RMSD of every analyzed frame from the reference, in frame order (Å).
    pub rmsd: Vec<f64>,
    /// RMSF of every alpha-carbon over the aligned trajectory (Å).
    pub rmsf: Vec<f64>,
    /// Positional identifiers `1..=M` of the alpha-carbons, used as the RMSF x-axis.
    pub residue_indices: Vec<usize>,
    /// Residue sequence numbers of the alpha-carbons as written in the reference file.
    pub residue_numbers: Vec<isize>,
}

impl AnalysisResult {
    pub fn frame_count(&self) -> usize {
        self.rmsd.len()
    }

    pub fn residue_count(&self) -> usize {
        self.rmsf.len()
    }
}

/// Flat view of an analysis: either all four series or only an error message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisOutcome {
    pub rmsd: Option<Vec<f64>>,
    pub rmsf: Option<Vec<f64>>,
    pub rmsf_index: Option<Vec<usize>>,
    pub residue_ids: Option<Vec<usize>>,
    pub error: Option<String>,
}

impl From<Result<AnalysisResult, AnalysisError>> for AnalysisOutcome {
    fn from(result: Result<AnalysisResult, AnalysisError>) -> Self {
        match result {
            Ok(result) => Self {
                rmsd: Some(result.rmsd),
                rmsf: Some(result.rmsf),
                rmsf_index: Some(result.residue_indices.clone()),
                residue_ids: Some(result.residue_indices),
                error: None,
            },
            Err(e) => Self {
                error: Some(e.to_string()),
                ..Self::default()
            },
        }
    }
}

/// Computes RMSD per frame and RMSF per alpha-carbon of `trajectory_path`
/// against the structure in `reference_path`.
///
/// Frames are read `config.chunk_size` at a time. Every frame is superposed
/// independently onto the reference alpha-carbons, so results do not depend
/// on the chunk size. Trajectory frames may store either only the
/// alpha-carbons or every atom of the reference.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    reference_path: &Path,
    trajectory_path: &Path,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<AnalysisResult, AnalysisError> {
    if config.chunk_size == 0 {
        return Err(ConfigError::InvalidParameter {
            parameter: "chunk_size",
            reason: "must be at least 1".to_string(),
        }
        .into());
    }

    // === Phase 1: Reference structure ===
    reporter.report(Progress::PhaseStart {
        name: "Loading reference",
    });
    info!("Loading reference structure from {}.", reference_path.display());
    let (system, _) = PdbFile::read_from_path(reference_path)?;
    let selection = system.select_alpha_carbons();
    if selection.is_empty() {
        return Err(AnalysisError::NoAlphaCarbonAtoms);
    }
    info!(
        "Selected {} alpha-carbons out of {} atoms.",
        selection.len(),
        system.atom_count()
    );
    drop(system);

    let mut trajectory = DcdReader::open(trajectory_path)?;
    let available = trajectory.n_frames();
    let total_frames = match config.total_frames {
        Some(requested) if requested > available => {
            return Err(DcdError::FrameOutOfRange {
                start: 0,
                stop: requested,
                available,
            }
            .into());
        }
        Some(requested) => requested,
        None => available,
    };
    if total_frames == 0 {
        return Err(AnalysisError::EmptyTrajectory);
    }

    let layout = selection
        .frame_layout(trajectory.n_atoms())
        .ok_or(AnalysisError::AtomCountMismatch {
            frame: 0,
            found: trajectory.n_atoms(),
            alpha_carbons: selection.len(),
            reference_atoms: selection.source_atom_count(),
        })?;
    debug!("Trajectory frames map onto the selection as {:?}.", layout);
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Chunked superposition ===
    reporter.report(Progress::PhaseStart {
        name: "Aligning trajectory",
    });
    let n_chunks = total_frames.div_ceil(config.chunk_size);
    info!(
        "Aligning {} frames in {} chunks of up to {} frames.",
        total_frames, n_chunks, config.chunk_size
    );
    reporter.report(Progress::TaskStart {
        total_steps: n_chunks as u64,
    });

    let mut rmsd = Vec::with_capacity(total_frames);
    let mut aligned: Vec<Coordinates> = Vec::with_capacity(total_frames);
    for start in (0..total_frames).step_by(config.chunk_size) {
        let stop = (start + config.chunk_size).min(total_frames);
        let frames = trajectory.read_frames(start, stop)?;

        let mut chunk = Ensemble::new(selection.positions().to_vec());
        for (offset, frame) in frames.iter().enumerate() {
            let coords =
                selection
                    .extract(frame, layout)
                    .ok_or_else(|| AnalysisError::AtomCountMismatch {
                        frame: start + offset,
                        found: frame.len(),
                        alpha_carbons: selection.len(),
                        reference_atoms: selection.source_atom_count(),
                    })?;
            chunk.add_coordset(coords)?;
        }
        drop(frames);

        chunk.superpose()?;
        rmsd.extend(chunk.rmsds());
        aligned.extend(chunk.into_coordsets());
        debug!("Aligned frames {}..{}.", start, stop);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Fluctuations over the aligned ensemble ===
    reporter.report(Progress::PhaseStart {
        name: "Computing fluctuations",
    });
    let mut ensemble = Ensemble::new(selection.positions().to_vec());
    ensemble.extend(aligned)?;
    let rmsf = ensemble
        .rmsfs()
        .ok_or_else(|| AnalysisError::Internal("aligned ensemble is empty".to_string()))?;
    reporter.report(Progress::PhaseFinish);

    info!(
        "Analysis complete: {} frames, {} residues.",
        rmsd.len(),
        rmsf.len()
    );

    Ok(AnalysisResult {
        residue_indices: (1..=rmsf.len()).collect(),
        residue_numbers: selection.residue_numbers().to_vec(),
        rmsd,
        rmsf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::dcd::DcdWriter;
    use crate::engine::config::AnalysisConfigBuilder;
    use crate::engine::error::ErrorKind;
    use nalgebra::{Point3, Rotation3, Unit, Vector3};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const TOLERANCE: f64 = 1e-6;

    fn pdb_line(
        record: &str,
        serial: usize,
        name: &str,
        res_name: &str,
        res_seq: isize,
        p: Point3<f64>,
    ) -> String {
        format!(
            "{:<6}{:>5} {:<4} {:>3} A{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
            record,
            serial,
            name,
            res_name,
            res_seq,
            p.x,
            p.y,
            p.z,
            1.0,
            0.0,
            &name.trim()[..1]
        )
    }

    /// Backbone N, CA and C for each residue; CA positions are the returned coordinates.
    fn backbone(n_residues: usize) -> (String, Vec<Point3<f64>>, Vec<Point3<f64>>) {
        let mut lines = Vec::new();
        let mut all_atoms = Vec::new();
        let mut alpha_carbons = Vec::new();
        for i in 0..n_residues {
            let wobble = if i % 2 == 0 { 0.5 } else { -0.5 };
            let base = Point3::new(3.75 * i as f64, wobble, 0.25 * i as f64);
            let atoms = [
                (" N", base + Vector3::new(-1.25, 0.5, 0.0)),
                (" CA", base),
                (" C", base + Vector3::new(1.25, 0.5, 0.25)),
            ];
            for (name, position) in atoms {
                all_atoms.push(position);
                lines.push(pdb_line(
                    "ATOM",
                    all_atoms.len(),
                    name,
                    "ALA",
                    10 + i as isize,
                    position,
                ));
            }
            alpha_carbons.push(base);
        }
        lines.push("END".to_string());
        (lines.join("\n"), all_atoms, alpha_carbons)
    }

    fn perturbed_frames(reference: &[Point3<f64>], n_frames: usize) -> Vec<Coordinates> {
        (0..n_frames)
            .map(|f| {
                let rotation = Rotation3::from_axis_angle(
                    &Unit::new_normalize(Vector3::new(1.0, 0.5 + f as f64, -0.25)),
                    0.3 * f as f64,
                );
                reference
                    .iter()
                    .enumerate()
                    .map(|(a, p)| {
                        let wobble = 0.2 * ((f * 7 + a * 3) as f64).sin();
                        rotation * p + Vector3::new(f as f64, wobble, -wobble)
                    })
                    .collect()
            })
            .collect()
    }

    struct Fixture {
        _dir: TempDir,
        pdb: PathBuf,
        dcd: PathBuf,
    }

    fn fixture(pdb_content: &str, frames: &[Coordinates], n_atoms: usize) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let pdb = dir.path().join("reference.pdb");
        let dcd = dir.path().join("trajectory.dcd");
        std::fs::write(&pdb, pdb_content).unwrap();
        DcdWriter::new(n_atoms).write_to_path(&dcd, frames).unwrap();
        Fixture { _dir: dir, pdb, dcd }
    }

    fn analyze(
        fixture: &Fixture,
        config: &AnalysisConfig,
    ) -> Result<AnalysisResult, AnalysisError> {
        run(&fixture.pdb, &fixture.dcd, config, &ProgressReporter::new())
    }

    #[test]
    fn frames_equal_to_reference_give_zero_deviation() {
        let (pdb, _, ca) = backbone(3);
        let fixture = fixture(&pdb, &[ca.clone(), ca.clone()], 3);

        let result = analyze(&fixture, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.rmsd.len(), 2);
        assert_eq!(result.rmsf.len(), 3);
        assert!(result.rmsd.iter().all(|v| v.abs() < TOLERANCE));
        assert!(result.rmsf.iter().all(|v| v.abs() < TOLERANCE));
        assert_eq!(result.residue_indices, vec![1, 2, 3]);
        assert_eq!(result.residue_numbers, vec![10, 11, 12]);
    }

    #[test]
    fn output_lengths_follow_frames_and_alpha_carbons() {
        let (pdb, _, ca) = backbone(6);
        let frames = perturbed_frames(&ca, 9);
        let fixture = fixture(&pdb, &frames, 6);

        let result = analyze(&fixture, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.frame_count(), 9);
        assert_eq!(result.residue_count(), 6);
        assert_eq!(result.residue_indices, (1..=6).collect::<Vec<_>>());
        assert!(result.rmsd.iter().all(|&v| v >= 0.0));
        assert!(result.rmsf.iter().all(|&v| v >= 0.0));
        assert!(result.rmsd.iter().any(|&v| v > 0.01));
    }

    #[test]
    fn chunk_size_does_not_change_results() {
        let (pdb, _, ca) = backbone(5);
        let frames = perturbed_frames(&ca, 11);
        let fixture = fixture(&pdb, &frames, 5);

        let single = analyze(&fixture, &AnalysisConfig::default()).unwrap();
        for chunk_size in [1, 3, 4, 11] {
            let config = AnalysisConfigBuilder::new().chunk_size(chunk_size).build().unwrap();
            let chunked = analyze(&fixture, &config).unwrap();
            assert_eq!(chunked.rmsd.len(), single.rmsd.len());
            for (a, b) in chunked.rmsd.iter().zip(&single.rmsd) {
                assert!((a - b).abs() < 1e-9, "chunk size {}: {} vs {}", chunk_size, a, b);
            }
            for (a, b) in chunked.rmsf.iter().zip(&single.rmsf) {
                assert!((a - b).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn rigidly_moved_frames_have_zero_rmsd() {
        let (pdb, _, ca) = backbone(4);
        let frames: Vec<Coordinates> = (0..3)
            .map(|f| {
                let rotation = Rotation3::from_euler_angles(0.2 * f as f64, -0.7, 1.1 * f as f64);
                ca.iter()
                    .map(|p| rotation * p + Vector3::new(2.0 * f as f64, 1.0, -3.0))
                    .collect()
            })
            .collect();
        let fixture = fixture(&pdb, &frames, 4);

        let result = analyze(&fixture, &AnalysisConfig::default()).unwrap();
        for rmsd in &result.rmsd {
            assert!(rmsd.abs() < 1e-4, "rmsd was {}", rmsd);
        }
        for rmsf in &result.rmsf {
            assert!(rmsf.abs() < 1e-4, "rmsf was {}", rmsf);
        }
    }

    #[test]
    fn full_atom_frames_are_reduced_to_alpha_carbons() {
        let (pdb, all_atoms, _) = backbone(4);
        let fixture_full = fixture(&pdb, &perturbed_frames(&all_atoms, 5), all_atoms.len());
        let result = analyze(&fixture_full, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.rmsd.len(), 5);
        assert_eq!(result.rmsf.len(), 4);

        let fixture_same = fixture(&pdb, &[all_atoms.clone()], all_atoms.len());
        let identical = analyze(&fixture_same, &AnalysisConfig::default()).unwrap();
        assert!(identical.rmsd[0].abs() < TOLERANCE);
    }

    #[test]
    fn total_frames_limits_the_analysis() {
        let (pdb, _, ca) = backbone(3);
        let fixture = fixture(&pdb, &perturbed_frames(&ca, 6), 3);

        let config = AnalysisConfigBuilder::new().total_frames(4).build().unwrap();
        let result = analyze(&fixture, &config).unwrap();
        assert_eq!(result.rmsd.len(), 4);

        let too_many = AnalysisConfigBuilder::new().total_frames(7).build().unwrap();
        let err = analyze(&fixture, &too_many).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Trajectory {
                source: DcdError::FrameOutOfRange { available: 6, .. }
            }
        ));
    }

    #[test]
    fn reference_without_alpha_carbons_is_rejected() {
        let water = [
            pdb_line("HETATM", 1, " O", "HOH", 1, Point3::new(0.0, 0.0, 0.0)),
            pdb_line("HETATM", 2, " H1", "HOH", 1, Point3::new(0.75, 0.5, 0.0)),
        ]
        .join("\n");
        let fixture = fixture(&water, &[vec![Point3::origin(); 2]], 2);

        let err = analyze(&fixture, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::NoAlphaCarbonAtoms));
        assert_eq!(err.kind(), ErrorKind::NoAlphaCarbonAtoms);

        let outcome = AnalysisOutcome::from(Err(err));
        assert!(outcome.rmsd.is_none());
        assert!(outcome.rmsf.is_none());
        assert!(outcome.rmsf_index.is_none());
        assert!(outcome.residue_ids.is_none());
        assert_eq!(
            outcome.error.as_deref(),
            Some("No alpha-carbon (CA) atoms found in the PDB file!")
        );
    }

    #[test]
    fn alpha_carbon_check_precedes_trajectory_access() {
        let dir = tempfile::tempdir().unwrap();
        let pdb = dir.path().join("water.pdb");
        std::fs::write(
            &pdb,
            pdb_line("HETATM", 1, " O", "HOH", 1, Point3::origin()),
        )
        .unwrap();
        let missing = dir.path().join("missing.dcd");

        let err = run(&pdb, &missing, &AnalysisConfig::default(), &ProgressReporter::new())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoAlphaCarbonAtoms));
    }

    #[test]
    fn mismatched_atom_count_fails_cleanly() {
        let (pdb, _, _) = backbone(3);
        let fixture = fixture(&pdb, &[vec![Point3::origin(); 5]], 5);

        let err = analyze(&fixture, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::AtomCountMismatch {
                found: 5,
                alpha_carbons: 3,
                reference_atoms: 9,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::AtomCountMismatch);
    }

    #[test]
    fn empty_trajectory_is_an_error() {
        let (pdb, _, _) = backbone(3);
        let fixture = fixture(&pdb, &[], 3);
        let err = analyze(&fixture, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyTrajectory));
    }

    #[test]
    fn missing_files_are_io_failures() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            &dir.path().join("nope.pdb"),
            &dir.path().join("nope.dcd"),
            &AnalysisConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn latin1_remark_text_does_not_fail_the_analysis() {
        let (pdb, _, ca) = backbone(3);
        let fixture = fixture(&pdb, &[ca], 3);
        let mut content = b"REMARK   1 AUTHOR M\xfcller\n".to_vec();
        content.extend_from_slice(pdb.as_bytes());
        std::fs::write(&fixture.pdb, content).unwrap();

        let result = analyze(&fixture, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.frame_count(), 1);
        assert_eq!(result.residue_count(), 3);
        assert!(result.rmsd[0].abs() < TOLERANCE);
    }

    #[test]
    fn zero_chunk_size_is_rejected_without_panicking() {
        let (pdb, _, ca) = backbone(3);
        let fixture = fixture(&pdb, &[ca], 3);
        let config = AnalysisConfig {
            chunk_size: 0,
            total_frames: None,
        };
        assert!(matches!(
            analyze(&fixture, &config),
            Err(AnalysisError::Config { .. })
        ));
    }

    #[test]
    fn progress_reports_phases_and_one_step_per_chunk() {
        let (pdb, _, ca) = backbone(3);
        let fixture = fixture(&pdb, &perturbed_frames(&ca, 7), 3);
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let config = AnalysisConfigBuilder::new().chunk_size(3).build().unwrap();

        run(&fixture.pdb, &fixture.dcd, &config, &reporter).unwrap();
        drop(reporter);
        let events = events.into_inner().unwrap();

        let phases: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                Progress::PhaseStart { name } => Some(*name),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec!["Loading reference", "Aligning trajectory", "Computing fluctuations"]
        );
        let steps = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(steps, 3);
        assert!(events
            .iter()
            .any(|e| matches!(e, Progress::TaskStart { total_steps: 3 })));
    }

    #[test]
    fn outcome_of_success_repeats_the_index_series() {
        let (pdb, _, ca) = backbone(2);
        let fixture = fixture(&pdb, &[ca], 2);
        let outcome = AnalysisOutcome::from(analyze(&fixture, &AnalysisConfig::default()));
        assert!(outcome.error.is_none());
        assert_eq!(outcome.rmsf_index, Some(vec![1, 2]));
        assert_eq!(outcome.residue_ids, Some(vec![1, 2]));
        assert_eq!(outcome.rmsd.map(|r| r.len()), Some(1));
    }
}
