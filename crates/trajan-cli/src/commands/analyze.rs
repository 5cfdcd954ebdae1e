use crate::cli::AnalyzeArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;
use trajan::core::io::results;
use trajan::engine::progress::ProgressReporter;
use trajan::workflows::analyze::{self, AnalysisResult};

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let analysis_config = config::resolve_analysis_config(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Analyzing {}...", args.trajectory.display());
    info!("Invoking the core analysis workflow...");

    let result = tokio::task::block_in_place(|| {
        analyze::run(&args.reference, &args.trajectory, &analysis_config, &reporter)
    });
    progress_handler.finish_and_clear();
    let result = result?;

    info!(
        "Workflow finished: {} frames, {} residues.",
        result.frame_count(),
        result.residue_count()
    );

    match &args.output {
        Some(prefix) => write_results(prefix, &result)?,
        None => print!("{}", summary(&result)),
    }
    Ok(())
}

fn output_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn write_results(prefix: &Path, result: &AnalysisResult) -> Result<()> {
    let rmsd_path = output_path(prefix, "_rmsd.csv");
    results::write_rmsd_csv_to_path(&rmsd_path, &result.rmsd).map_err(|e| CliError::Export {
        path: rmsd_path.clone(),
        source: e.into(),
    })?;
    println!("✓ RMSD of {} frames written to: {}", result.frame_count(), rmsd_path.display());

    let rmsf_path = output_path(prefix, "_rmsf.csv");
    results::write_rmsf_csv_to_path(&rmsf_path, &result.residue_numbers, &result.rmsf).map_err(
        |e| CliError::Export {
            path: rmsf_path.clone(),
            source: e.into(),
        },
    )?;
    println!(
        "✓ RMSF of {} residues written to: {}",
        result.residue_count(),
        rmsf_path.display()
    );
    Ok(())
}

fn summary(result: &AnalysisResult) -> String {
    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len().max(1) as f64;
    let max_rmsd = result
        .rmsd
        .iter()
        .enumerate()
        .fold((0, 0.0), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
    let max_rmsf = result
        .rmsf
        .iter()
        .enumerate()
        .fold((0, 0.0), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
    let max_rmsf_residue = result.residue_numbers.get(max_rmsf.0).copied().unwrap_or(0);

    format!(
        "Frames analyzed:   {}\n\
         Alpha-carbons:     {}\n\
         Mean RMSD:         {:.3} Å\n\
         Max RMSD:          {:.3} Å (frame {})\n\
         Mean RMSF:         {:.3} Å\n\
         Max RMSF:          {:.3} Å (residue {})\n",
        result.frame_count(),
        result.residue_count(),
        mean(&result.rmsd),
        max_rmsd.1,
        max_rmsd.0 + 1,
        mean(&result.rmsf),
        max_rmsf.1,
        max_rmsf_residue,
    )
}
