use super::AppState;
use super::chart::{rmsd_chart, rmsf_chart};
use super::page::{self, PageView};
use super::uploads::{UploadDir, UploadError};
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::response::Html;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, info, instrument, warn};
use trajan::engine::error::{AnalysisError, ErrorKind};
use trajan::engine::progress::ProgressReporter;
use trajan::workflows::analyze::{self, AnalysisResult};

pub const PDB_FIELD: &str = "pdb_file";
pub const DCD_FIELD: &str = "dcd_file";

const ERROR_PREFIX: &str = "Analysis error: ";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("{0}")]
    Rejected(#[from] MultipartRejection),
    #[error("{0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("failed to create upload directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing form field '{0}'")]
    MissingField(&'static str),
    #[error("analysis worker failed: {0}")]
    Worker(#[from] JoinError),
    #[error("failed to render chart: {0}")]
    Chart(#[from] serde_json::Error),
}

impl RequestError {
    /// Message shown on the page. A missing alpha-carbon selection is reported
    /// as is; every other failure gets the generic prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Analysis(e) if e.kind() == ErrorKind::NoAlphaCarbonAtoms => e.to_string(),
            other => format!("{}{}", ERROR_PREFIX, other),
        }
    }
}

pub async fn index() -> Html<String> {
    Html(page::render(&PageView::default()))
}

#[instrument(skip_all, name = "analyze_request")]
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let view = match run_request(&state, multipart).await.and_then(|r| plots(&r)) {
        Ok(view) => view,
        Err(e) => {
            warn!("Analysis request failed: {}", e);
            PageView::with_error(e.user_message())
        }
    };
    Html(page::render(&view))
}

fn plots(result: &AnalysisResult) -> Result<PageView, RequestError> {
    let rmsd_plot = rmsd_chart(&result.rmsd).to_html()?;
    let rmsf_plot = rmsf_chart(&result.residue_indices, &result.rmsf).to_html()?;
    Ok(PageView::with_plots(rmsd_plot, rmsf_plot))
}

async fn run_request(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<AnalysisResult, RequestError> {
    let mut multipart = multipart?;
    let uploads = UploadDir::create(state.config.temp_dir.as_deref())?;

    let mut reference = None;
    let mut trajectory = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(PDB_FIELD) => {
                reference = Some(uploads.save_field(field, "reference.pdb").await?);
            }
            Some(DCD_FIELD) => {
                trajectory = Some(uploads.save_field(field, "trajectory.dcd").await?);
            }
            other => debug!("Ignoring form field {:?}.", other),
        }
    }
    let reference = reference.ok_or(RequestError::MissingField(PDB_FIELD))?;
    let trajectory = trajectory.ok_or(RequestError::MissingField(DCD_FIELD))?;

    info!("Uploads stored; starting analysis.");
    let config = state.config.analysis.clone();
    let result = tokio::task::spawn_blocking(move || {
        let result = analyze::run(&reference, &trajectory, &config, &ProgressReporter::new());
        drop(uploads);
        result
    })
    .await??;

    info!(
        "Analysis finished: {} frames, {} residues.",
        result.frame_count(),
        result.residue_count()
    );
    Ok(result)
}
