use axum::extract::multipart::{Field, MultipartError};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Multipart(#[from] MultipartError),
    #[error("failed to store upload: {0}")]
    Io(#[from] io::Error),
}

/// Per-request directory holding uploaded files.
///
/// The directory and everything in it is removed when the value is dropped;
/// removal failures are ignored.
#[derive(Debug)]
pub struct UploadDir {
    dir: TempDir,
}

impl UploadDir {
    pub fn create(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("trajan-upload-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        debug!("Created upload directory {}.", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Streams a multipart field to `file_name` inside the directory.
    pub async fn save_field(
        &self,
        mut field: Field<'_>,
        file_name: &str,
    ) -> Result<PathBuf, UploadError> {
        let path = self.dir.path().join(file_name);
        let mut file = tokio::fs::File::create(&path).await?;
        let mut written = 0usize;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;
        debug!("Stored {} bytes in {}.", written, path.display());
        Ok(path)
    }

    pub fn save_bytes(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}
