use thiserror::Error;

/// Frames loaded and superposed per chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 250;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Number of consecutive frames held in memory while superposing.
    pub chunk_size: usize,
    /// Frames to analyze from the start of the trajectory; `None` means all of them.
    pub total_frames: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            total_frames: None,
        }
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    chunk_size: Option<usize>,
    total_frames: Option<usize>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }
    pub fn total_frames(mut self, frames: usize) -> Self {
        self.total_frames = Some(frames);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let chunk_size = self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "chunk_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(AnalysisConfig {
            chunk_size,
            total_frames: self.total_frames,
        })
    }
}
