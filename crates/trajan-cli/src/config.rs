//! Run configuration, merged in the order built-in defaults, TOML file,
//! command-line flags.

mod defaults;
mod file;

use crate::cli::{AnalyzeArgs, ServeArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use file::FileConfig;
use std::path::PathBuf;
use trajan::engine::config::{AnalysisConfig, AnalysisConfigBuilder};

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Parent directory for per-request upload folders; the system default when `None`.
    pub temp_dir: Option<PathBuf>,
    pub analysis: AnalysisConfig,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn build_analysis_config(chunk_size: usize, total_frames: Option<usize>) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfigBuilder::new().chunk_size(chunk_size);
    if let Some(frames) = total_frames {
        builder = builder.total_frames(frames);
    }
    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

pub fn resolve_server_config(args: &ServeArgs) -> Result<ServerConfig> {
    let file = FileConfig::load_optional(args.config.as_deref())?;
    merge_server_config(file, args)
}

fn merge_server_config(file: FileConfig, args: &ServeArgs) -> Result<ServerConfig> {
    let defaults = DefaultsConfig::default();

    let max_upload_mb = args
        .max_upload_mb
        .or(file.server.max_upload_mb)
        .unwrap_or(defaults.max_upload_mb);
    if max_upload_mb == 0 {
        return Err(CliError::Config(
            "`server.max-upload-mb` must be at least 1.".to_string(),
        ));
    }
    let chunk_size = args
        .chunk_size
        .or(file.analysis.chunk_size)
        .unwrap_or(defaults.chunk_size);

    Ok(ServerConfig {
        host: args.host.clone().or(file.server.host).unwrap_or(defaults.host),
        port: args.port.or(file.server.port).unwrap_or(defaults.port),
        max_upload_bytes: max_upload_mb.saturating_mul(BYTES_PER_MB),
        temp_dir: args.temp_dir.clone().or(file.server.temp_dir),
        analysis: build_analysis_config(chunk_size, None)?,
    })
}

pub fn resolve_analysis_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let file = FileConfig::load_optional(args.config.as_deref())?;
    merge_analysis_config(file, args)
}

fn merge_analysis_config(file: FileConfig, args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    if args.frames == Some(0) {
        return Err(CliError::Argument("--frames must be at least 1".to_string()));
    }
    let chunk_size = args
        .chunk_size
        .or(file.analysis.chunk_size)
        .unwrap_or(DefaultsConfig::default().chunk_size);
    build_analysis_config(chunk_size, args.frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const SAMPLE_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 9100
max-upload-mb = 64
temp-dir = "/var/tmp/trajan"

[analysis]
chunk-size = 100
"#;

    #[test]
    fn parses_full_file() {
        let file = FileConfig::from_toml(SAMPLE_CONFIG).unwrap();
        assert_eq!(file.server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(file.server.port, Some(9100));
        assert_eq!(file.server.max_upload_mb, Some(64));
        assert_eq!(file.server.temp_dir, Some(PathBuf::from("/var/tmp/trajan")));
        assert_eq!(file.analysis.chunk_size, Some(100));
    }

    #[test]
    fn sections_are_optional() {
        let file = FileConfig::from_toml("[analysis]\nchunk-size = 10\n").unwrap();
        assert_eq!(file.server, Default::default());
        assert_eq!(file.analysis.chunk_size, Some(10));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml("[server]\nhostname = \"x\"\n").is_err());
        assert!(FileConfig::from_toml("[plots]\n").is_err());
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let config = merge_server_config(FileConfig::default(), &ServeArgs::default()).unwrap();
        assert_eq!(config.address(), "127.0.0.1:8000");
        assert_eq!(config.max_upload_bytes, 1024 * BYTES_PER_MB);
        assert_eq!(config.temp_dir, None);
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig::from_toml(SAMPLE_CONFIG).unwrap();
        let args = ServeArgs {
            port: Some(7000),
            chunk_size: Some(25),
            ..Default::default()
        };
        let config = merge_server_config(file, &args).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 7000);
        assert_eq!(config.max_upload_bytes, 64 * BYTES_PER_MB);
        assert_eq!(config.analysis.chunk_size, 25);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let args = ServeArgs {
            chunk_size: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            merge_server_config(FileConfig::default(), &args),
            Err(CliError::Config(_))
        ));

        let args = ServeArgs {
            max_upload_mb: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            merge_server_config(FileConfig::default(), &args),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn analysis_config_takes_frame_limit_from_flags() {
        let file = FileConfig::from_toml(SAMPLE_CONFIG).unwrap();
        let args = AnalyzeArgs {
            frames: Some(40),
            ..Default::default()
        };
        let config = merge_analysis_config(file, &args).unwrap();
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.total_frames, Some(40));
    }

    #[test]
    fn zero_frame_limit_is_an_argument_error() {
        let args = AnalyzeArgs {
            frames: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            merge_analysis_config(FileConfig::default(), &args),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn config_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajan.toml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();
        let args = ServeArgs {
            config: Some(path),
            ..Default::default()
        };
        let config = resolve_server_config(&args).unwrap();
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = FileConfig::from_file(&path).unwrap_err();
        match err {
            CliError::FileParsing { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            FileConfig::from_file(Path::new("/nonexistent/trajan.toml")),
            Err(CliError::Io(_))
        ));
    }
}
