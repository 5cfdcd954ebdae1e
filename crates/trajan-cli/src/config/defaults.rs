use trajan::engine::config::DEFAULT_CHUNK_SIZE;

pub struct DefaultsConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
    pub chunk_size: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_mb: 1024,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
