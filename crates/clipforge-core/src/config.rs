//! Configuration module
//!
//! Environment-driven configuration for the API server, artifact storage,
//! and the ffmpeg/ffprobe binaries. `.env` loading happens in the binary;
//! this module only reads the process environment.

use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_SIZE_BYTES: usize = 1024 * 1024 * 1024; // 1 GiB

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// Root of the artifact store; uploads live in `<root>/uploads`,
    /// the registry snapshot in `<root>/library.json`.
    pub storage_root: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub max_upload_size_bytes: usize,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = match env::var("PORT") {
            Ok(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a number, got {:?}", v))?,
            Err(_) => DEFAULT_PORT,
        };

        let storage_root = env::var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("storage"));

        let max_upload_size_bytes = match env::var("MAX_UPLOAD_SIZE_BYTES") {
            Ok(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_BYTES must be a number"))?,
            Err(_) => DEFAULT_MAX_UPLOAD_SIZE_BYTES,
        };

        let cors_origins = env::var("CORS_ORIGIN")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            server_port,
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            storage_root,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            max_upload_size_bytes,
            cors_origins,
        })
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.storage_root.join("uploads")
    }

    pub fn library_file(&self) -> PathBuf {
        self.storage_root.join("library.json")
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths() {
        let config = Config {
            server_port: 5000,
            environment: "test".to_string(),
            storage_root: PathBuf::from("/srv/clipforge"),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            max_upload_size_bytes: 1024,
            cors_origins: vec![],
        };
        assert_eq!(config.upload_dir(), PathBuf::from("/srv/clipforge/uploads"));
        assert_eq!(
            config.library_file(),
            PathBuf::from("/srv/clipforge/library.json")
        );
        assert!(!config.is_production());
    }
}
