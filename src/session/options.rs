use crate::config::{SessionCompression, SessionConfig};
use std::path::{Path, PathBuf};

pub const DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES: u64 = 100 * 1024; // 100 KiB
pub const DEFAULT_FILE_STEM: &str = "annotations";
pub const DEFAULT_EXTENSION: &str = "json";

/// Compression preference for annotation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Always write plain JSON.
    Off,
    /// Always write gzip-compressed JSON.
    On,
    /// Write gzip when payload exceeds the configured threshold.
    Auto,
}

/// Runtime options for one document's annotation file.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Host-supplied directory that sits next to the document.
    pub sidecar_dir: PathBuf,
    pub file_stem: String,
    pub extension: String,
    pub max_file_size_bytes: u64,
    pub compression: CompressionMode,
    pub auto_compress_threshold_bytes: u64,
    pub backup_retention: usize,
}

impl SessionOptions {
    /// Creates options with default naming and limits for `sidecar_dir`.
    pub fn new(sidecar_dir: impl Into<PathBuf>) -> Self {
        Self {
            sidecar_dir: sidecar_dir.into(),
            file_stem: DEFAULT_FILE_STEM.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            max_file_size_bytes: 10 * 1024 * 1024,
            compression: CompressionMode::Off,
            auto_compress_threshold_bytes: DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES,
            backup_retention: 1,
        }
    }

    fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, self.extension)
    }

    pub fn session_file_path(&self) -> PathBuf {
        self.sidecar_dir.join(self.file_name())
    }

    pub fn backup_file_path(&self) -> PathBuf {
        self.sidecar_dir.join(format!("{}.bak", self.file_name()))
    }

    pub fn lock_file_path(&self) -> PathBuf {
        self.sidecar_dir.join(format!("{}.lock", self.file_stem))
    }

    pub(crate) fn temp_file_path(&self, attempt: u32) -> PathBuf {
        if attempt == 0 {
            self.sidecar_dir.join(format!("{}.tmp", self.file_name()))
        } else {
            self.sidecar_dir
                .join(format!("{}.tmp{}", self.file_name(), attempt))
        }
    }
}

/// Build runtime session options from configuration values.
pub fn options_from_config(session_cfg: &SessionConfig, sidecar_dir: &Path) -> SessionOptions {
    let mut options = SessionOptions::new(sidecar_dir);
    options.file_stem = sanitize_identifier(&session_cfg.file_stem, DEFAULT_FILE_STEM);
    options.extension = sanitize_identifier(&session_cfg.extension, DEFAULT_EXTENSION);
    options.max_file_size_bytes = session_cfg
        .max_file_size_mb
        .saturating_mul(1024 * 1024)
        .max(1);
    options.auto_compress_threshold_bytes = session_cfg
        .auto_compress_threshold_kb
        .saturating_mul(1024)
        .max(1);
    options.compression = match session_cfg.compress {
        SessionCompression::Auto => CompressionMode::Auto,
        SessionCompression::On => CompressionMode::On,
        SessionCompression::Off => CompressionMode::Off,
    };
    options.backup_retention = session_cfg.backup_retention;
    options
}

/// Default sidecar location when the host does not supply one.
pub fn default_sidecar_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pageink")
}

pub(crate) fn sanitize_identifier(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
