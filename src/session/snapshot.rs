use super::options::{CompressionMode, SessionOptions};
use crate::draw::{Palette, Point, Stroke};
use crate::input::{Tool, ToolTable};
use crate::store::PageKey;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const CURRENT_VERSION: u32 = 1;

/// On-disk form of one stroke. Color is stored by symbolic name only.
#[derive(Debug, Serialize)]
struct StrokeRecord<'a> {
    page: &'a PageKey,
    tool: Tool,
    width: u32,
    alpha: u8,
    datetime: String,
    points: &'a [Point],
    #[serde(rename = "colorName")]
    color_name: &'a str,
}

#[derive(Debug, Serialize)]
struct AnnotationFile<'a> {
    version: u32,
    strokes: Vec<StrokeRecord<'a>>,
}

/// Loosely typed file envelope; strokes are decoded one at a time so a
/// single bad record does not lose the rest.
#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    strokes: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStroke {
    #[serde(default)]
    page: Option<PageKey>,
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    alpha: Option<u8>,
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    points: Option<Vec<Point>>,
    #[serde(default, rename = "colorName")]
    color_name: Option<String>,
}

/// Strokes decoded from an annotation file.
#[derive(Debug)]
pub struct LoadedStrokes {
    pub strokes: Vec<Stroke>,
    /// Records that could not be turned into a stroke.
    pub skipped: usize,
    pub compressed: bool,
}

/// What reading the annotation file found.
#[derive(Debug)]
pub enum LoadOutcome {
    /// No file yet.
    Missing,
    /// The file exceeds the size limit and was not read.
    TooLarge { bytes: u64 },
    Loaded(LoadedStrokes),
}

/// What a save attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// File written.
    Saved { bytes: usize, compressed: bool },
    /// No strokes left; any existing file was removed.
    Emptied,
    /// The sidecar directory could not be created; nothing was written.
    DirectoryUnavailable,
    /// Payload exceeded the size limit; the previous file was kept.
    TooLarge,
    /// Write failed; the previous file (if any) is intact.
    Failed,
    /// The file holds strokes this session could not load, so it is left
    /// untouched until the next session.
    Protected,
}

/// Reads and writes one document's annotation file.
///
/// Public operations never fail: problems are logged and degrade to an empty
/// load or a non-`Saved` [`SaveOutcome`]. Once a load comes back incomplete
/// (file unreadable or over the size limit, or cut short by the caller via
/// [`protect`](Self::protect)) the store stops writing for the session.
#[derive(Debug, Clone)]
pub struct PersistenceStore {
    options: SessionOptions,
    protected: bool,
}

impl PersistenceStore {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            protected: false,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn path(&self) -> PathBuf {
        self.options.session_file_path()
    }

    /// True when saves are suppressed to keep the on-disk file intact.
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Stops every later save from touching the file.
    pub fn protect(&mut self) {
        if !self.protected {
            warn!(
                "Annotation file {} was not fully loaded; leaving it untouched for this session",
                self.path().display()
            );
            self.protected = true;
        }
    }

    /// Loads every stroke, resolving styles against `tools` and `palette`.
    pub fn load(&mut self, tools: &ToolTable, palette: &Palette) -> Vec<Stroke> {
        match load_strokes(&self.options, tools, palette) {
            Ok(LoadOutcome::Loaded(loaded)) => {
                info!(
                    "Loaded {} stroke(s) from {}{}",
                    loaded.strokes.len(),
                    self.path().display(),
                    if loaded.compressed { " (gzip)" } else { "" }
                );
                loaded.strokes
            }
            Ok(LoadOutcome::Missing) => Vec::new(),
            Ok(LoadOutcome::TooLarge { bytes }) => {
                debug!("Starting empty; {} byte annotation file left unread", bytes);
                self.protect();
                Vec::new()
            }
            Err(err) => {
                warn!("Ignoring unreadable annotation file: {:#}", err);
                self.protect();
                Vec::new()
            }
        }
    }

    pub fn save<'a>(&self, strokes: impl IntoIterator<Item = &'a Stroke>) -> SaveOutcome {
        if self.protected {
            debug!("Skipping save to protected {}", self.path().display());
            return SaveOutcome::Protected;
        }
        let strokes: Vec<&Stroke> = strokes.into_iter().collect();
        if let Err(err) = fs::create_dir_all(&self.options.sidecar_dir) {
            warn!(
                "Cannot create sidecar directory {}: {}; keeping strokes in memory",
                self.options.sidecar_dir.display(),
                err
            );
            return SaveOutcome::DirectoryUnavailable;
        }
        match save_strokes(&strokes, &self.options) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("Failed to save annotations: {:#}", err);
                SaveOutcome::Failed
            }
        }
    }
}

/// Persist `strokes` under an exclusive lock.
///
/// The sidecar directory must already exist.
pub fn save_strokes(strokes: &[&Stroke], options: &SessionOptions) -> Result<SaveOutcome> {
    let lock_path = options.lock_file_path();
    let lock_file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .with_context(|| format!("failed to open session lock file {}", lock_path.display()))?;
    lock_file
        .lock_exclusive()
        .with_context(|| format!("failed to lock session file {}", lock_path.display()))?;

    let result = save_strokes_inner(strokes, options);

    FileExt::unlock(&lock_file).unwrap_or_else(|err| {
        warn!(
            "failed to unlock session file {}: {}",
            lock_path.display(),
            err
        )
    });

    result
}

fn save_strokes_inner(strokes: &[&Stroke], options: &SessionOptions) -> Result<SaveOutcome> {
    let session_path = options.session_file_path();
    let backup_path = options.backup_file_path();

    if strokes.is_empty() {
        if session_path.exists() {
            debug!(
                "Removing annotation file {} because no strokes remain",
                session_path.display()
            );
            fs::remove_file(&session_path).with_context(|| {
                format!(
                    "failed to remove empty annotation file {}",
                    session_path.display()
                )
            })?;
        }
        return Ok(SaveOutcome::Emptied);
    }

    let payload = AnnotationFile {
        version: CURRENT_VERSION,
        strokes: strokes
            .iter()
            .map(|stroke| StrokeRecord {
                page: &stroke.page,
                tool: stroke.tool,
                width: stroke.width,
                alpha: stroke.alpha,
                datetime: stroke.timestamp.to_rfc3339(),
                points: &stroke.points,
                color_name: &stroke.color_name,
            })
            .collect(),
    };

    let mut bytes =
        serde_json::to_vec_pretty(&payload).context("failed to serialise annotation payload")?;

    if bytes.len() as u64 > options.max_file_size_bytes {
        warn!(
            "Annotation data size {} bytes exceeds the configured limit of {} bytes; skipping save",
            bytes.len(),
            options.max_file_size_bytes
        );
        return Ok(SaveOutcome::TooLarge);
    }

    let compressed = match options.compression {
        CompressionMode::Off => false,
        CompressionMode::On => true,
        CompressionMode::Auto => (bytes.len() as u64) >= options.auto_compress_threshold_bytes,
    };
    if compressed {
        bytes = compress_bytes(&bytes)?;
    }

    let tmp_path = temp_path(options);
    {
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .with_context(|| {
                format!(
                    "failed to open temporary annotation file {}",
                    tmp_path.display()
                )
            })?;
        tmp_file
            .write_all(&bytes)
            .context("failed to write annotation payload")?;
        tmp_file
            .sync_all()
            .context("failed to sync temporary annotation file")?;
    }

    if session_path.exists() {
        if options.backup_retention > 0 {
            if backup_path.exists() {
                fs::remove_file(&backup_path).ok();
            }
            fs::rename(&session_path, &backup_path).with_context(|| {
                format!(
                    "failed to rotate previous annotation file {} -> {}",
                    session_path.display(),
                    backup_path.display()
                )
            })?;
        } else {
            fs::remove_file(&session_path).ok();
        }
    }

    fs::rename(&tmp_path, &session_path).with_context(|| {
        format!(
            "failed to move temporary annotation file {} -> {}",
            tmp_path.display(),
            session_path.display()
        )
    })?;

    debug!(
        "Saved {} stroke(s) to {} ({} bytes, compression={})",
        strokes.len(),
        session_path.display(),
        bytes.len(),
        compressed
    );

    Ok(SaveOutcome::Saved {
        bytes: bytes.len(),
        compressed,
    })
}

/// Load strokes under a shared lock.
///
/// The lock is best effort: when the lock file cannot be created (read-only
/// sidecar directory) the file is read without it.
pub fn load_strokes(
    options: &SessionOptions,
    tools: &ToolTable,
    palette: &Palette,
) -> Result<LoadOutcome> {
    let session_path = options.session_file_path();
    if !session_path.exists() {
        debug!(
            "No annotation file present at {}, starting empty",
            session_path.display()
        );
        return Ok(LoadOutcome::Missing);
    }

    let metadata = fs::metadata(&session_path)
        .with_context(|| format!("failed to stat annotation file {}", session_path.display()))?;
    if metadata.len() > options.max_file_size_bytes {
        warn!(
            "Annotation file {} is {} bytes which exceeds the configured limit ({} bytes); refusing to load",
            session_path.display(),
            metadata.len(),
            options.max_file_size_bytes
        );
        return Ok(LoadOutcome::TooLarge {
            bytes: metadata.len(),
        });
    }

    let lock_path = options.lock_file_path();
    let lock = lock_for_reading(&lock_path);
    let result = load_strokes_inner(&session_path, tools, palette);
    release_lock(lock, &lock_path);

    result.map(LoadOutcome::Loaded)
}

/// Opens the lock file and takes a shared lock, or returns `None` (logged)
/// when either step fails.
pub(crate) fn lock_for_reading(lock_path: &Path) -> Option<File> {
    let lock_file = match OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
    {
        Ok(file) => file,
        Err(err) => {
            warn!(
                "Cannot open session lock file {}: {}; reading without a lock",
                lock_path.display(),
                err
            );
            return None;
        }
    };
    if let Err(err) = FileExt::lock_shared(&lock_file) {
        warn!(
            "Cannot acquire shared lock {}: {}; reading without a lock",
            lock_path.display(),
            err
        );
        return None;
    }
    Some(lock_file)
}

pub(crate) fn release_lock(lock: Option<File>, lock_path: &Path) {
    if let Some(lock_file) = lock {
        FileExt::unlock(&lock_file).unwrap_or_else(|err| {
            warn!(
                "failed to unlock session file {}: {}",
                lock_path.display(),
                err
            )
        });
    }
}

pub(crate) fn load_strokes_inner(
    session_path: &Path,
    tools: &ToolTable,
    palette: &Palette,
) -> Result<LoadedStrokes> {
    let mut file_bytes = Vec::new();
    {
        let mut file = File::open(session_path).with_context(|| {
            format!("failed to open annotation file {}", session_path.display())
        })?;
        file.read_to_end(&mut file_bytes)
            .context("failed to read annotation file")?;
    }

    let compressed = is_gzip(&file_bytes);
    let decompressed = if compressed {
        let mut decoder = GzDecoder::new(&file_bytes[..]);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .context("failed to decompress annotation file")?;
        out
    } else {
        file_bytes
    };

    let raw: RawFile =
        serde_json::from_slice(&decompressed).context("failed to parse annotation json")?;
    if let Some(version) = raw.version {
        if version > CURRENT_VERSION {
            warn!(
                "Annotation file version {} is newer than supported version {}; reading known fields",
                version, CURRENT_VERSION
            );
        }
    }

    let loaded_at = Utc::now();
    let mut strokes = Vec::with_capacity(raw.strokes.len());
    let mut skipped = 0;
    for (position, value) in raw.strokes.into_iter().enumerate() {
        match decode_stroke(value, tools, palette, loaded_at) {
            Some(stroke) => strokes.push(stroke),
            None => {
                warn!("Skipping unusable stroke record #{}", position);
                skipped += 1;
            }
        }
    }

    Ok(LoadedStrokes {
        strokes,
        skipped,
        compressed,
    })
}

/// Turns one loose record into a stroke, filling gaps from tool defaults.
fn decode_stroke(
    value: Value,
    tools: &ToolTable,
    palette: &Palette,
    loaded_at: DateTime<Utc>,
) -> Option<Stroke> {
    let raw: RawStroke = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(err) => {
            debug!("Malformed stroke record: {}", err);
            return None;
        }
    };

    let page = raw.page?;
    let points = raw.points.filter(|points| !points.is_empty())?;

    let tool = match raw.tool.as_deref() {
        Some(name) => name.parse::<Tool>().unwrap_or_else(|_| {
            warn!("Unknown tool '{}' in annotation file; using pen", name);
            Tool::Pen
        }),
        None => Tool::Pen,
    };
    let defaults = tools.get(tool);

    let color_name = match raw.color_name.as_deref() {
        Some(name) => match palette.canonical_name(name) {
            Some(canonical) => canonical.to_string(),
            None => {
                warn!(
                    "Unknown color '{}' in annotation file; using {} default '{}'",
                    name, tool, defaults.color_name
                );
                defaults.color_name.clone()
            }
        },
        None => defaults.color_name.clone(),
    };

    let timestamp = raw
        .datetime
        .as_deref()
        .and_then(|text| match DateTime::parse_from_rfc3339(text) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(err) => {
                debug!("Unparsable stroke datetime '{}': {}", text, err);
                None
            }
        })
        .unwrap_or(loaded_at);

    Some(Stroke {
        page,
        tool,
        points,
        width: raw.width.filter(|w| *w > 0).unwrap_or(defaults.width).max(1),
        color_name,
        alpha: raw.alpha.unwrap_or(defaults.alpha),
        timestamp,
    })
}

fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .context("failed to compress annotation payload")?;
    encoder
        .finish()
        .context("failed to finalise compressed annotation payload")
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

fn temp_path(options: &SessionOptions) -> PathBuf {
    let mut attempt = 0u32;
    let mut candidate = options.temp_file_path(attempt);
    while candidate.exists() {
        attempt += 1;
        candidate = options.temp_file_path(attempt);
    }
    candidate
}
