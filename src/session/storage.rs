use super::options::SessionOptions;
use super::snapshot;
use crate::draw::Palette;
use crate::input::ToolTable;
use crate::store::CanonicalPage;
use anyhow::{Context, Result};
use log::warn;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Result of clearing on-disk annotation data.
#[derive(Debug, Clone, Copy)]
pub struct ClearOutcome {
    pub removed_session: bool,
    pub removed_backup: bool,
    pub removed_lock: bool,
}

/// Summary information about a document's annotation file.
#[derive(Debug, Clone)]
pub struct SessionInspection {
    pub session_path: PathBuf,
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub modified: Option<SystemTime>,
    pub backup_path: PathBuf,
    pub backup_exists: bool,
    pub backup_size_bytes: Option<u64>,
    /// Stroke count per canonical page, when the file could be read.
    pub page_counts: Option<BTreeMap<CanonicalPage, usize>>,
    pub skipped_records: usize,
    pub compressed: bool,
}

impl SessionInspection {
    pub fn total_strokes(&self) -> usize {
        self.page_counts
            .as_ref()
            .map_or(0, |counts| counts.values().sum())
    }
}

/// Remove the annotation file, its backup and its lock.
pub fn clear_session(options: &SessionOptions) -> Result<ClearOutcome> {
    Ok(ClearOutcome {
        removed_session: remove_file_if_exists(&options.session_file_path())?,
        removed_backup: remove_file_if_exists(&options.backup_file_path())?,
        removed_lock: remove_file_if_exists(&options.lock_file_path())?,
    })
}

/// Inspect the annotation file for CLI reporting.
pub fn inspect_session(options: &SessionOptions) -> Result<SessionInspection> {
    let session_path = options.session_file_path();
    let metadata = fs::metadata(&session_path).ok();
    let exists = metadata.is_some();
    let size_bytes = metadata.as_ref().map(|m| m.len());
    let modified = metadata.as_ref().and_then(|m| m.modified().ok());

    let backup_path = options.backup_file_path();
    let backup_meta = fs::metadata(&backup_path).ok();

    let mut page_counts = None;
    let mut skipped_records = 0;
    let mut compressed = false;

    if exists {
        let lock_path = options.lock_file_path();
        let lock = snapshot::lock_for_reading(&lock_path);

        // Counting only needs pages, so built-in styles are enough here.
        let loaded =
            snapshot::load_strokes_inner(&session_path, &ToolTable::default(), &Palette::builtin());

        snapshot::release_lock(lock, &lock_path);

        match loaded {
            Ok(loaded) => {
                let mut counts = BTreeMap::new();
                for stroke in &loaded.strokes {
                    *counts.entry(stroke.page.canonical()).or_insert(0) += 1;
                }
                page_counts = Some(counts);
                skipped_records = loaded.skipped;
                compressed = loaded.compressed;
            }
            Err(err) => warn!("Annotation file is unreadable: {:#}", err),
        }
    }

    Ok(SessionInspection {
        session_path,
        exists,
        size_bytes,
        modified,
        backup_path,
        backup_exists: backup_meta.is_some(),
        backup_size_bytes: backup_meta.as_ref().map(|m| m.len()),
        page_counts,
        skipped_records,
        compressed,
    })
}

fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    } else {
        Ok(false)
    }
}
