//! Annotation persistence.
//!
//! Serialises a document's strokes to a sidecar file next to the document,
//! with locking, optional compression, and backup rotation, and restores them
//! leniently so that damaged or older files never block annotating.

mod options;
mod snapshot;
mod storage;

pub use options::{
    CompressionMode, DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES, DEFAULT_EXTENSION, DEFAULT_FILE_STEM,
    SessionOptions, default_sidecar_dir, options_from_config,
};
pub use snapshot::{
    LoadOutcome, LoadedStrokes, PersistenceStore, SaveOutcome, load_strokes, save_strokes,
};
pub use storage::{ClearOutcome, SessionInspection, clear_session, inspect_session};
