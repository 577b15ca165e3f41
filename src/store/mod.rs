//! Stroke storage: page keys, the page-indexed erase store, and undo.

pub mod index;
pub mod page;
pub mod undo;

pub use index::{EraseIndex, StoredStroke, StrokeId, StrokeSummary};
pub use page::{CanonicalPage, PageKey};
pub use undo::{UndoAction, UndoStack, Undone};
