//! Single-step undo of stroke additions and deletions.

use super::index::{EraseIndex, StoredStroke, StrokeId};
use log::debug;

/// A reversible change to the stroke store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// A stroke was finalized; undo removes it again.
    Add(StrokeId),
    /// Strokes were erased or cleared; undo puts all of them back.
    Delete(Vec<StoredStroke>),
}

/// What [`UndoStack::pop_and_apply`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undone {
    /// The stroke added by the reverted action (absent if already gone).
    Removed(Option<StoredStroke>),
    /// Number of strokes put back.
    Restored(usize),
}

/// LIFO stack of [`UndoAction`]s. There is no redo.
#[derive(Debug, Default)]
pub struct UndoStack {
    actions: Vec<UndoAction>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: UndoAction) {
        if let UndoAction::Delete(strokes) = &action {
            if strokes.is_empty() {
                return;
            }
        }
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Reverts the most recent action against `store`.
    ///
    /// Returns `None` when the stack is empty.
    pub fn pop_and_apply(&mut self, store: &mut EraseIndex) -> Option<Undone> {
        let action = self.actions.pop()?;
        let undone = match action {
            UndoAction::Add(id) => {
                let removed = store.remove(id).map(|stroke| StoredStroke { id, stroke });
                if removed.is_none() {
                    debug!("Undo target {:?} no longer in store", id);
                }
                Undone::Removed(removed)
            }
            UndoAction::Delete(strokes) => Undone::Restored(store.restore(strokes)),
        };
        Some(undone)
    }
}
