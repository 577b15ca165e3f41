use log::{debug, info};

use super::Annotator;
use super::state::Signal;
use crate::draw::{Surface, render_strokes};
use crate::store::{UndoAction, Undone};

impl Annotator {
    /// Reverts the most recent add or delete.
    ///
    /// Returns [`Signal::RedrawPage`] when the store changed.
    pub fn undo(&mut self) -> Option<Signal> {
        self.commit_erase();
        let undone = self.undo.pop_and_apply(&mut self.store)?;
        match &undone {
            Undone::Removed(Some(stored)) => debug!("Undo removed stroke {:?}", stored.id),
            Undone::Removed(None) => debug!("Undo target already gone"),
            Undone::Restored(count) => debug!("Undo restored {} stroke(s)", count),
        }
        self.save();
        match undone {
            Undone::Removed(None) => None,
            _ => Some(Signal::RedrawPage),
        }
    }

    /// Removes every stroke on the current page as one undoable step.
    pub fn clear_page(&mut self) -> Option<Signal> {
        self.commit_erase();
        let removed = self.store.remove_page(&self.page)?;
        info!("Cleared {} stroke(s) from page {}", removed.len(), self.page);
        self.undo.push(UndoAction::Delete(removed));
        self.save();
        Some(Signal::RedrawPage)
    }

    /// Removes every stroke in the document as one undoable step.
    pub fn clear_all(&mut self) -> Option<Signal> {
        self.commit_erase();
        let removed = self.store.remove_all()?;
        info!("Cleared all {} stroke(s)", removed.len());
        self.undo.push(UndoAction::Delete(removed));
        self.save();
        Some(Signal::RedrawPage)
    }

    /// Paints every stored stroke of the current page and refreshes the
    /// annotation widget.
    ///
    /// Called by the host after it has redrawn the page content underneath.
    pub fn render_page(&self, surface: &mut dyn Surface) {
        render_strokes(
            surface,
            self.store.on_page(&self.page),
            &self.settings.palette,
        );
        surface.refresh_fast();
    }
}
