//! Per-document annotation session.
//!
//! Routes classified stylus events to the stroke engine (pen, highlighter) or
//! the erase index (eraser), records undo steps, persists after every change,
//! and multiplexes the timers of every component behind one deadline.

mod actions;
mod handlers;
mod state;
#[cfg(test)]
mod tests;

pub use state::{Annotator, Response, Signal};
