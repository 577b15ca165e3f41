//! Stylus annotation for paginated documents on e-ink displays.
//!
//! The host feeds raw multi-touch slot records and stylus key events into an
//! [`Annotator`], lends it a [`draw::Surface`] to paint on, and drives its
//! timers. Strokes are indexed per page, erased by proximity, undoable, and
//! persisted to a per-document sidecar file after every change.

pub mod annotator;
pub mod config;
pub mod draw;
pub mod engine;
pub mod input;
pub mod replay;
pub mod session;
pub mod store;
pub mod timer;
pub mod util;

pub use annotator::{Annotator, Response, Signal};
pub use config::{Config, Settings};
pub use session::{PersistenceStore, SaveOutcome, SessionOptions};
pub use store::PageKey;
