//! Rendering primitives and stroke definitions.
//!
//! This module defines the core drawing types used for annotation:
//! - [`Color`] and [`Palette`]: symbolic color names and their RGBA values
//! - [`Stroke`] and [`Point`]: one freehand gesture and its coordinates
//! - [`Surface`]: the rectangle-fill/refresh interface a host provides
//! - Stamped-line rendering and dirty-region tracking

pub mod color;
pub mod dirty;
pub mod render;
pub mod stroke;
pub mod surface;

// Re-export commonly used types at module level
pub use color::{Color, HIGHLIGHT_TONE, Palette};
pub use dirty::DirtyTracker;
pub use render::{render_dot, render_segment, render_stroke, render_strokes, stroke_color};
pub use stroke::{Point, Stroke};
pub use surface::{PixelSurface, Refresh, Surface};
