//! Target surface abstraction and an in-memory grayscale implementation.

use super::color::{Color, WHITE};
use crate::util::Rect;

/// Pixel surface owned by the host (framebuffer, widget buffer, ...).
///
/// Annotation code only needs a rectangle fill and three refresh
/// granularities. It borrows the surface per call and never keeps it.
pub trait Surface {
    /// Surface dimensions in logical pixels.
    fn size(&self) -> (i32, i32);

    /// Fills `rect` (already in logical coordinates) with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Immediate partial refresh of one region (fast waveform).
    fn refresh_partial(&mut self, rect: Rect);

    /// Fast refresh of the whole annotation widget.
    fn refresh_fast(&mut self);

    /// Full-quality, full-screen refresh (clears ghosting).
    fn refresh_full(&mut self);
}

/// Refresh request recorded by [`PixelSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Partial(Rect),
    Fast,
    Full,
}

/// 8-bit grayscale buffer, the pixel format of most e-ink panels.
///
/// Used by the replay harness and the tests; it records every refresh it is
/// asked for so scheduling can be asserted.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
    refreshes: Vec<Refresh>,
    fill_calls: usize,
}

impl PixelSurface {
    /// Creates a white surface. Non-positive dimensions yield an empty surface.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            pixels: vec![WHITE.luma(); (width as usize) * (height as usize)],
            refreshes: Vec::new(),
            fill_calls: 0,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Number of pixels darker than white.
    pub fn inked_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| **p != WHITE.luma()).count()
    }

    pub fn refreshes(&self) -> &[Refresh] {
        &self.refreshes
    }

    pub fn take_refreshes(&mut self) -> Vec<Refresh> {
        std::mem::take(&mut self.refreshes)
    }

    pub fn fill_calls(&self) -> usize {
        self.fill_calls
    }

    /// Resets every pixel to white, as a host does before redrawing a page.
    pub fn clear(&mut self) {
        self.pixels.fill(WHITE.luma());
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_calls += 1;
        let Some(clipped) = rect.clamp_to_bounds(self.width, self.height) else {
            return;
        };
        let value = color.luma() as u32;
        let alpha = color.a as u32;
        for y in clipped.y..clipped.bottom() {
            let row = y as usize * self.width as usize;
            for x in clipped.x..clipped.right() {
                let px = &mut self.pixels[row + x as usize];
                *px = ((value * alpha + *px as u32 * (255 - alpha) + 127) / 255) as u8;
            }
        }
    }

    fn refresh_partial(&mut self, rect: Rect) {
        self.refreshes.push(Refresh::Partial(rect));
    }

    fn refresh_fast(&mut self) {
        self.refreshes.push(Refresh::Fast);
    }

    fn refresh_full(&mut self) {
        self.refreshes.push(Refresh::Full);
    }
}
