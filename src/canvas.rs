//! Canvas raster model — the pixel buffer primitive and the base/paint layer
//! pair the painting engine draws into.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::color::{self, TRANSPARENT, WHITE};
use crate::log_warn;

/// Dimension sanity cap — keeps a corrupt settings file or a crafted template
/// from allocating hundreds of megabytes per layer.
const MAX_PIXELS: u64 = 256_000_000;

// ============================================================================
// PIXEL BUFFER
// ============================================================================

/// Fixed-resolution RGBA raster with bounds-forgiving access.
///
/// Reads outside `[0,W)×[0,H)` return transparent black and writes outside
/// are dropped, so tools can stamp near edges without clamping coordinates
/// first. No access path panics.
#[derive(Clone, PartialEq)]
pub struct PixelBuffer {
    pixels: RgbaImage,
}

impl PixelBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) =
            if width == 0 || height == 0 || (width as u64) * (height as u64) > MAX_PIXELS {
                log_warn!(
                    "PixelBuffer::new: dimensions {}x{} out of range, clamped to 1x1",
                    width,
                    height
                );
                (1, 1)
            } else {
                (width, height)
            };
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Wrap an already-built raster.
    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Pixel at (x, y), or transparent black outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Rgba<u8> {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return TRANSPARENT;
        }
        *self.pixels.get_pixel(x as u32, y as u32)
    }

    /// Write (x, y); silently ignored outside the buffer.
    pub fn set(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        self.pixels.put_pixel(x as u32, y as u32, color);
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = TRANSPARENT;
        }
    }

    /// Read-only view of the backing raster.
    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }
}

// ============================================================================
// LAYER STORE — letterboxed template under the mutable paint overlay
// ============================================================================

/// The two-layer canvas: a read-mostly rendering of the loaded template (the
/// base layer) under the mutable user overlay (the paint layer). Both layers
/// share the same dimensions for the lifetime of a loaded template.
pub struct LayerStore {
    base: PixelBuffer,
    paint: PixelBuffer,
}

impl LayerStore {
    /// Rasterize `source` letterboxed into a `width`×`height` canvas:
    /// "contain" scale preserving aspect ratio, centered, opaque white
    /// margins. The paint layer starts fully transparent.
    pub fn from_template(source: &RgbaImage, width: u32, height: u32) -> Self {
        // Route dimension sanitizing through PixelBuffer so both layers agree.
        let paint = PixelBuffer::new(width, height);
        let (width, height) = (paint.width(), paint.height());

        let mut base = RgbaImage::from_pixel(width, height, WHITE);
        let (sw, sh) = source.dimensions();
        if sw > 0 && sh > 0 {
            let img_aspect = sw as f32 / sh as f32;
            let canvas_aspect = width as f32 / height as f32;
            let (draw_w, draw_h) = if img_aspect > canvas_aspect {
                (width, (width as f32 / img_aspect).round() as u32)
            } else {
                ((height as f32 * img_aspect).round() as u32, height)
            };
            let draw_w = draw_w.clamp(1, width);
            let draw_h = draw_h.clamp(1, height);
            let off_x = ((width - draw_w) / 2) as i64;
            let off_y = ((height - draw_h) / 2) as i64;
            if (draw_w, draw_h) == (sw, sh) {
                // Already at the target size — don't resample line art.
                imageops::overlay(&mut base, source, off_x, off_y);
            } else {
                let scaled = imageops::resize(source, draw_w, draw_h, FilterType::Triangle);
                imageops::overlay(&mut base, &scaled, off_x, off_y);
            }
        }

        Self {
            base: PixelBuffer::from_image(base),
            paint,
        }
    }

    pub fn width(&self) -> u32 {
        self.base.width()
    }

    pub fn height(&self) -> u32 {
        self.base.height()
    }

    pub fn base(&self) -> &PixelBuffer {
        &self.base
    }

    pub fn paint(&self) -> &PixelBuffer {
        &self.paint
    }

    pub fn paint_mut(&mut self) -> &mut PixelBuffer {
        &mut self.paint
    }

    /// Effective visible color at (x, y): the paint layer wherever it has
    /// any coverage, the template underneath everywhere else. Fill-target
    /// detection and export both build on this sample.
    pub fn merged_color(&self, x: i32, y: i32) -> Rgba<u8> {
        let p = self.paint.get(x, y);
        if p.0[3] > 0 { p } else { self.base.get(x, y) }
    }

    /// Full copy of the paint layer for the history stack. Snapshots never
    /// alias the live buffer, so later strokes cannot rewrite history.
    pub fn snapshot_paint(&self) -> PixelBuffer {
        self.paint.clone()
    }

    /// Replace the paint layer with a history snapshot. A snapshot whose
    /// dimensions disagree with the canvas is ignored.
    pub fn restore_paint(&mut self, snapshot: &PixelBuffer) {
        if snapshot.width() != self.width() || snapshot.height() != self.height() {
            log_warn!(
                "restore_paint: snapshot {}x{} does not match canvas {}x{}, ignored",
                snapshot.width(),
                snapshot.height(),
                self.width(),
                self.height()
            );
            return;
        }
        self.paint = snapshot.clone();
    }

    /// Flatten base + paint into one raster: base first, then the paint
    /// layer source-over on top.
    pub fn composite(&self) -> RgbaImage {
        let mut out = self.base.as_image().clone();
        for (x, y, px) in out.enumerate_pixels_mut() {
            let overlay = self.paint.get(x as i32, y as i32);
            if overlay.0[3] > 0 {
                *px = color::blend_source_over(*px, overlay, 1.0);
            }
        }
        out
    }
}
