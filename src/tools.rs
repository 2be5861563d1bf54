//! Painting tools — the soft brush renderer and the flood-fill engine.
//!
//! Both write exclusively into the paint layer; the template base layer is
//! never mutated, so undo and reset can always recover it.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::canvas::{LayerStore, PixelBuffer};
use crate::color::{self, colors_match};

/// Maximum distance between consecutive dab centers along a stroke, in
/// buffer pixels. Keeps fast pointer motion gap-free while bounding the
/// number of composite operations per segment.
const STROKE_STEP: f32 = 1.5;

/// Per-dab paint opacity. Overlapping dabs along a stroke darken
/// progressively toward the selected color instead of landing at full
/// strength on the first pass.
const DAB_OPACITY: f32 = 0.2;

/// How a dab composites into the paint layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BrushMode {
    /// Tinted source-over at [`DAB_OPACITY`].
    Paint,
    /// Destination-out at full strength — removes coverage, ignores color.
    Erase,
}

// ============================================================================
// BRUSH TIP
// ============================================================================

/// A brush tip: the alpha channel of a decoded mask image, rescaled on
/// demand to the active diameter.
pub struct BrushTip {
    mask: RgbaImage,
    /// Cache of the last (diameter, scaled mask) pair — a stroke hammers a
    /// single diameter, so one slot is enough.
    scaled: Option<(u32, RgbaImage)>,
}

impl BrushTip {
    pub fn new(mask: RgbaImage) -> Self {
        Self { mask, scaled: None }
    }

    /// Built-in round tip with an opaque core and a soft rim, for embeddings
    /// that don't supply a mask image (headless mode).
    pub fn round(size: u32) -> Self {
        let size = size.max(4);
        let mut mask = RgbaImage::new(size, size);
        let radius = size as f32 / 2.0;
        for (x, y, px) in mask.enumerate_pixels_mut() {
            let dx = x as f32 + 0.5 - radius;
            let dy = y as f32 + 0.5 - radius;
            let dist = dx.hypot(dy) / radius;
            let alpha = ((1.0 - dist) * 2.0).clamp(0.0, 1.0);
            *px = Rgba([255, 255, 255, (alpha * 255.0).round() as u8]);
        }
        Self::new(mask)
    }

    fn scaled_mask(&mut self, diameter: u32) -> &RgbaImage {
        let diameter = diameter.max(1);
        let stale = match &self.scaled {
            Some((cached, _)) => *cached != diameter,
            None => true,
        };
        if stale {
            let img = imageops::resize(&self.mask, diameter, diameter, FilterType::Triangle);
            self.scaled = Some((diameter, img));
        }
        &self.scaled.as_ref().unwrap().1
    }

    /// Composite one dab centered at `center` into the paint layer.
    ///
    /// Paint mode builds the tinted stamp (the requested color's RGB under
    /// the mask's alpha); erase mode uses the mask alpha alone.
    pub fn apply_dab(
        &mut self,
        paint: &mut PixelBuffer,
        center: (f32, f32),
        color: Rgba<u8>,
        diameter: u32,
        mode: BrushMode,
    ) {
        let half = diameter as f32 / 2.0;
        let origin_x = (center.0 - half).round() as i32;
        let origin_y = (center.1 - half).round() as i32;
        let stamp = self.scaled_mask(diameter);
        for (sx, sy, px) in stamp.enumerate_pixels() {
            let mask_alpha = px.0[3];
            if mask_alpha == 0 {
                continue;
            }
            let x = origin_x + sx as i32;
            let y = origin_y + sy as i32;
            let dst = paint.get(x, y);
            let out = match mode {
                BrushMode::Paint => color::blend_source_over(
                    dst,
                    Rgba([color.0[0], color.0[1], color.0[2], mask_alpha]),
                    DAB_OPACITY,
                ),
                BrushMode::Erase => color::blend_destination_out(dst, mask_alpha),
            };
            paint.set(x, y, out);
        }
    }

    /// Stamp evenly spaced dabs from `from` to `to`, both endpoints
    /// included, so fast pointer motion leaves no gaps.
    pub fn stroke_to(
        &mut self,
        paint: &mut PixelBuffer,
        from: (f32, f32),
        to: (f32, f32),
        color: Rgba<u8>,
        diameter: u32,
        mode: BrushMode,
    ) {
        for center in stroke_centers(from, to) {
            self.apply_dab(paint, center, color, diameter, mode);
        }
    }
}

/// Dab centers for one stroke segment: `max(floor(dist / 1.5), 1)` steps,
/// `steps + 1` centers including both endpoints.
pub fn stroke_centers(from: (f32, f32), to: (f32, f32)) -> Vec<(f32, f32)> {
    let dist = (to.0 - from.0).hypot(to.1 - from.1);
    let steps = ((dist / STROKE_STEP).floor() as u32).max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            (
                from.0 + (to.0 - from.0) * t,
                from.1 + (to.1 - from.1) * t,
            )
        })
        .collect()
}

// ============================================================================
// FLOOD FILL
// ============================================================================

/// Tolerance-based 4-connected flood fill, seeded at `seed` (buffer
/// coordinates, floored).
///
/// The target color is the merged (paint-over-base) sample at the seed; the
/// fill itself is written only into the paint layer. Matching compares all
/// four channels with a per-channel absolute tolerance. Returns whether any
/// pixel changed, so the caller can decide on a history commit.
///
/// A region already within tolerance of `fill_color` is left untouched —
/// this keeps the operation idempotent and avoids re-filling a region with
/// an effectively identical color.
pub fn flood_fill(
    layers: &mut LayerStore,
    seed: (f32, f32),
    fill_color: Rgba<u8>,
    tolerance: u8,
) -> bool {
    let w = layers.width() as i32;
    let h = layers.height() as i32;
    let seed_x = seed.0.floor() as i32;
    let seed_y = seed.1.floor() as i32;
    if seed_x < 0 || seed_y < 0 || seed_x >= w || seed_y >= h {
        return false;
    }

    let target = layers.merged_color(seed_x, seed_y);
    if colors_match(target, fill_color, tolerance) {
        return false;
    }

    let wu = w as usize;
    // Dense visited map: every pixel is evaluated at most once, bounding the
    // whole fill to O(W·H).
    let mut visited = vec![0u8; wu * h as usize];
    // Explicit stack of flat indices — no recursion, no depth limit on large
    // regions, no per-entry tuple overhead.
    let mut stack: Vec<u32> = Vec::with_capacity(4096);
    stack.push((seed_y as usize * wu + seed_x as usize) as u32);
    let mut changed = false;

    while let Some(idx) = stack.pop() {
        let i = idx as usize;
        if visited[i] != 0 {
            continue;
        }
        visited[i] = 1;

        let x = (i % wu) as i32;
        let y = (i / wu) as i32;
        if !colors_match(layers.merged_color(x, y), target, tolerance) {
            continue;
        }

        layers.paint_mut().set(x, y, fill_color);
        changed = true;

        // 4-connected neighbors; the bounds guards keep flat indices valid.
        if x > 0 {
            stack.push(idx - 1);
        }
        if x + 1 < w {
            stack.push(idx + 1);
        }
        if y > 0 {
            stack.push(idx - wu as u32);
        }
        if y + 1 < h {
            stack.push(idx + wu as u32);
        }
    }

    changed
}
