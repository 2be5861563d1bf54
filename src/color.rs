//! Color primitives — hex parsing, tolerance matching, and the two blend
//! modes the paint layer is built on.
//!
//! All colors are straight (non-premultiplied) alpha `Rgba<u8>`, matching the
//! raster buffers.

use image::Rgba;

/// Fully transparent black — the value out-of-bounds reads resolve to.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Opaque white — the letterbox margin color.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Parse a hex color string into an opaque color.
///
/// Accepts `#RGB` and `#RRGGBB` (leading `#` optional); shorthand digits are
/// doubled, so `#F00` and `#FF0000` parse to the same color. Anything else
/// returns `None`.
pub fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    let expanded;
    let hex = match hex.len() {
        3 => {
            expanded = hex.chars().flat_map(|c| [c, c]).collect::<String>();
            expanded.as_str()
        }
        6 => hex,
        _ => return None,
    };
    let val = u32::from_str_radix(hex, 16).ok()?;
    Some(Rgba([(val >> 16) as u8, (val >> 8) as u8, val as u8, 255]))
}

/// True when every channel of `a` is within `tolerance` of the corresponding
/// channel of `b`. Alpha participates like any other channel. Symmetric in
/// its arguments.
pub fn colors_match(a: Rgba<u8>, b: Rgba<u8>, tolerance: u8) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .all(|(&ca, &cb)| ca.abs_diff(cb) <= tolerance)
}

/// Source-over blend of `src` onto `dst`, with `src` further scaled by
/// `opacity` (0.0–1.0).
pub fn blend_source_over(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let sa = src.0[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return TRANSPARENT;
    }
    let channel = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        (((s * sa + d * da * (1.0 - sa)) / out_a) * 255.0).round() as u8
    };
    Rgba([
        channel(src.0[0], dst.0[0]),
        channel(src.0[1], dst.0[1]),
        channel(src.0[2], dst.0[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Destination-out: subtracts coverage from `dst` wherever the source has
/// alpha, regardless of color. Color channels are left untouched.
pub fn blend_destination_out(dst: Rgba<u8>, src_alpha: u8) -> Rgba<u8> {
    let keep = 1.0 - src_alpha as f32 / 255.0;
    Rgba([
        dst.0[0],
        dst.0[1],
        dst.0[2],
        (dst.0[3] as f32 * keep).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_shorthand_expands() {
        assert_eq!(parse_hex("#F00"), parse_hex("#FF0000"));
        assert_eq!(parse_hex("#F00"), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(parse_hex("123458"), Some(Rgba([0x12, 0x34, 0x58, 255])));
    }

    #[test]
    fn hex_rejects_garbage() {
        assert_eq!(parse_hex(""), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#GGHHII"), None);
        assert_eq!(parse_hex("#FF00004"), None);
    }

    #[test]
    fn tolerance_match_is_symmetric() {
        let samples = [
            Rgba([0, 0, 0, 0]),
            Rgba([255, 255, 255, 255]),
            Rgba([10, 200, 45, 128]),
            Rgba([60, 150, 95, 178]),
            Rgba([255, 0, 128, 1]),
        ];
        for &a in &samples {
            for &b in &samples {
                for t in [0u8, 1, 49, 50, 51, 255] {
                    assert_eq!(colors_match(a, b, t), colors_match(b, a, t));
                }
            }
        }
    }

    #[test]
    fn tolerance_bounds_every_channel() {
        let a = Rgba([100, 100, 100, 255]);
        assert!(colors_match(a, Rgba([150, 100, 100, 255]), 50));
        assert!(!colors_match(a, Rgba([151, 100, 100, 255]), 50));
        // A single out-of-band channel fails the match even if the rest agree
        assert!(!colors_match(a, Rgba([100, 100, 100, 100]), 50));
    }

    #[test]
    fn source_over_onto_transparent_keeps_src() {
        let out = blend_source_over(TRANSPARENT, Rgba([200, 40, 10, 255]), 1.0);
        assert_eq!(out, Rgba([200, 40, 10, 255]));
    }

    #[test]
    fn source_over_zero_opacity_is_identity() {
        let dst = Rgba([1, 2, 3, 4]);
        assert_eq!(blend_source_over(dst, WHITE, 0.0), dst);
    }

    #[test]
    fn destination_out_clears_alpha_only() {
        let dst = Rgba([9, 8, 7, 200]);
        let out = blend_destination_out(dst, 255);
        assert_eq!(out, Rgba([9, 8, 7, 0]));
        let half = blend_destination_out(dst, 128);
        assert_eq!(half.0[..3], [9, 8, 7]);
        assert!(half.0[3] < 200 && half.0[3] > 0);
    }
}
