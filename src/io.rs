//! Image source decoding and PNG encoding.
//!
//! All filesystem access for the crate lives here and in the CLI — the paint
//! engine itself only ever sees already-decoded rasters.

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};

/// Error type for image load/save operations.
#[derive(Debug)]
pub enum IoError {
    Io(std::io::Error),
    Decode(String),
    Encode(String),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::Io(e) => write!(f, "I/O error: {}", e),
            IoError::Decode(e) => write!(f, "Decode error: {}", e),
            IoError::Encode(e) => write!(f, "Encode error: {}", e),
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Io(e)
    }
}

/// Decode any raster format the `image` crate understands into RGBA.
///
/// This is the narrow seam the engine's collaborators use for template and
/// brush-tip sources; a failure here leaves the engine not-ready rather than
/// exposing a partial buffer.
pub fn load_image(path: &Path) -> Result<RgbaImage, IoError> {
    let img = image::open(path)
        .map_err(|e| IoError::Decode(format!("{}: {}", path.display(), e)))?;
    Ok(img.into_rgba8())
}

/// Decode an in-memory byte buffer (e.g. an embedded default brush tip).
pub fn load_image_from_memory(bytes: &[u8]) -> Result<RgbaImage, IoError> {
    let img = image::load_from_memory(bytes).map_err(|e| IoError::Decode(e.to_string()))?;
    Ok(img.into_rgba8())
}

/// Encode `img` as PNG into memory.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, IoError> {
    let mut out = Vec::new();
    let encoder = PngEncoder::new(&mut out);
    encoder
        .write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgba8)
        .map_err(|e| IoError::Encode(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_encode_decode_preserves_pixels() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(2, 1, Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&img).unwrap();
        let back = load_image_from_memory(&bytes).unwrap();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(*back.get_pixel(2, 1), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn missing_file_reports_decode_failure() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, IoError::Decode(_)));
    }
}
