//! Decode and standard-format encode capability.
//!
//! The pipeline only needs two things from an image library: turn source bytes
//! into a [`PixelBuffer`] and turn a buffer back into a compressed standard
//! image. [`ImageCodec`] is that seam; [`PngCodec`] implements it with the
//! `image` crate.

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use crate::error::{Error, Result};
use crate::pixel::PixelBuffer;

/// A raster decoder plus a standard-format encoder.
pub trait ImageCodec: Send + Sync {
    /// Decode source bytes into straight-alpha RGBA.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ErrorKind::Decode`] error for undecodable or unsupported input.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer>;

    /// Decode a produced artifact, in either the standard format or TGA.
    ///
    /// # Errors
    ///
    /// Same as [`ImageCodec::decode`].
    fn decode_artifact(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        self.decode(bytes)
    }

    /// Encode a buffer into the standard compressed format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the encoder fails.
    fn encode_standard(&self, buffer: &PixelBuffer) -> Result<Vec<u8>>;

    /// Mime type of [`ImageCodec::encode_standard`] output.
    fn mime_type(&self) -> &'static str;

    /// File extension, with the leading dot, of standard output.
    fn extension(&self) -> &'static str;
}

/// PNG backed by the `image` crate. Sources must be 8-bit PNG; other formats
/// are decode errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(Error::Decode)?;
        eight_bit(img)
    }

    fn decode_artifact(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        // TGA has no signature; anything that is not PNG is read as TGA.
        let format = match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => ImageFormat::Png,
            _ => ImageFormat::Tga,
        };
        let img = image::load_from_memory_with_format(bytes, format).map_err(Error::Decode)?;
        eight_bit(img)
    }

    fn encode_standard(&self, buffer: &PixelBuffer) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                buffer.as_raw(),
                buffer.width(),
                buffer.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(Error::Encode)?;
        Ok(out)
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }

    fn extension(&self) -> &'static str {
        ".png"
    }
}

fn eight_bit(img: DynamicImage) -> Result<PixelBuffer> {
    match img.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {
            Ok(PixelBuffer::from(img.into_rgba8()))
        }
        other => Err(Error::UnsupportedPixelFormat(format!("{other:?}"))),
    }
}

/// Whether `path` looks like an accepted source image (`.png`, any case).
#[must_use]
pub fn is_supported_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}
