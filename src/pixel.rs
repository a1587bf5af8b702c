//! Decoded RGBA pixel buffers.
//!
//! [`PixelBuffer`] holds straight-alpha pixels as produced by a decoder.
//! [`PremultipliedPixelBuffer`] is the same layout after every color channel
//! has been scaled by its alpha; it can only be obtained through
//! [`crate::premultiply::premultiply`], so holding one is proof of the transform.

use image::RgbaImage;

use crate::error::{Error, Result};

/// One `(r, g, b, a)` pixel.
pub type Rgba = [u8; 4];

/// A row-major, top-left origin RGBA raster with 8 bits per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferAcquisition`] unless `pixels.len() == width * height * 4`.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(pixels.len()) {
            return Err(Error::BufferAcquisition {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a buffer by evaluating `f` at every coordinate.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The flat RGBA byte array.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the buffer and return its bytes.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(px)
    }

    /// Mutable access to the bytes of a uniquely owned working copy.
    pub(crate) fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}

/// A [`PixelBuffer`] whose color channels are `floor(c * a / 255)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremultipliedPixelBuffer(PixelBuffer);

impl PremultipliedPixelBuffer {
    /// Only the premultiplier may vouch for the invariant.
    pub(crate) fn new_unchecked(buffer: PixelBuffer) -> Self {
        Self(buffer)
    }

    /// The underlying RGBA layout.
    #[must_use]
    pub fn as_buffer(&self) -> &PixelBuffer {
        &self.0
    }

    /// Drop the premultiplied marker.
    #[must_use]
    pub fn into_buffer(self) -> PixelBuffer {
        self.0
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.0.pixel(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_length_mismatch() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferAcquisition {
                width: 2,
                height: 2,
                len: 15
            }
        ));
    }

    #[test]
    fn zero_sized_buffer_is_valid() {
        let buf = PixelBuffer::from_raw(0, 7, Vec::new()).unwrap();
        assert_eq!(buf.dimensions(), (0, 7));
        assert_eq!(buf.pixel(0, 0), None);
    }

    #[test]
    fn pixel_addresses_row_major() {
        let buf = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]);
        assert_eq!(buf.pixel(2, 1), Some([2, 1, 0, 255]));
        assert_eq!(buf.as_raw()[4..8], [1, 0, 0, 255]);
        assert_eq!(buf.pixel(3, 0), None);
    }

    #[test]
    fn converts_from_rgba_image() {
        let img = RgbaImage::from_raw(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let buf = PixelBuffer::from(img);
        assert_eq!(buf.dimensions(), (1, 2));
        assert_eq!(buf.pixel(0, 1), Some([5, 6, 7, 8]));
    }
}
