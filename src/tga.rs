//! Uncompressed 32-bit TGA serialization.
//!
//! Layout: an 18-byte little-endian header followed by `width * height`
//! pixels stored as `B, G, R, A`, rows top to bottom (descriptor bit 5 set),
//! so the decoded row order is written as-is.

use crate::error::{Error, Result};
use crate::pixel::{PixelBuffer, PremultipliedPixelBuffer};
use crate::premultiply::premultiply;

/// Size of the fixed TGA header.
pub const HEADER_LEN: usize = 18;

/// Image type 2: uncompressed true-color.
pub const IMAGE_TYPE_TRUE_COLOR: u8 = 2;

/// Bits per pixel of the pixel data.
pub const PIXEL_DEPTH: u8 = 32;

/// Image descriptor: 8 alpha bits, top-left origin.
pub const DESCRIPTOR_TOP_LEFT_ALPHA8: u8 = 0x28;

/// Build the header for a `width x height` image.
///
/// # Errors
///
/// Returns [`Error::DimensionTooLarge`] if either dimension exceeds `u16::MAX`.
pub fn header(width: u32, height: u32) -> Result<[u8; HEADER_LEN]> {
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(Error::DimensionTooLarge { width, height });
    };

    let mut hdr = [0u8; HEADER_LEN];
    // id length, color map and origin fields stay 0
    hdr[2] = IMAGE_TYPE_TRUE_COLOR;
    hdr[12..14].copy_from_slice(&w.to_le_bytes());
    hdr[14..16].copy_from_slice(&h.to_le_bytes());
    hdr[16] = PIXEL_DEPTH;
    hdr[17] = DESCRIPTOR_TOP_LEFT_ALPHA8;
    Ok(hdr)
}

/// Total encoded length for a `width x height` image.
///
/// # Errors
///
/// Returns [`Error::EncodeOverflow`] if the length does not fit `usize`.
pub fn encoded_len(width: u32, height: u32) -> Result<usize> {
    usize::try_from(width)
        .ok()
        .zip(usize::try_from(height).ok())
        .and_then(|(w, h)| w.checked_mul(h))
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(HEADER_LEN))
        .ok_or(Error::EncodeOverflow { width, height })
}

/// Serialize an already premultiplied buffer.
///
/// # Errors
///
/// Returns [`Error::DimensionTooLarge`] for dimensions above 65535, or
/// [`Error::EncodeOverflow`] if the output size is not representable.
pub fn encode(buffer: &PremultipliedPixelBuffer) -> Result<Vec<u8>> {
    let buffer = buffer.as_buffer();
    let (width, height) = buffer.dimensions();
    let hdr = header(width, height)?;
    let len = encoded_len(width, height)?;

    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(&hdr);
    for px in buffer.as_raw().chunks_exact(4) {
        out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
    }
    debug_assert_eq!(out.len(), len);
    Ok(out)
}

/// Premultiply a straight-alpha buffer and serialize it.
///
/// Dimensions are checked before any pixel work is done.
///
/// # Errors
///
/// Same as [`encode`].
pub fn encode_straight(buffer: PixelBuffer) -> Result<Vec<u8>> {
    let (width, height) = buffer.dimensions();
    header(width, height)?;
    encoded_len(width, height)?;
    encode(&premultiply(buffer))
}
