//! Straight-to-premultiplied alpha conversion.
//!
//! Each color channel is scaled by the pixel's opacity and truncated:
//! `c' = floor(c * a / 255)`, alpha unchanged. Integer division keeps this
//! bit-exact for every input.

use crate::pixel::{PixelBuffer, PremultipliedPixelBuffer, Rgba};

/// Premultiply a single channel value by `alpha`.
#[inline]
#[must_use]
pub fn premultiply_channel(channel: u8, alpha: u8) -> u8 {
    // 255 * 255 fits in u16, and the quotient is never above 255.
    #[allow(clippy::cast_possible_truncation)]
    {
        (u16::from(channel) * u16::from(alpha) / 255) as u8
    }
}

/// Premultiply one `(r, g, b, a)` pixel.
#[inline]
#[must_use]
pub fn premultiply_pixel([r, g, b, a]: Rgba) -> Rgba {
    [
        premultiply_channel(r, a),
        premultiply_channel(g, a),
        premultiply_channel(b, a),
        a,
    ]
}

/// Premultiply a flat RGBA byte slice in place. Trailing bytes that do not
/// form a whole pixel are left untouched.
pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        match a {
            255 => {}
            0 => {
                px[0] = 0;
                px[1] = 0;
                px[2] = 0;
            }
            _ => {
                px[0] = premultiply_channel(px[0], a);
                px[1] = premultiply_channel(px[1], a);
                px[2] = premultiply_channel(px[2], a);
            }
        }
    }
}

/// Premultiply a decoded buffer, consuming it as the working copy.
#[must_use]
pub fn premultiply(mut buffer: PixelBuffer) -> PremultipliedPixelBuffer {
    premultiply_rgba8_in_place(buffer.raw_mut());
    PremultipliedPixelBuffer::new_unchecked(buffer)
}
