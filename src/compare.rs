//! Sampled pixel comparison.
//!
//! Verifies a generated artifact against a known-good reference without
//! diffing every pixel. The sample grid is deterministic:
//!
//! - columns: the horizontal midpoint of each of 9 equal-width bands,
//!   `floor(band_width * i + band_width / 2)` for `i` in `0..9`;
//! - rows: `0, 50, 100, ...` below `min(400, height)`.
//!
//! The column midpoints are computed as `floor(width * (2i + 1) / 18)` in
//! integers, which is the same value without float error.

use crate::codec::ImageCodec;
use crate::error::{Error, Result};
use crate::pixel::{PixelBuffer, Rgba};

/// Number of vertical bands sampled across the width.
pub const COLUMN_BANDS: u32 = 9;
/// Distance between sampled rows.
pub const ROW_STEP: u32 = 50;
/// Rows at or beyond this index are never sampled.
pub const MAX_SAMPLED_ROWS: u32 = 400;
/// Mismatches beyond this many are counted but not recorded.
pub const MAX_RECORDED_MISMATCHES: usize = 20;

/// One sampled coordinate where the images differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Pixel from the first image.
    pub pixel_a: Rgba,
    /// Pixel from the second image.
    pub pixel_b: Rgba,
}

/// Which input of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The first image.
    A,
    /// The second image.
    B,
}

/// Outcome of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every sampled pixel is identical.
    Match,
    /// The images differ in size; nothing was sampled.
    DimensionMismatch {
        /// Dimensions of the first image.
        a: (u32, u32),
        /// Dimensions of the second image.
        b: (u32, u32),
    },
    /// At least one sampled pixel differs.
    ContentMismatch,
    /// One of the inputs could not be decoded.
    DecodeFailure {
        /// The input that failed.
        side: Side,
        /// Decoder error text.
        message: String,
    },
}

/// Result of [`compare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonReport {
    /// Number of sampled coordinates.
    pub checked_count: u32,
    /// Total mismatching samples, including unrecorded ones.
    pub mismatch_count: u32,
    /// The first [`MAX_RECORDED_MISMATCHES`] mismatches in sampling order.
    pub mismatches: Vec<Mismatch>,
    /// Overall outcome.
    pub verdict: Verdict,
}

impl ComparisonReport {
    fn unsampled(verdict: Verdict) -> Self {
        Self {
            checked_count: 0,
            mismatch_count: 0,
            mismatches: Vec::new(),
            verdict,
        }
    }

    /// Whether the verdict is [`Verdict::Match`].
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.verdict == Verdict::Match
    }

    /// Turn any verdict other than [`Verdict::Match`] into an error.
    ///
    /// # Errors
    ///
    /// [`Error::ComparisonDimensionMismatch`], [`Error::ContentMismatch`] or
    /// [`Error::ComparisonDecode`] matching the verdict.
    pub fn ensure_match(&self) -> Result<()> {
        match &self.verdict {
            Verdict::Match => Ok(()),
            Verdict::DimensionMismatch { a, b } => Err(Error::ComparisonDimensionMismatch {
                width_a: a.0,
                height_a: a.1,
                width_b: b.0,
                height_b: b.1,
            }),
            Verdict::ContentMismatch => Err(Error::ContentMismatch {
                mismatches: self.mismatch_count,
                checked: self.checked_count,
            }),
            Verdict::DecodeFailure { side, message } => {
                Err(Error::ComparisonDecode(format!("image {side:?}: {message}")))
            }
        }
    }
}

/// Sampled column indices for an image `width` pixels wide, ascending and unique.
#[must_use]
pub fn sample_columns(width: u32) -> Vec<u32> {
    let mut cols: Vec<u32> = Vec::with_capacity(COLUMN_BANDS as usize);
    for i in 0..u64::from(COLUMN_BANDS) {
        let x = u64::from(width) * (2 * i + 1) / (2 * u64::from(COLUMN_BANDS));
        let Ok(x) = u32::try_from(x) else { continue };
        if x >= width || cols.last() == Some(&x) {
            continue;
        }
        cols.push(x);
    }
    cols
}

/// Sampled row indices for an image `height` pixels tall.
#[must_use]
pub fn sample_rows(height: u32) -> Vec<u32> {
    (0..height.min(MAX_SAMPLED_ROWS))
        .step_by(ROW_STEP as usize)
        .collect()
}

/// Compare two buffers at the sampled coordinates.
#[must_use]
#[tracing::instrument(skip_all, fields(a = ?a.dimensions(), b = ?b.dimensions()))]
pub fn compare(a: &PixelBuffer, b: &PixelBuffer) -> ComparisonReport {
    if a.dimensions() != b.dimensions() {
        tracing::debug!("dimensions differ");
        return ComparisonReport::unsampled(Verdict::DimensionMismatch {
            a: a.dimensions(),
            b: b.dimensions(),
        });
    }

    let cols = sample_columns(a.width());
    let rows = sample_rows(a.height());

    let mut checked_count = 0u32;
    let mut mismatch_count = 0u32;
    let mut mismatches = Vec::new();
    for &y in &rows {
        for &x in &cols {
            let (Some(pixel_a), Some(pixel_b)) = (a.pixel(x, y), b.pixel(x, y)) else {
                continue;
            };
            checked_count += 1;
            if pixel_a != pixel_b {
                mismatch_count += 1;
                if mismatches.len() < MAX_RECORDED_MISMATCHES {
                    mismatches.push(Mismatch {
                        x,
                        y,
                        pixel_a,
                        pixel_b,
                    });
                }
            }
        }
    }

    let verdict = if mismatch_count == 0 {
        Verdict::Match
    } else {
        Verdict::ContentMismatch
    };
    tracing::debug!(checked_count, mismatch_count, "sampled comparison done");
    ComparisonReport {
        checked_count,
        mismatch_count,
        mismatches,
        verdict,
    }
}

/// Decode both inputs with [`ImageCodec::decode_artifact`], then [`compare`] them.
///
/// A decode error yields [`Verdict::DecodeFailure`] naming the failing side.
#[must_use]
pub fn compare_encoded(codec: &dyn ImageCodec, a: &[u8], b: &[u8]) -> ComparisonReport {
    let decoded_a = match codec.decode_artifact(a) {
        Ok(buf) => buf,
        Err(e) => return decode_failure(Side::A, &e),
    };
    let decoded_b = match codec.decode_artifact(b) {
        Ok(buf) => buf,
        Err(e) => return decode_failure(Side::B, &e),
    };
    compare(&decoded_a, &decoded_b)
}

fn decode_failure(side: Side, err: &Error) -> ComparisonReport {
    tracing::warn!(?side, "cannot decode comparison input: {err}");
    ComparisonReport::unsampled(Verdict::DecodeFailure {
        side,
        message: err.to_string(),
    })
}
