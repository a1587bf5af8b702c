//! Convert straight-alpha images into premultiplied artifacts.
//!
//! Some video switchers and keyers expect color channels that are already
//! scaled by alpha. This crate decodes 8-bit PNG sources, premultiplies them with
//! truncating integer math (`c' = floor(c * a / 255)`), and writes either a
//! premultiplied PNG or an uncompressed 32-bit TGA.
//!
//! # Quick Start
//!
//! ```no_run
//! use alpha_premultiply::{BatchPipeline, TargetVariant};
//!
//! let bytes = std::fs::read("logo.png").unwrap();
//! let pipeline = BatchPipeline::png();
//! let jobs = pipeline.run_sources([("logo.png", bytes)], TargetVariant::RawContainer);
//! let artifact = jobs[0].artifact().expect("conversion failed");
//! std::fs::write(&artifact.filename, &artifact.bytes).unwrap();
//! ```
//!
//! # Verification
//!
//! [`compare()`] checks a deterministic grid of sample pixels and reports the
//! first differences, which is enough to confirm an artifact matches a
//! known-good reference.
//!
//! ```no_run
//! use alpha_premultiply::{compare_encoded, PngCodec};
//!
//! let ours = std::fs::read("logo.tga").unwrap();
//! let reference = std::fs::read("reference.tga").unwrap();
//! let report = compare_encoded(&PngCodec, &ours, &reference);
//! println!("{:?}: {} of {} samples differ", report.verdict, report.mismatch_count, report.checked_count);
//! ```

#![deny(missing_docs)]

pub mod codec;
pub mod compare;
pub mod error;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod pixel;
pub mod premultiply;
mod session;
pub mod tga;

pub use codec::{is_supported_source, ImageCodec, PngCodec};
pub use compare::{compare, compare_encoded, ComparisonReport, Mismatch, Side, Verdict};
pub use error::{Error, ErrorKind, Result};
pub use job::{artifact_filename, Artifact, ConversionJob, JobOutcome, TargetVariant};
pub use output::{ArchivePackager, DirectoryPackager};
pub use pipeline::{BatchPipeline, CancellationToken, PipelineOptions};
pub use pixel::{PixelBuffer, PremultipliedPixelBuffer, Rgba};
pub use premultiply::premultiply;
pub use session::{BatchSession, BatchSummary};
