//! Conversion jobs and the artifacts they produce.

use std::sync::Arc;

use crate::codec::ImageCodec;
use crate::error::{Error, Result};
use crate::premultiply::premultiply;
use crate::tga;

/// Mime tag of raw TGA artifacts.
pub const TGA_MIME: &str = "image/x-tga";

/// Which artifact a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetVariant {
    /// Premultiplied pixels re-encoded through the standard codec.
    StandardPremultiplied,
    /// Premultiplied pixels in an uncompressed 32-bit TGA.
    RawContainer,
}

/// A finished output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Output file name derived from the source name.
    pub filename: String,
    /// Mime tag of `bytes`.
    pub mime: &'static str,
    /// Encoded file contents.
    pub bytes: Arc<[u8]>,
}

/// State of a [`ConversionJob`].
#[derive(Debug)]
pub enum JobOutcome {
    /// Not processed yet.
    Pending,
    /// Processed successfully.
    Artifact(Artifact),
    /// Processing failed; the error's [`Error::kind`] tells why.
    Failure(Error),
}

/// One source image paired with its target variant.
#[derive(Debug)]
pub struct ConversionJob {
    source_name: String,
    source_bytes: Arc<[u8]>,
    target: TargetVariant,
    outcome: JobOutcome,
}

impl ConversionJob {
    /// Create a pending job.
    pub fn new(
        source_name: impl Into<String>,
        source_bytes: impl Into<Arc<[u8]>>,
        target: TargetVariant,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            source_bytes: source_bytes.into(),
            target,
            outcome: JobOutcome::Pending,
        }
    }

    /// Source file name as submitted.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Source file contents.
    #[must_use]
    pub fn source_bytes(&self) -> &[u8] {
        &self.source_bytes
    }

    /// Requested output variant.
    #[must_use]
    pub fn target(&self) -> TargetVariant {
        self.target
    }

    /// Current outcome.
    #[must_use]
    pub fn outcome(&self) -> &JobOutcome {
        &self.outcome
    }

    /// Whether the job has not been processed yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.outcome, JobOutcome::Pending)
    }

    /// The artifact, if the job succeeded.
    #[must_use]
    pub fn artifact(&self) -> Option<&Artifact> {
        match &self.outcome {
            JobOutcome::Artifact(a) => Some(a),
            _ => None,
        }
    }

    /// The error, if the job failed.
    #[must_use]
    pub fn failure(&self) -> Option<&Error> {
        match &self.outcome {
            JobOutcome::Failure(e) => Some(e),
            _ => None,
        }
    }

    /// Record the job's result. Only a pending job transitions; later calls are ignored.
    pub(crate) fn settle(&mut self, result: Result<Artifact>) {
        if !self.is_pending() {
            return;
        }
        self.outcome = match result {
            Ok(artifact) => JobOutcome::Artifact(artifact),
            Err(e) => JobOutcome::Failure(e),
        };
    }

    /// Decode, premultiply and encode this job's source.
    ///
    /// # Errors
    ///
    /// Any decode, dimension or encode error from the codec or TGA writer.
    pub fn convert(&self, codec: &dyn ImageCodec) -> Result<Artifact> {
        let buffer = codec.decode(&self.source_bytes)?;
        let (bytes, mime) = match self.target {
            TargetVariant::StandardPremultiplied => {
                let premultiplied = premultiply(buffer);
                let bytes = codec.encode_standard(premultiplied.as_buffer())?;
                (bytes, codec.mime_type())
            }
            TargetVariant::RawContainer => (tga::encode_straight(buffer)?, TGA_MIME),
        };
        Ok(Artifact {
            filename: artifact_filename(&self.source_name, self.target, codec.extension()),
            mime,
            bytes: bytes.into(),
        })
    }
}

/// Split `name` at its last `.` into `(base, extension)`; the extension keeps the dot.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx..])),
        _ => (name, None),
    }
}

/// Output file name for a source name.
///
/// `logo.png` becomes `logo_premult.png` for standard output and `logo.tga`
/// for raw output. A source without an extension takes `standard_ext`. Only
/// the last path component of `source_name` is used.
#[must_use]
pub fn artifact_filename(source_name: &str, target: TargetVariant, standard_ext: &str) -> String {
    let name = source_name.rsplit(['/', '\\']).next().unwrap_or(source_name);
    let (base, ext) = split_extension(name);
    match target {
        TargetVariant::StandardPremultiplied => {
            format!("{base}_premult{}", ext.unwrap_or(standard_ext))
        }
        TargetVariant::RawContainer => format!("{base}.tga"),
    }
}
