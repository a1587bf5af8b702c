//! Error types for the alpha-premultiply crate.

/// Errors that can occur while decoding, premultiplying, encoding or comparing images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source bytes are not a decodable raster image.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The image decoded, but its pixel layout is not 8 bits per channel.
    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    /// A pixel buffer could not be built from the decoded data.
    #[error("cannot acquire {width}x{height} pixel buffer from {len} bytes")]
    BufferAcquisition {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Length of the byte slice that was offered.
        len: usize,
    },

    /// Width or height does not fit the 16-bit fields of the TGA header.
    #[error("image dimensions {width}x{height} exceed the TGA limit of 65535")]
    DimensionTooLarge {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// The encoded TGA size is not representable on this platform.
    #[error("encoded size of {width}x{height} TGA overflows usize")]
    EncodeOverflow {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// The standard-format encoder rejected the buffer.
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// Two images being compared have different dimensions.
    #[error("dimension mismatch: {width_a}x{height_a} vs {width_b}x{height_b}")]
    ComparisonDimensionMismatch {
        /// Width of the first image.
        width_a: u32,
        /// Height of the first image.
        height_a: u32,
        /// Width of the second image.
        width_b: u32,
        /// Height of the second image.
        height_b: u32,
    },

    /// One side of a comparison could not be decoded.
    #[error("cannot compare: {0}")]
    ComparisonDecode(String),

    /// Sampled pixels of two images differ.
    #[error("{mismatches} of {checked} sampled pixels differ")]
    ContentMismatch {
        /// Total number of mismatching samples.
        mismatches: u32,
        /// Number of sampled coordinates.
        checked: u32,
    },

    /// Two artifacts in one packaging call share a filename.
    #[error("duplicate artifact filename: {0}")]
    DuplicateArtifact(String),

    /// An artifact filename is not a single plain path component.
    #[error("artifact filename is not a plain file name: {0}")]
    UnsafeArtifactName(String),

    /// An I/O error occurred while reading sources or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The job was not started because its batch was cancelled.
    #[error("cancelled before start")]
    Cancelled,

    /// The worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Coarse classification of an [`Error`], preserved on failed jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Source bytes could not be decoded, or use an unsupported pixel format.
    Decode,
    /// No pixel buffer could be acquired for the image.
    BufferAcquisition,
    /// Dimensions exceed the raw container's 16-bit fields.
    DimensionTooLarge,
    /// Encoded size is not representable.
    EncodeOverflow,
    /// Generic serialization failure.
    Encode,
    /// Compared images differ in size.
    ComparisonDimensionMismatch,
    /// Compared images differ in content.
    ContentMismatch,
    /// Artifacts could not be laid out in the output location.
    Package,
    /// Filesystem failure.
    Io,
    /// Batch cancelled before the job started.
    Cancelled,
    /// Worker pool setup failed.
    ThreadPool,
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) | Self::UnsupportedPixelFormat(_) | Self::ComparisonDecode(_) => {
                ErrorKind::Decode
            }
            Self::BufferAcquisition { .. } => ErrorKind::BufferAcquisition,
            Self::DimensionTooLarge { .. } => ErrorKind::DimensionTooLarge,
            Self::EncodeOverflow { .. } => ErrorKind::EncodeOverflow,
            Self::Encode(_) => ErrorKind::Encode,
            Self::ComparisonDimensionMismatch { .. } => ErrorKind::ComparisonDimensionMismatch,
            Self::ContentMismatch { .. } => ErrorKind::ContentMismatch,
            Self::DuplicateArtifact(_) | Self::UnsafeArtifactName(_) => ErrorKind::Package,
            Self::Io(_) => ErrorKind::Io,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::ThreadPool(_) => ErrorKind::ThreadPool,
        }
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
