use std::path::PathBuf;

use thiserror::Error;

/// An object could not be interpreted as a DICOM image.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Not a DICOM object: {0}")]
    NotDicom(#[from] dicom::object::ReadError),

    #[error("Missing DICOM magic code")]
    MissingMagic,

    #[error("No pixel data")]
    MissingPixelData,

    #[error("Could not decode pixel data: {0}")]
    PixelDecode(String),

    #[error("Unsupported bits allocated: {0}")]
    UnsupportedBitDepth(u16),
}

/// Sample arrays must be 2-D (single channel) or 3-D (multi channel).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Unsupported sample array dimensionality: {ndim}")]
pub struct UnsupportedShapeError {
    pub ndim: usize,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    UnsupportedShape(#[from] UnsupportedShapeError),

    #[error("Unsupported number of channels: {0}")]
    UnsupportedChannels(usize),

    #[error("Empty sample array")]
    Empty,

    #[error("Sample buffer does not match a {width}x{height} image")]
    BufferSize { width: u32, height: u32 },

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Nothing in the batch validated as DICOM. This is a reportable state
/// rather than a failure of the pipeline.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("No DICOM files found in uploaded files")]
pub struct EmptyBatchError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    #[error("Upload of {size} bytes exceeds the limit of {limit} bytes")]
    UploadTooLarge { size: u64, limit: u64 },

    #[error("Batch storage at {0} was already released")]
    Released(PathBuf),
}
