//! Error type for reading and writing images

use thiserror::Error;

/// Failure while decoding or encoding an image file
#[derive(Error, Debug)]
pub enum IoError {
    /// Underlying file or stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Format not recognized, or its codec feature is disabled
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Header or payload that does not describe a valid image
    #[error("invalid image data: {0}")]
    InvalidData(String),

    /// Codec rejected the input
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Codec could not produce output
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Building the decoded `Pix` failed
    #[error("image construction failed: {0}")]
    Core(#[from] localthresh_core::Error),
}

/// Result of an image I/O operation
pub type IoResult<T> = Result<T, IoError>;
