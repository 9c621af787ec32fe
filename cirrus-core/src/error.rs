//! Error types for Cirrus core

use thiserror::Error;

/// Errors raised while planning or assembling a multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipartError {
    /// Part size below the service minimum
    #[error("part size {size} is below the minimum of {min} bytes")]
    PartSizeTooSmall { size: u64, min: u64 },

    /// Part size above the service maximum
    #[error("part size {size} is above the maximum of {max} bytes")]
    PartSizeTooLarge { size: u64, max: u64 },

    /// The object would need more parts than the service accepts
    #[error("object of {size} bytes needs {parts} parts, more than the limit of {max}")]
    TooManyParts { size: u64, parts: u64, max: u64 },

    /// Finalize was requested without any uploaded part
    #[error("no parts were uploaded")]
    NoParts,

    /// A part number between 1 and the last part was never uploaded
    #[error("part {0} is missing")]
    MissingPart(i32),

    /// The same part number was recorded more than once
    #[error("part {0} was recorded twice")]
    DuplicatePart(i32),

    /// Part numbers start at 1 and never exceed the part limit
    #[error("part number {0} is out of range")]
    InvalidPartNumber(i32),
}
