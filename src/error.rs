//! Error types for squeeze-io

use std::io;

use crate::chunk::{Identifier, SequenceFault};

/// Result type for squeeze-io operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, embedding into, or reading from a JPEG
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stream does not begin with a start-of-image marker
    #[error("Invalid container: expected JPEG start-of-image (FF D8), found {found:02X?}")]
    InvalidContainer { found: Vec<u8> },

    /// A marker segment is framed inconsistently
    #[error("Malformed segment at offset {offset}: {reason}")]
    MalformedSegment { offset: u64, reason: String },

    /// A declared length runs past the end of the stream, or the stream ends
    /// before scan data or end-of-image is reached
    #[error("Truncated stream at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// APPn number outside 0-15
    #[error("Invalid APPn segment number {0} (must be 0-15)")]
    InvalidSegmentNumber(u8),

    /// APPn number is not one of the conventionally free markers (strict mode only)
    #[error("APP{0} is not registered as a free segment and may hold application data")]
    ReservedSegment(u8),

    /// Payload needs more chunks than a chunk header can count
    #[error("Payload too large: {size} bytes needs {chunks} chunks (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
        chunks: usize,
    },

    /// A single segment payload does not fit a 16-bit length field
    #[error("Segment payload too large: {size} bytes (max: {max})")]
    SegmentTooLarge { size: usize, max: usize },

    /// No chunk under the requested (segment, identifier)
    #[error("No chunks with identifier {identifier} found in APP{segment}")]
    SegmentNotFound { segment: u8, identifier: Identifier },

    /// Matched chunks do not form one complete, unambiguous set
    #[error("Corrupt chunk sequence for identifier {identifier} in APP{segment}: {fault}")]
    CorruptChunkSequence {
        segment: u8,
        identifier: Identifier,
        fault: SequenceFault,
    },
}
