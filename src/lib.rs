//! Embed arbitrary payloads in JPEG APPn marker segments and recover them.
//!
//! A payload is split into chunks of at most 65528 bytes. Each chunk is
//! tagged with a 3-byte identifier, the chunk count and its index, and stored
//! as the payload of one APPn segment inserted just before the scan data.
//! Pixel data is never decoded; everything from SOS onwards is copied
//! verbatim.
//!
//! # Design Principles
//!
//! - **No pixel decoding**: only the marker framing of the header is parsed
//! - **Byte-exact rebuild**: scanning a serialized image yields the same segments
//! - **Independent payloads**: identifiers separate payloads sharing one APPn number
//! - **Nothing half-written**: a failed write leaves the image untouched
//!
//! # Quick Start
//!
//! ```no_run
//! use squeeze_io::Image;
//!
//! # fn main() -> squeeze_io::Result<()> {
//! let mut image = Image::open("image.jpg")?;
//! image.write(4, "PSZ", b"secret bytes")?;
//! image.save("output.jpg")?;
//!
//! let image = Image::open("output.jpg")?;
//! let data = image.read(4, "PSZ")?;
//! assert_eq!(data, b"secret bytes");
//! # Ok(())
//! # }
//! ```
//!
//! # Lower-Level API
//!
//! The pieces [`Image`] is built from are public:
//!
//! ```
//! use squeeze_io::{assembler, chunk, scanner, Identifier};
//!
//! # fn main() -> squeeze_io::Result<()> {
//! let mut store = scanner::scan(&[0xFF, 0xD8, 0xFF, 0xD9])?;
//!
//! let id = Identifier::from("ABC");
//! let chunks = chunk::encode(id, b"payload")?;
//! store.insert_app_segments(5, chunks.iter().map(chunk::Chunk::to_bytes))?;
//!
//! let bytes = assembler::serialize(&store)?;
//! let reloaded = scanner::scan(&bytes)?;
//! let data = chunk::decode(id, reloaded.segments_for(5)).map_err(|e| e.at(5, id))?;
//! assert_eq!(data, b"payload");
//! # Ok(())
//! # }
//! ```
//!
//! # Capacity
//!
//! | Limit | Value |
//! |---|---|
//! | APPn segment payload | 65533 bytes |
//! | Chunk fragment | 65528 bytes |
//! | Chunks per (segment, identifier) | 255 |
//! | Payload per (segment, identifier) | 16,709,640 bytes |

pub mod assembler;
pub mod chunk;
mod error;
mod image;
pub mod marker;
pub mod scanner;
mod segment;
mod store;

pub use chunk::{
    Chunk, ChunkSet, DecodeError, Identifier, SequenceFault, CHUNK_CAPACITY, CHUNK_HEADER_SIZE,
    MAX_CHUNKS, MAX_PAYLOAD_SIZE, MAX_SEGMENT_PAYLOAD,
};
pub use error::{Error, Result};
pub use image::{Image, ImageBuilder, WriteOptions};
pub use marker::{is_free_segment, FREE_SEGMENTS};
pub use segment::{MarkerSegment, ScanTail, Segment, SegmentKind};
pub use store::SegmentStore;

// Test utilities - only compiled for tests or when explicitly enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
