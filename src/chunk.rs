//! Chunked payload codec
//!
//! A payload is split into fragments small enough to fit a single APPn
//! segment. Each fragment is prefixed with a 5-byte header:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 3 | identifier |
//! | 3 | 1 | chunk count (1-255) |
//! | 4 | 1 | chunk index (0..count) |
//! | 5 | rest | fragment data |
//!
//! Several payloads may share one APPn number as long as their identifiers
//! differ; decoding ignores segments carrying other identifiers.

use std::fmt;

use crate::error::{Error, Result};

/// Maximum payload of a JPEG marker segment (16-bit length minus the length field)
pub const MAX_SEGMENT_PAYLOAD: usize = 65533;

/// Size of the identifier field
pub const IDENTIFIER_SIZE: usize = 3;

/// Identifier + count + index
pub const CHUNK_HEADER_SIZE: usize = IDENTIFIER_SIZE + 2;

/// Maximum fragment carried by one chunk
pub const CHUNK_CAPACITY: usize = MAX_SEGMENT_PAYLOAD - CHUNK_HEADER_SIZE;

/// Maximum number of chunks in one set (the count field is a single byte)
pub const MAX_CHUNKS: usize = u8::MAX as usize;

/// Largest payload that can be stored under one (segment, identifier) pair
pub const MAX_PAYLOAD_SIZE: usize = MAX_CHUNKS * CHUNK_CAPACITY;

/// Fixed-width tag distinguishing payloads that share an APPn number
///
/// Caller values are truncated to three bytes, or right-padded with `0x00`.
///
/// # Example
///
/// ```
/// use squeeze_io::Identifier;
///
/// assert_eq!(Identifier::from("PSZ").as_bytes(), b"PSZ");
/// assert_eq!(Identifier::from("TOOLONG").as_bytes(), b"TOO");
/// assert_eq!(Identifier::from("A").as_bytes(), b"A\0\0");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; IDENTIFIER_SIZE]);

impl Identifier {
    /// Build an identifier from arbitrary bytes, truncating or padding to 3 bytes
    pub fn new(bytes: &[u8]) -> Self {
        let mut tag = [0u8; IDENTIFIER_SIZE];
        let len = bytes.len().min(IDENTIFIER_SIZE);
        tag[..len].copy_from_slice(&bytes[..len]);
        Self(tag)
    }

    /// The raw 3-byte tag
    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_SIZE] {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<&[u8]> for Identifier {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<[u8; IDENTIFIER_SIZE]> for Identifier {
    fn from(value: [u8; IDENTIFIER_SIZE]) -> Self {
        Self(value)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Padding is not part of what the caller typed
        let end = self
            .0
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        write!(f, "\"{}\"", self.0[..end].escape_ascii())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self)
    }
}

/// One fragment of a payload, as stored in a single APPn segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Tag of the payload this chunk belongs to
    pub identifier: Identifier,
    /// Total chunks in the set
    pub count: u8,
    /// Zero-based position in the set
    pub index: u8,
    /// Fragment bytes
    pub data: &'a [u8],
}

impl<'a> Chunk<'a> {
    /// Parse a segment payload as a chunk
    ///
    /// Returns `None` if the payload is too short to hold a chunk header.
    /// The header fields are not validated here; set-level checks happen in
    /// [`decode`].
    pub fn parse(payload: &'a [u8]) -> Option<Self> {
        if payload.len() < CHUNK_HEADER_SIZE {
            return None;
        }
        Some(Self {
            identifier: Identifier::new(&payload[..IDENTIFIER_SIZE]),
            count: payload[IDENTIFIER_SIZE],
            index: payload[IDENTIFIER_SIZE + 1],
            data: &payload[CHUNK_HEADER_SIZE..],
        })
    }

    /// Serialize as a segment payload: header followed by fragment
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CHUNK_HEADER_SIZE + self.data.len());
        out.extend_from_slice(self.identifier.as_bytes());
        out.push(self.count);
        out.push(self.index);
        out.extend_from_slice(self.data);
        out
    }
}

/// Split `data` into an ordered chunk set
///
/// An empty payload still yields one chunk so that it round-trips.
///
/// # Errors
/// - `PayloadTooLarge` if more than [`MAX_CHUNKS`] chunks would be needed
pub fn encode(identifier: Identifier, data: &[u8]) -> Result<Vec<Chunk<'_>>> {
    let chunks = data.len().div_ceil(CHUNK_CAPACITY).max(1);
    if chunks > MAX_CHUNKS {
        return Err(Error::PayloadTooLarge {
            size: data.len(),
            max: MAX_PAYLOAD_SIZE,
            chunks,
        });
    }
    let count = chunks as u8;

    if data.is_empty() {
        return Ok(vec![Chunk {
            identifier,
            count,
            index: 0,
            data,
        }]);
    }

    Ok(data
        .chunks(CHUNK_CAPACITY)
        .enumerate()
        .map(|(index, fragment)| Chunk {
            identifier,
            count,
            index: index as u8,
            data: fragment,
        })
        .collect())
}

/// Why a set of matched chunks cannot be reassembled
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceFault {
    /// Chunks disagree on the set size
    #[error("chunk {index} declares {found} chunks, expected {expected}")]
    CountMismatch { index: u8, expected: u8, found: u8 },

    /// A chunk declares an empty set
    #[error("chunk declares a count of zero")]
    ZeroCount,

    /// Index outside 0..count
    #[error("chunk index {index} out of range for {count} chunks")]
    IndexOutOfRange { index: u8, count: u8 },

    /// Two chunks claim the same position
    #[error("chunk index {index} appears more than once")]
    DuplicateIndex { index: u8 },

    /// Some positions have no chunk
    #[error("{} of {count} chunks missing (first missing index {})", .missing.len(), .missing[0])]
    MissingIndices { missing: Vec<u8>, count: u8 },
}

/// Failure of [`decode`]
///
/// Carries no APPn number; [`crate::Image`] attaches one when converting to
/// [`Error`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// No candidate carried the requested identifier
    #[error("no chunks found")]
    NotFound,

    /// Candidates were found but do not form a valid set
    #[error(transparent)]
    Corrupt(#[from] SequenceFault),
}

impl DecodeError {
    /// Attach segment context
    pub fn at(self, segment: u8, identifier: Identifier) -> Error {
        match self {
            Self::NotFound => Error::SegmentNotFound {
                segment,
                identifier,
            },
            Self::Corrupt(fault) => Error::CorruptChunkSequence {
                segment,
                identifier,
                fault,
            },
        }
    }
}

/// Reassemble the payload tagged `identifier` from candidate segment payloads
///
/// Candidates with a different identifier, or too short to hold a header,
/// are ignored. The order of candidates does not matter.
pub fn decode<'a, I>(identifier: Identifier, candidates: I) -> std::result::Result<Vec<u8>, DecodeError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let matched: Vec<Chunk<'a>> = candidates
        .into_iter()
        .filter_map(Chunk::parse)
        .filter(|chunk| chunk.identifier == identifier)
        .collect();

    if matched.is_empty() {
        return Err(DecodeError::NotFound);
    }

    let ordered = order_chunks(&matched)?;
    let total: usize = ordered.iter().map(|chunk| chunk.data.len()).sum();
    let mut payload = Vec::with_capacity(total);
    for chunk in ordered {
        payload.extend_from_slice(chunk.data);
    }

    log::debug!(
        "decoded {} bytes from {} chunks tagged {}",
        payload.len(),
        matched.len(),
        identifier
    );
    Ok(payload)
}

/// Validate a matched set and return it sorted by index
fn order_chunks<'c, 'a>(
    matched: &'c [Chunk<'a>],
) -> std::result::Result<Vec<&'c Chunk<'a>>, SequenceFault> {
    let expected = matched[0].count;
    if expected == 0 {
        return Err(SequenceFault::ZeroCount);
    }

    let mut slots: Vec<Option<&Chunk<'a>>> = vec![None; expected as usize];
    for chunk in matched {
        if chunk.count != expected {
            return Err(SequenceFault::CountMismatch {
                index: chunk.index,
                expected,
                found: chunk.count,
            });
        }
        let slot = slots
            .get_mut(chunk.index as usize)
            .ok_or(SequenceFault::IndexOutOfRange {
                index: chunk.index,
                count: expected,
            })?;
        if slot.is_some() {
            return Err(SequenceFault::DuplicateIndex { index: chunk.index });
        }
        *slot = Some(chunk);
    }

    let missing: Vec<u8> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(index, _)| index as u8)
        .collect();
    if !missing.is_empty() {
        return Err(SequenceFault::MissingIndices {
            missing,
            count: expected,
        });
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Summary of the chunks found under one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSet {
    /// Identifier shared by the chunks
    pub identifier: Identifier,
    /// Count declared by the first chunk seen
    pub declared: u8,
    /// Number of chunks present
    pub present: usize,
    /// Sum of fragment sizes
    pub size: usize,
    /// Set problem, if it could not be decoded
    pub fault: Option<SequenceFault>,
}

impl ChunkSet {
    /// Whether [`decode`] would succeed for this identifier
    pub fn is_complete(&self) -> bool {
        self.fault.is_none()
    }
}

/// Group candidate payloads by identifier, in order of first appearance
pub fn summarize<'a, I>(candidates: I) -> Vec<ChunkSet>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut groups: Vec<(Identifier, Vec<Chunk<'a>>)> = Vec::new();
    for chunk in candidates.into_iter().filter_map(Chunk::parse) {
        match groups.iter_mut().find(|(id, _)| *id == chunk.identifier) {
            Some((_, chunks)) => chunks.push(chunk),
            None => groups.push((chunk.identifier, vec![chunk])),
        }
    }

    groups
        .into_iter()
        .map(|(identifier, chunks)| ChunkSet {
            identifier,
            declared: chunks[0].count,
            present: chunks.len(),
            size: chunks.iter().map(|chunk| chunk.data.len()).sum(),
            fault: order_chunks(&chunks).err(),
        })
        .collect()
}
