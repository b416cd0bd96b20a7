//! Serialize a [`SegmentStore`] back into a JPEG byte stream

use crate::{
    chunk::MAX_SEGMENT_PAYLOAD,
    error::{Error, Result},
    marker::{MARKER_PREFIX, SOI},
    segment::{MarkerSegment, Segment},
    store::SegmentStore,
};
use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;

/// Write the store to `writer`, returning the number of bytes written
///
/// Output is SOI, each marker segment re-framed with its length field, then
/// the scan data verbatim. Scanning the output yields an equal store.
pub fn write_store<W: Write>(store: &SegmentStore, writer: &mut W) -> Result<u64> {
    let mut written = 0u64;

    for segment in store.segments() {
        match segment {
            Segment::StartOfImage => {
                writer.write_u8(MARKER_PREFIX)?;
                writer.write_u8(SOI)?;
            }
            Segment::Marker(marker_segment) => write_marker_segment(writer, marker_segment)?,
            Segment::ScanData(tail) => writer.write_all(tail.as_bytes())?,
        }
        written += segment.encoded_size() as u64;
    }

    writer.flush()?;
    Ok(written)
}

/// Serialize the store into a new buffer
pub fn serialize(store: &SegmentStore) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(store.encoded_size());
    write_store(store, &mut output)?;
    Ok(output)
}

/// Write one marker segment with its `FF xx` marker and length field
fn write_marker_segment<W: Write>(writer: &mut W, segment: &MarkerSegment) -> Result<()> {
    writer.write_u8(MARKER_PREFIX)?;
    writer.write_u8(segment.marker())?;

    if !segment.has_length() {
        return Ok(());
    }

    let payload = segment.payload();
    if payload.len() > MAX_SEGMENT_PAYLOAD {
        return Err(Error::SegmentTooLarge {
            size: payload.len(),
            max: MAX_SEGMENT_PAYLOAD,
        });
    }

    writer.write_u16::<BigEndian>((payload.len() + 2) as u16)?;
    writer.write_all(payload)?;
    Ok(())
}
