//! Single-pass JPEG marker scanner
//!
//! Splits a JPEG byte stream into its header marker segments and the opaque
//! scan region. Entropy-coded data is never examined: parsing stops at the
//! first SOS (or a bare EOI) and the rest of the stream is kept verbatim.

use crate::{
    error::{Error, Result},
    marker::{has_length, marker_label, EOI, MARKER_PREFIX, SOI, SOS},
    segment::{MarkerSegment, ScanTail},
    store::SegmentStore,
};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Cursor, Seek, SeekFrom};

/// Parse `bytes` into a [`SegmentStore`]
///
/// # Errors
/// - `InvalidContainer` if the stream does not start with SOI
/// - `MalformedSegment` for a missing `0xFF` prefix, a length field below 2
///   or a second SOI
/// - `TruncatedStream` if a declared length overruns the input or the input
///   ends before SOS/EOI
pub fn scan(bytes: &[u8]) -> Result<SegmentStore> {
    // Check SOI marker
    if bytes.len() < 2 || bytes[0] != MARKER_PREFIX || bytes[1] != SOI {
        return Err(Error::InvalidContainer {
            found: bytes[..bytes.len().min(2)].to_vec(),
        });
    }

    let mut store = SegmentStore::new();
    let mut source = Cursor::new(bytes);
    source.set_position(2);

    loop {
        let offset = source.position();

        // Read marker
        let marker_prefix = read_u8(&mut source)?;
        if marker_prefix != MARKER_PREFIX {
            return Err(Error::MalformedSegment {
                offset,
                reason: format!("Expected 0xFF, got 0x{:02X}", marker_prefix),
            });
        }

        // Handle padding bytes
        let mut marker = read_u8(&mut source)?;
        while marker == MARKER_PREFIX {
            marker = read_u8(&mut source)?;
        }

        match marker {
            SOS | EOI => {
                // Everything from here on is copied as-is
                let tail = &bytes[offset as usize..];
                if !tail.ends_with(&[MARKER_PREFIX, EOI]) {
                    log::warn!(
                        "scan data starting at offset {} does not end with EOI",
                        offset
                    );
                }
                log::trace!(
                    "{} at offset {}: {} bytes of scan data",
                    marker_label(marker),
                    offset,
                    tail.len()
                );
                store.set_scan_tail(ScanTail::new(tail.to_vec()));
                break;
            }

            SOI => {
                return Err(Error::MalformedSegment {
                    offset,
                    reason: "Unexpected second SOI marker".into(),
                });
            }

            0x00 => {
                return Err(Error::MalformedSegment {
                    offset,
                    reason: "Stuffed byte outside of scan data".into(),
                });
            }

            // RST/TEM markers have no length
            _ if !has_length(marker) => {
                log::trace!("{} at offset {}", marker_label(marker), offset);
                store.push_marker(MarkerSegment::new(marker, Vec::new()));
            }

            _ => {
                // Standard marker with length
                let length_offset = source.position();
                let size = source
                    .read_u16::<BigEndian>()
                    .map_err(|_| truncated(&source, 2))? as u64;
                if size < 2 {
                    return Err(Error::MalformedSegment {
                        offset: length_offset,
                        reason: format!(
                            "{} length field is {}, must be at least 2",
                            marker_label(marker),
                            size
                        ),
                    });
                }

                let data_size = size - 2;
                let data_start = source.position();
                let available = bytes.len() as u64 - data_start;
                if data_size > available {
                    return Err(Error::TruncatedStream {
                        offset: data_start,
                        needed: data_size,
                        available,
                    });
                }

                let payload = bytes[data_start as usize..(data_start + data_size) as usize].to_vec();
                log::trace!(
                    "{} at offset {}: {} byte payload",
                    marker_label(marker),
                    offset,
                    data_size
                );
                store.push_marker(MarkerSegment::new(marker, payload));
                source.seek(SeekFrom::Current(data_size as i64))?;
            }
        }
    }

    log::debug!("scanned {} segments", store.len());
    Ok(store)
}

fn read_u8(source: &mut Cursor<&[u8]>) -> Result<u8> {
    source.read_u8().map_err(|_| truncated(source, 1))
}

/// The stream ended while `needed` more bytes were expected
fn truncated(source: &Cursor<&[u8]>, needed: u64) -> Error {
    let len = source.get_ref().len() as u64;
    let offset = source.position().min(len);
    Error::TruncatedStream {
        offset,
        needed,
        available: len - offset,
    }
}
