//! Test utilities for building synthetic JPEG streams.
//!
//! The generated images are real 1x1 grayscale baseline JPEGs: a decoder
//! renders them as a single mid-gray pixel. Extra marker segments can be
//! placed in the header to exercise parsing.
//!
//! # Usage
//!
//! ```
//! use squeeze_io::test_utils::*;
//!
//! let plain = minimal_jpeg();
//! assert_eq!(&plain[..2], &[0xFF, 0xD8]);
//!
//! let tagged = JpegBuilder::new()
//!     .app(4, b"PSZ\x01\x00hidden".to_vec())
//!     .comment(b"generated")
//!     .build();
//! assert!(tagged.len() > plain.len());
//! ```

use crate::marker::{APP0, EOI, MARKER_PREFIX, SOI, SOS};

const DQT: u8 = 0xDB;
const SOF0: u8 = 0xC0;
const DHT: u8 = 0xC4;
const COM: u8 = 0xFE;

/// JFIF 1.1, no density units, 1:1 aspect, no thumbnail
const JFIF_PAYLOAD: &[u8] = &[b'J', b'F', b'I', b'F', 0, 1, 1, 0, 0, 1, 0, 1, 0, 0];

/// 8-bit precision, 1x1 pixels, one component (id 1, 1x1 sampling, table 0)
const SOF0_PAYLOAD: &[u8] = &[8, 0, 1, 0, 1, 1, 1, 0x11, 0];

/// One component using DC/AC table 0, full spectral range
const SOS_PAYLOAD: &[u8] = &[1, 1, 0x00, 0, 63, 0];

/// DC difference category 0 ("0"), then EOB ("0"), padded with 1 bits
const ENTROPY_DATA: &[u8] = &[0x3F];

/// Huffman table with a single 1-bit code for symbol 0
fn single_code_table(class_and_id: u8) -> Vec<u8> {
    let mut table = vec![class_and_id, 1];
    table.extend_from_slice(&[0u8; 15]);
    table.push(0x00);
    table
}

/// Quantization table 0, all ones
fn flat_quant_table() -> Vec<u8> {
    let mut table = vec![0x00];
    table.extend_from_slice(&[1u8; 64]);
    table
}

fn push_segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
    out.extend_from_slice(&[MARKER_PREFIX, marker]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
}

/// Builder for synthetic JPEGs with extra header segments
///
/// Extra segments are placed after APP0 and before the frame tables, in the
/// order they were added.
#[derive(Debug, Clone, Default)]
pub struct JpegBuilder {
    extra: Vec<(u8, Vec<u8>)>,
    trailer: Vec<u8>,
}

impl JpegBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an APPn segment
    pub fn app(mut self, number: u8, payload: Vec<u8>) -> Self {
        assert!(number <= 15, "APPn number out of range");
        self.extra.push((APP0 + number, payload));
        self
    }

    /// Add a COM segment
    pub fn comment(mut self, text: &[u8]) -> Self {
        self.extra.push((COM, text.to_vec()));
        self
    }

    /// Add an arbitrary length-framed segment
    pub fn segment(mut self, marker: u8, payload: Vec<u8>) -> Self {
        self.extra.push((marker, payload));
        self
    }

    /// Append bytes after EOI
    pub fn trailer(mut self, bytes: &[u8]) -> Self {
        self.trailer.extend_from_slice(bytes);
        self
    }

    /// Produce the JPEG byte stream
    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![MARKER_PREFIX, SOI];
        push_segment(&mut out, APP0, JFIF_PAYLOAD);
        for (marker, payload) in &self.extra {
            push_segment(&mut out, *marker, payload);
        }
        push_segment(&mut out, DQT, &flat_quant_table());
        push_segment(&mut out, SOF0, SOF0_PAYLOAD);
        push_segment(&mut out, DHT, &single_code_table(0x00));
        push_segment(&mut out, DHT, &single_code_table(0x10));
        push_segment(&mut out, SOS, SOS_PAYLOAD);
        out.extend_from_slice(ENTROPY_DATA);
        out.extend_from_slice(&[MARKER_PREFIX, EOI]);
        out.extend_from_slice(&self.trailer);
        out
    }
}

/// A 1x1 grayscale JPEG with JFIF header and no other metadata
pub fn minimal_jpeg() -> Vec<u8> {
    JpegBuilder::new().build()
}

/// Deterministic non-repeating-looking bytes for payload tests
pub fn patterned_payload(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8)
        .collect()
}

/// Offset of the SOS marker in a JPEG produced by this module
pub fn scan_offset(jpeg: &[u8]) -> Option<usize> {
    jpeg.windows(2)
        .position(|pair| *pair == [MARKER_PREFIX, SOS])
}
