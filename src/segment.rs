//! Segment types for a parsed JPEG

use std::fmt;

use crate::marker::{self, app_number, marker_label};

/// A marker segment between SOI and the scan data
///
/// `payload` excludes the `FF xx` marker and the 2-byte length field.
#[derive(Clone, PartialEq, Eq)]
pub struct MarkerSegment {
    marker: u8,
    payload: Vec<u8>,
}

impl MarkerSegment {
    /// Create a segment for `marker` with the given payload
    pub(crate) fn new(marker: u8, payload: Vec<u8>) -> Self {
        Self { marker, payload }
    }

    /// Marker code (the byte after `0xFF`)
    pub fn marker(&self) -> u8 {
        self.marker
    }

    /// Segment payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// APPn number if this is an application segment
    pub fn app_number(&self) -> Option<u8> {
        app_number(self.marker)
    }

    /// Whether the segment is framed with a length field
    pub fn has_length(&self) -> bool {
        marker::has_length(self.marker)
    }

    /// Bytes this segment occupies in the stream, including marker and length
    pub fn encoded_size(&self) -> usize {
        if self.has_length() {
            4 + self.payload.len()
        } else {
            2
        }
    }
}

impl fmt::Debug for MarkerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerSegment")
            .field("marker", &format_args!("0x{:02X} ({})", self.marker, marker_label(self.marker)))
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Opaque bytes from SOS (or a bare EOI) to the end of the stream
///
/// Never interpreted; copied verbatim on reassembly.
#[derive(Clone, PartialEq, Eq)]
pub struct ScanTail(Vec<u8>);

impl ScanTail {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ScanTail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScanTail({} bytes)", self.0.len())
    }
}

/// Logical classification of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Start of image
    Header,
    /// APP0-APP15
    Application,
    /// Any other marker before the scan
    Other,
    /// Scan data through end of stream
    ScanData,
}

impl SegmentKind {
    /// Get a string representation of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Application => "application",
            Self::Other => "other",
            Self::ScanData => "scan_data",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a [`SegmentStore`](crate::SegmentStore)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// SOI marker; always first
    StartOfImage,
    /// A length-framed (or RST/TEM) marker segment
    Marker(MarkerSegment),
    /// Scan data; always last
    ScanData(ScanTail),
}

impl Segment {
    /// Classify this segment
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::StartOfImage => SegmentKind::Header,
            Self::Marker(segment) if segment.app_number().is_some() => SegmentKind::Application,
            Self::Marker(_) => SegmentKind::Other,
            Self::ScanData(_) => SegmentKind::ScanData,
        }
    }

    /// Marker code that introduces this segment
    pub fn marker(&self) -> Option<u8> {
        match self {
            Self::StartOfImage => Some(marker::SOI),
            Self::Marker(segment) => Some(segment.marker()),
            Self::ScanData(tail) => tail.as_bytes().get(1).copied(),
        }
    }

    /// The marker segment, if this is one
    pub fn as_marker(&self) -> Option<&MarkerSegment> {
        match self {
            Self::Marker(segment) => Some(segment),
            _ => None,
        }
    }

    /// Payload of APPn segment `number`, if this is one
    pub fn app_payload(&self, number: u8) -> Option<&[u8]> {
        self.as_marker()
            .filter(|segment| segment.app_number() == Some(number))
            .map(MarkerSegment::payload)
    }

    /// Bytes this segment occupies in the stream
    pub fn encoded_size(&self) -> usize {
        match self {
            Self::StartOfImage => 2,
            Self::Marker(segment) => segment.encoded_size(),
            Self::ScanData(tail) => tail.len(),
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Self::StartOfImage)
    }

    pub fn is_scan_data(&self) -> bool {
        matches!(self, Self::ScanData(_))
    }
}
