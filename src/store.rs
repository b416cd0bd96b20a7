//! Ordered segment collection for a parsed JPEG

use crate::{
    chunk::MAX_SEGMENT_PAYLOAD,
    error::{Error, Result},
    marker::app_marker,
    segment::{MarkerSegment, ScanTail, Segment},
};

/// The parsed representation of a JPEG
///
/// Holds segments in stream order. SOI is always at index 0 and the scan
/// data, when present, is always last; new APPn segments are placed just
/// before the scan data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    /// Create a store holding only SOI
    pub fn new() -> Self {
        Self {
            segments: vec![Segment::StartOfImage],
        }
    }

    /// Append a parsed marker segment (scanner only; scan data must not be set yet)
    pub(crate) fn push_marker(&mut self, segment: MarkerSegment) {
        debug_assert!(self.scan_tail().is_none());
        self.segments.push(Segment::Marker(segment));
    }

    /// Terminate the store with scan data
    pub(crate) fn set_scan_tail(&mut self, tail: ScanTail) {
        debug_assert!(self.scan_tail().is_none());
        self.segments.push(Segment::ScanData(tail));
    }

    /// All segments, in stream order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: SOI is always present
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Marker segments between SOI and the scan data
    pub fn marker_segments(&self) -> impl Iterator<Item = &MarkerSegment> {
        self.segments.iter().filter_map(Segment::as_marker)
    }

    /// The opaque scan region, if any
    pub fn scan_tail(&self) -> Option<&ScanTail> {
        match self.segments.last() {
            Some(Segment::ScanData(tail)) => Some(tail),
            _ => None,
        }
    }

    /// Index where new header segments go: before the scan data, or at the end
    fn insertion_index(&self) -> usize {
        if self.scan_tail().is_some() {
            self.segments.len() - 1
        } else {
            self.segments.len()
        }
    }

    /// Insert one APPn segment per payload, in order, just before the scan data
    ///
    /// Existing APPn segments are left in place. Nothing is inserted if any
    /// payload fails validation.
    ///
    /// # Errors
    /// - `InvalidSegmentNumber` if `number` is above 15
    /// - `SegmentTooLarge` if a payload exceeds 65533 bytes
    pub fn insert_app_segments<I>(&mut self, number: u8, payloads: I) -> Result<usize>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let marker = app_marker(number)?;
        let new_segments = payloads
            .into_iter()
            .map(|payload| {
                if payload.len() > MAX_SEGMENT_PAYLOAD {
                    return Err(Error::SegmentTooLarge {
                        size: payload.len(),
                        max: MAX_SEGMENT_PAYLOAD,
                    });
                }
                Ok(Segment::Marker(MarkerSegment::new(marker, payload)))
            })
            .collect::<Result<Vec<_>>>()?;

        let count = new_segments.len();
        let at = self.insertion_index();
        self.segments.splice(at..at, new_segments);
        log::debug!("inserted {} APP{} segments at index {}", count, number, at);
        Ok(count)
    }

    /// Payloads of every APPn segment with the given number, in stream order
    pub fn segments_for(&self, number: u8) -> Vec<&[u8]> {
        self.segments
            .iter()
            .filter_map(|segment| segment.app_payload(number))
            .collect()
    }

    /// Remove APPn segments with the given number whose payload matches `predicate`
    ///
    /// Returns how many segments were removed.
    pub fn remove_app_segments<F>(&mut self, number: u8, mut predicate: F) -> usize
    where
        F: FnMut(&[u8]) -> bool,
    {
        let before = self.segments.len();
        self.segments.retain(|segment| match segment.app_payload(number) {
            Some(payload) => !predicate(payload),
            None => true,
        });
        before - self.segments.len()
    }

    /// Size of the serialized stream
    pub fn encoded_size(&self) -> usize {
        self.segments.iter().map(Segment::encoded_size).sum()
    }
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new()
    }
}
