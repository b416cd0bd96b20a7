//! JPEG marker codes and APPn helpers

use crate::error::{Error, Result};

/// Every marker is introduced by this byte
pub const MARKER_PREFIX: u8 = 0xFF;

// JPEG markers
pub const SOI: u8 = 0xD8; // Start of Image
pub const EOI: u8 = 0xD9; // End of Image
pub const SOS: u8 = 0xDA; // Start of Scan (image data follows)
pub const TEM: u8 = 0x01; // Temporary (arithmetic coding)
pub const APP0: u8 = 0xE0;
pub const APP15: u8 = 0xEF;

// Special markers without length
const RST0: u8 = 0xD0;
const RST7: u8 = 0xD7;

/// Highest APPn number
pub const MAX_APP_NUMBER: u8 = APP15 - APP0;

/// APPn numbers with no widely registered meaning
///
/// APP0-APP2 carry JFIF, EXIF/XMP and ICC/MPF; the rest of the excluded
/// numbers are claimed by common camera and editing software.
pub const FREE_SEGMENTS: [u8; 9] = [4, 5, 6, 7, 8, 9, 10, 11, 15];

/// Whether `number` is in [`FREE_SEGMENTS`]
pub fn is_free_segment(number: u8) -> bool {
    FREE_SEGMENTS.contains(&number)
}

/// Marker byte for APPn
///
/// # Errors
/// - `InvalidSegmentNumber` if `number` is above 15
pub fn app_marker(number: u8) -> Result<u8> {
    if number > MAX_APP_NUMBER {
        return Err(Error::InvalidSegmentNumber(number));
    }
    Ok(APP0 + number)
}

/// APPn number for a marker byte, if it is an APPn marker
pub fn app_number(marker: u8) -> Option<u8> {
    (APP0..=APP15).contains(&marker).then(|| marker - APP0)
}

/// Whether a length field follows this marker
pub fn has_length(marker: u8) -> bool {
    !matches!(marker, SOI | EOI | TEM | RST0..=RST7)
}

/// Get human-readable label for a JPEG marker
pub fn marker_label(marker: u8) -> &'static str {
    match marker {
        0xD8 => "SOI",
        0xD9 => "EOI",
        0xDA => "SOS",
        0xDB => "DQT",
        0xC0 => "SOF0",
        0xC1 => "SOF1",
        0xC2 => "SOF2",
        0xC4 => "DHT",
        0xDD => "DRI",
        0xFE => "COM",
        0x01 => "TEM",
        0xD0..=0xD7 => "RST",
        0xE0 => "APP0",
        0xE1 => "APP1",
        0xE2 => "APP2",
        0xE3 => "APP3",
        0xE4 => "APP4",
        0xE5 => "APP5",
        0xE6 => "APP6",
        0xE7 => "APP7",
        0xE8 => "APP8",
        0xE9 => "APP9",
        0xEA => "APP10",
        0xEB => "APP11",
        0xEC => "APP12",
        0xED => "APP13",
        0xEE => "APP14",
        0xEF => "APP15",
        _ => "OTHER",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_marker_range() {
        assert_eq!(app_marker(0).unwrap(), 0xE0);
        assert_eq!(app_marker(15).unwrap(), 0xEF);
        assert!(matches!(app_marker(16), Err(Error::InvalidSegmentNumber(16))));
    }

    #[test]
    fn test_app_number() {
        assert_eq!(app_number(0xE4), Some(4));
        assert_eq!(app_number(0xDB), None);
        assert_eq!(app_number(0xF0), None);
    }

    #[test]
    fn test_has_length() {
        assert!(!has_length(SOI));
        assert!(!has_length(EOI));
        assert!(!has_length(0xD3));
        assert!(has_length(SOS));
        assert!(has_length(0xE5));
    }

    #[test]
    fn test_free_segments() {
        assert!(is_free_segment(4));
        assert!(is_free_segment(15));
        assert!(!is_free_segment(1));
        assert!(!is_free_segment(12));
    }
}
