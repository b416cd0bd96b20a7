// Integration tests using the test_utils module
#![cfg(feature = "test-utils")]

use squeeze_io::{
    test_utils::*, Error, Identifier, Image, SegmentKind, SequenceFault, CHUNK_CAPACITY,
    MAX_PAYLOAD_SIZE,
};

fn reload(image: &Image) -> Image {
    let bytes = image.serialize().expect("Failed to serialize");
    Image::load(&bytes).expect("Failed to reload")
}

#[test]
fn test_small_payload_scenario() {
    let mut image = Image::load(&minimal_jpeg()).expect("Failed to parse JPEG");
    image.write(4, "PSZ", b"0123456789").unwrap();

    let reloaded = reload(&image);
    assert_eq!(reloaded.read(4, "PSZ").unwrap(), b"0123456789");
}

#[test]
fn test_multi_chunk_scenario() {
    let data = vec![0u8; 70000];
    let mut image = Image::load(&minimal_jpeg()).unwrap();
    assert_eq!(image.write(5, "ABC", &data).unwrap(), 2);

    let reloaded = reload(&image);
    let fragments = reloaded.store().segments_for(5);
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].len() - 5, 65528);
    assert_eq!(fragments[1].len() - 5, 4472);
    assert_eq!(reloaded.read(5, "ABC").unwrap(), data);
}

#[test]
fn test_empty_payload_round_trip() {
    let mut image = Image::load(&minimal_jpeg()).unwrap();
    assert_eq!(image.write(9, "NIL", b"").unwrap(), 1);
    let reloaded = reload(&image);
    assert_eq!(reloaded.store().segments_for(9), vec![&b"NIL\x01\x00"[..]]);
    assert!(reloaded.read(9, "NIL").unwrap().is_empty());
}

#[test]
fn test_chunk_boundaries() {
    for (len, chunks) in [(CHUNK_CAPACITY, 1), (CHUNK_CAPACITY + 1, 2)] {
        let data = patterned_payload(len);
        let mut image = Image::load(&minimal_jpeg()).unwrap();
        assert_eq!(image.write(6, "BND", &data).unwrap(), chunks);
        assert_eq!(reload(&image).read(6, "BND").unwrap(), data);
    }
}

#[test]
fn test_maximum_payload_round_trip() {
    let data = patterned_payload(MAX_PAYLOAD_SIZE);
    let mut image = Image::load(&minimal_jpeg()).unwrap();
    assert_eq!(image.write(15, "MAX", &data).unwrap(), 255);
    assert_eq!(reload(&image).read(15, "MAX").unwrap(), data);
}

#[test]
fn test_oversized_payload_leaves_image_unchanged() {
    let data = vec![0u8; MAX_PAYLOAD_SIZE + 1];
    let mut image = Image::load(&minimal_jpeg()).unwrap();
    let before = image.serialize().unwrap();

    match image.write(4, "BIG", &data) {
        Err(Error::PayloadTooLarge { size, .. }) => assert_eq!(size, MAX_PAYLOAD_SIZE + 1),
        other => panic!("expected PayloadTooLarge, got {:?}", other),
    }
    assert_eq!(image.serialize().unwrap(), before);
}

#[test]
fn test_identifiers_are_isolated() {
    let d1 = patterned_payload(100_000);
    let d2 = b"second payload".to_vec();

    let mut image = Image::load(&minimal_jpeg()).unwrap();
    image.write(7, "AAA", &d1).unwrap();
    image.write(7, "BBB", &d2).unwrap();

    let reloaded = reload(&image);
    assert_eq!(reloaded.read(7, "AAA").unwrap(), d1);
    assert_eq!(reloaded.read(7, "BBB").unwrap(), d2);
}

#[test]
fn test_segment_numbers_are_isolated() {
    let mut image = Image::load(&minimal_jpeg()).unwrap();
    image.write(4, "TAG", b"four").unwrap();
    image.write(10, "TAG", b"ten").unwrap();

    let reloaded = reload(&image);
    assert_eq!(reloaded.read(4, "TAG").unwrap(), b"four");
    assert_eq!(reloaded.read(10, "TAG").unwrap(), b"ten");
    assert!(matches!(
        reloaded.read(5, "TAG"),
        Err(Error::SegmentNotFound { segment: 5, .. })
    ));
}

#[test]
fn test_read_missing_payload() {
    let image = Image::load(&minimal_jpeg()).unwrap();
    match image.read(4, "PSZ") {
        Err(Error::SegmentNotFound {
            segment,
            identifier,
        }) => {
            assert_eq!(segment, 4);
            assert_eq!(identifier, Identifier::from("PSZ"));
        }
        other => panic!("expected SegmentNotFound, got {:?}", other),
    }
}

#[test]
fn test_foreign_app_segments_are_ignored() {
    // An unrelated APP4 segment shorter than a chunk header, and one with another tag
    let data = JpegBuilder::new()
        .app(4, b"xy".to_vec())
        .app(4, b"EXT\x01\x00other".to_vec())
        .build();
    let mut image = Image::load(&data).unwrap();
    image.write(4, "PSZ", b"mine").unwrap();

    let reloaded = reload(&image);
    assert_eq!(reloaded.read(4, "PSZ").unwrap(), b"mine");
    assert_eq!(reloaded.read(4, "EXT").unwrap(), b"other");
    assert_eq!(reloaded.store().segments_for(4).len(), 3);
}

#[test]
fn test_deleted_chunk_is_corrupt() {
    let mut image = Image::load(&minimal_jpeg()).unwrap();
    image.write(5, "ABC", &vec![1u8; CHUNK_CAPACITY * 3]).unwrap();

    // Rebuild the stream without the middle chunk
    let fragments: Vec<Vec<u8>> = image
        .store()
        .segments_for(5)
        .iter()
        .map(|payload| payload.to_vec())
        .collect();
    let broken = JpegBuilder::new()
        .app(5, fragments[0].clone())
        .app(5, fragments[2].clone())
        .build();

    match Image::load(&broken).unwrap().read(5, "ABC") {
        Err(Error::CorruptChunkSequence { fault, .. }) => assert_eq!(
            fault,
            SequenceFault::MissingIndices {
                missing: vec![1],
                count: 3
            }
        ),
        other => panic!("expected CorruptChunkSequence, got {:?}", other),
    }
}

#[test]
fn test_duplicated_chunk_is_corrupt() {
    let payload = b"ABC\x02\x01tail".to_vec();
    let data = JpegBuilder::new()
        .app(5, b"ABC\x02\x00head".to_vec())
        .app(5, payload.clone())
        .app(5, payload)
        .build();
    let image = Image::load(&data).unwrap();
    assert!(matches!(
        image.read(5, "ABC"),
        Err(Error::CorruptChunkSequence {
            fault: SequenceFault::DuplicateIndex { index: 1 },
            ..
        })
    ));
}

#[test]
fn test_chunks_read_regardless_of_stream_order() {
    let data = JpegBuilder::new()
        .app(8, b"ORD\x03\x02!".to_vec())
        .comment(b"in between")
        .app(8, b"ORD\x03\x00hello".to_vec())
        .app(8, b"ORD\x03\x01 world".to_vec())
        .build();
    let image = Image::load(&data).unwrap();
    assert_eq!(image.read(8, "ORD").unwrap(), b"hello world!");
}

#[test]
fn test_not_a_jpeg() {
    assert!(matches!(
        Image::load(b"GIF89a..."),
        Err(Error::InvalidContainer { .. })
    ));
}

#[test]
fn test_unmodified_round_trip_is_byte_exact() {
    let data = JpegBuilder::new()
        .app(1, b"Exif\0\0fake".to_vec())
        .comment(b"hello")
        .trailer(b"extra")
        .build();
    let image = Image::load(&data).unwrap();
    assert_eq!(image.serialize().unwrap(), data);
}

#[test]
fn test_new_segments_precede_scan_data() {
    let original = minimal_jpeg();
    let mut image = Image::load(&original).unwrap();
    image.write(11, "POS", b"x").unwrap();

    let kinds: Vec<SegmentKind> = image.store().segments().iter().map(|s| s.kind()).collect();
    assert_eq!(kinds.first(), Some(&SegmentKind::Header));
    assert_eq!(kinds.last(), Some(&SegmentKind::ScanData));
    assert_eq!(kinds[kinds.len() - 2], SegmentKind::Application);

    // Everything from SOS onwards is untouched
    let bytes = image.serialize().unwrap();
    let sos = scan_offset(&original).unwrap();
    assert!(bytes.ends_with(&original[sos..]));
    assert!(bytes.starts_with(&original[..sos]));
}

#[test]
fn test_save_and_open() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.jpg");
    let output = dir.path().join("output.jpg");
    std::fs::write(&input, minimal_jpeg()).unwrap();

    let mut image = Image::open(&input).expect("Failed to open input");
    image.write(4, "PSZ", b"0123456789").unwrap();
    image.save(&output).expect("Failed to save output");

    let verify = Image::open(&output).expect("Failed to open output");
    assert_eq!(verify.read(4, "PSZ").unwrap(), b"0123456789");

    let from_reader = Image::from_reader(std::fs::File::open(&output).unwrap()).unwrap();
    assert_eq!(from_reader.store(), verify.store());
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Image::open(dir.path().join("missing.jpg")),
        Err(Error::Io(_))
    ));
}

#[test]
#[cfg(feature = "memory-mapped")]
fn test_open_mmap_matches_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mapped.jpg");
    let mut image = Image::load(&minimal_jpeg()).unwrap();
    image.write(6, "MAP", b"mapped").unwrap();
    image.save(&path).unwrap();

    let mapped = Image::open_mmap(&path).expect("Failed to map");
    assert_eq!(mapped.read(6, "MAP").unwrap(), b"mapped");
    assert_eq!(mapped.store(), Image::open(&path).unwrap().store());
}
