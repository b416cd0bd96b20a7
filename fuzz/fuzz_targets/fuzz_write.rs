#![no_main]

use libfuzzer_sys::fuzz_target;
use squeeze_io::{test_utils::minimal_jpeg, Image, MAX_PAYLOAD_SIZE};

fuzz_target!(|data: &[u8]| {
    // Embed arbitrary bytes and make sure they come back unchanged
    let Some((&segment, payload)) = data.split_first() else {
        return;
    };
    let segment = segment % 16;

    let mut image = Image::load(&minimal_jpeg()).expect("minimal JPEG parses");
    match image.write(segment, "FZZ", payload) {
        Ok(_) => {
            let output = image.serialize().expect("serialize after write");
            let reloaded = Image::load(&output).expect("reparse after write");
            assert_eq!(reloaded.read(segment, "FZZ").expect("read back"), payload);
        }
        Err(_) => assert!(payload.len() > MAX_PAYLOAD_SIZE),
    }
});
