#![no_main]

use libfuzzer_sys::fuzz_target;
use squeeze_io::Image;

fuzz_target!(|data: &[u8]| {
    // Try to parse any input as a JPEG
    // This should NEVER panic, only return errors
    if let Ok(image) = Image::load(data) {
        // Look for chunk sets in every APPn segment
        for segment in 0..=15 {
            if let Ok(sets) = image.payloads(segment) {
                for set in sets {
                    let _ = image.read(segment, set.identifier);
                }
            }
        }

        // Fill bytes are dropped on rebuild, so compare parsed structure
        let output = image.serialize().expect("serialize of parsed image");
        let reparsed = Image::load(&output).expect("reparse of rebuilt image");
        assert_eq!(reparsed.store(), image.store());
    }
});
