//! Fuzz target: `bmp::decode`
//!
//! Image files come from user-managed catalogue folders.  Arbitrary bytes
//! must be rejected with an error, never a panic, and a decoded bitmap
//! must have a byte buffer matching its dimensions.
//!
//! cargo fuzz run fuzz_bmp_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use placecard::render::bmp;

fuzz_target!(|data: &[u8]| {
    if let Ok(image) = bmp::decode(data) {
        let (w, h) = image.dimensions();
        assert_eq!(image.as_bytes().len(), w.div_ceil(8) as usize * h as usize);
    }
});
