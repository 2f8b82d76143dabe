#![no_main]
use libfuzzer_sys::fuzz_target;
use textmodem::{decode_utf8, decode_utf8_lenient, encode_utf8};

// Strict decoding must agree with the standard library byte-for-byte, and
// lenient decoding must be total.
fuzz_target!(|data: &[u8]| {
    match (decode_utf8(data), core::str::from_utf8(data)) {
        (Ok(ours), Ok(theirs)) => {
            assert_eq!(ours.as_str(), theirs);
            assert_eq!(encode_utf8(&ours), data);
        }
        (Err(_), Err(_)) => {}
        (ours, theirs) => panic!("verdicts disagree: {ours:?} vs {theirs:?}"),
    }

    let lossy = decode_utf8_lenient(data);
    assert!(lossy.len() <= data.len() * 3);
});
