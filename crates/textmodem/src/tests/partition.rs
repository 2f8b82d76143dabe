use alloc::{string::String, vec::Vec};

use quickcheck::QuickCheck;

use crate::{
    Disposition, StreamDecoder, decode_utf8, decode_utf8_with,
    tests::chunk_utils::split_at_seeds,
};

fn property_test_count() -> u64 {
    if cfg!(any(miri, feature = "test-fast")) {
        10
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

/// Property: feeding a byte stream to the streaming decoder in arbitrarily
/// split chunks yields the same text *and* the same ordered policy
/// invocations as decoding the concatenation in one call.
#[test]
fn partition_is_unobservable_quickcheck() {
    fn prop(data: Vec<u8>, seeds: Vec<usize>) -> bool {
        let mut whole_calls = Vec::new();
        let whole = {
            let mut record = |reason: &'static str, byte: Option<u8>| {
                whole_calls.push((reason, byte));
                Disposition::Replace(0xFFFD)
            };
            decode_utf8_with(&mut record, &data).unwrap()
        };

        let mut stream_calls = Vec::new();
        let streamed = {
            let mut record = |reason: &'static str, byte: Option<u8>| {
                stream_calls.push((reason, byte));
                Disposition::Replace(0xFFFD)
            };
            let mut decoder = StreamDecoder::with_policy(&mut record);
            let mut out = String::new();
            for chunk in split_at_seeds(&data, &seeds) {
                out.push_str(&decoder.feed(chunk).unwrap());
            }
            out.push_str(&decoder.finish().unwrap());
            out
        };

        whole == streamed && whole_calls == stream_calls
    }

    QuickCheck::new()
        .tests(property_test_count())
        .quickcheck(prop as fn(Vec<u8>, Vec<usize>) -> bool);
}

/// Property: a skipping policy is chunk-independent too; replacements are
/// not load-bearing for the carry logic.
#[test]
fn partition_with_skipping_policy_quickcheck() {
    fn prop(data: Vec<u8>, seeds: Vec<usize>) -> bool {
        let mut skip = |_: &'static str, _: Option<u8>| Disposition::Skip;
        let whole = decode_utf8_with(&mut skip, &data).unwrap();

        let mut decoder = StreamDecoder::with_policy(&mut skip);
        let mut out = String::new();
        for chunk in split_at_seeds(&data, &seeds) {
            out.push_str(&decoder.feed(chunk).unwrap());
        }
        out.push_str(&decoder.finish().unwrap());
        whole == out
    }

    QuickCheck::new()
        .tests(property_test_count())
        .quickcheck(prop as fn(Vec<u8>, Vec<usize>) -> bool);
}

/// Property: strict streaming agrees with strict one-shot decoding about
/// success, and about the text on success.
#[test]
fn partition_strict_agreement_quickcheck() {
    fn prop(data: Vec<u8>, seeds: Vec<usize>) -> bool {
        let whole = decode_utf8(&data);

        let mut decoder = StreamDecoder::strict();
        let mut out = String::new();
        let mut failed = false;
        for chunk in split_at_seeds(&data, &seeds) {
            match decoder.feed(chunk) {
                Ok(text) => out.push_str(&text),
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }
        if !failed {
            match decoder.finish() {
                Ok(text) => out.push_str(&text),
                Err(_) => failed = true,
            }
        }

        match whole {
            Ok(text) => !failed && text == out,
            Err(_) => failed,
        }
    }

    QuickCheck::new()
        .tests(property_test_count())
        .quickcheck(prop as fn(Vec<u8>, Vec<usize>) -> bool);
}
