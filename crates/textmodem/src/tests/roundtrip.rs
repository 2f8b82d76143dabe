use alloc::{string::String, vec::Vec};

use quickcheck_macros::quickcheck;

use crate::{
    Text, decode_latin1, decode_utf8, decode_utf8_lenient, decode_utf16be, decode_utf16le,
    decode_utf32be, decode_utf32le, encode_utf8, encode_utf16be, encode_utf16le, encode_utf32be,
    encode_utf32le, validate_utf8_chunk,
};

#[quickcheck]
fn text_survives_the_utf8_round_trip(s: String) -> bool {
    let text = Text::from(s.as_str());
    decode_utf8(&encode_utf8(&text)).unwrap() == text
}

#[quickcheck]
fn well_formed_bytes_survive_the_utf8_round_trip(s: String) -> bool {
    let bytes = s.into_bytes();
    encode_utf8(&decode_utf8(&bytes).unwrap()) == bytes
}

#[quickcheck]
fn strict_decoding_agrees_with_core(data: Vec<u8>) -> bool {
    match (decode_utf8(&data), core::str::from_utf8(&data)) {
        (Ok(ours), Ok(theirs)) => ours == theirs,
        (Err(_), Err(_)) => true,
        _ => false,
    }
}

#[quickcheck]
fn lenient_decoding_is_total_and_preserves_valid_input(s: String) -> bool {
    decode_utf8_lenient(s.as_bytes()) == s
}

#[quickcheck]
fn the_valid_prefix_is_well_formed_and_maximal(data: Vec<u8>) -> bool {
    let (n, _) = validate_utf8_chunk(&data);
    if core::str::from_utf8(&data[..n]).is_err() {
        return false;
    }
    // Maximality: no longer prefix may be well-formed.
    (n + 1..=data.len()).all(|m| core::str::from_utf8(&data[..m]).is_err())
}

#[quickcheck]
fn latin1_is_total_and_scalar_identical(data: Vec<u8>) -> bool {
    let text = decode_latin1(&data);
    text.chars().map(u32::from).eq(data.iter().map(|&b| u32::from(b)))
}

#[quickcheck]
fn utf16_round_trips_both_endiannesses(s: String) -> bool {
    let text = Text::from(s.as_str());
    decode_utf16le(&encode_utf16le(&text)).unwrap() == text
        && decode_utf16be(&encode_utf16be(&text)).unwrap() == text
}

#[quickcheck]
fn utf32_round_trips_both_endiannesses(s: String) -> bool {
    let text = Text::from(s.as_str());
    decode_utf32le(&encode_utf32le(&text)).unwrap() == text
        && decode_utf32be(&encode_utf32be(&text)).unwrap() == text
}
