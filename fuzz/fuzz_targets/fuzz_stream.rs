#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use textmodem::{StreamDecoder, decode_utf8_lenient};

#[derive(Arbitrary, Debug)]
struct Plan {
    data: Vec<u8>,
    seeds: Vec<usize>,
}

// Chunk boundaries chosen by the fuzzer must be unobservable.
fuzz_target!(|plan: Plan| {
    let whole = decode_utf8_lenient(&plan.data);

    let mut decoder = StreamDecoder::lenient();
    let mut out = String::new();
    let mut rest = plan.data.as_slice();
    for &seed in &plan.seeds {
        if rest.is_empty() {
            break;
        }
        let cut = seed % (rest.len() + 1);
        let (chunk, tail) = rest.split_at(cut);
        out.push_str(&decoder.feed(chunk).unwrap());
        rest = tail;
    }
    out.push_str(&decoder.feed(rest).unwrap());
    out.push_str(&decoder.finish().unwrap());

    assert_eq!(whole.as_str(), out);
});
