#![no_main]

//! Fuzz target for diamondCut calldata decoding.
//!
//! Arbitrary bytes must decode or fail with a typed error; anything that
//! decodes re-encodes to a call that decodes to the same value.

use diamondcut_calldata::{decode_diamond_cut, encode_diamond_cut};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(call) = decode_diamond_cut(data) else {
        return;
    };
    let reencoded = encode_diamond_cut(&call.cuts, &call.init);
    let again = decode_diamond_cut(&reencoded).expect("re-encoded calldata decodes");
    assert_eq!(again, call);
});
