#![no_main]

//! Fuzz target for ABI merging.
//!
//! For any two parseable ABIs and either equality mode, the merge keeps the
//! deduplicated base as a prefix and merging the result again changes nothing.

use diamondcut_domain::{EqualityMode, dedup_abi, merge};
use diamondcut_types::Abi;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (bool, &[u8], &[u8])| {
    let (strict, base, incoming) = input;
    let (Ok(base), Ok(incoming)) = (
        serde_json::from_slice::<Abi>(base),
        serde_json::from_slice::<Abi>(incoming),
    ) else {
        return;
    };
    let mode = if strict {
        EqualityMode::Strict
    } else {
        EqualityMode::Shape
    };

    let merged = merge(&base, &incoming, mode);
    let base_unique = dedup_abi(&base, mode);
    assert_eq!(&merged.fragments()[..base_unique.len()], base_unique.fragments());
    assert_eq!(merge(&merged, &incoming, mode), merged);
});
