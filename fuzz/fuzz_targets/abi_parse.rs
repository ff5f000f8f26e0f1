#![no_main]

//! Fuzz target for ABI parsing and selector derivation.
//!
//! Arbitrary JSON is parsed as an ABI; validation and the selector table
//! must either succeed or return a typed error, never panic.

use diamondcut_domain::{canonical_signature, selector_table, validate_abi};
use diamondcut_types::Abi;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(abi) = serde_json::from_str::<Abi>(s) else {
        return;
    };

    let valid = validate_abi(&abi).is_ok();
    let table = selector_table(&abi);
    if valid && let Ok(table) = &table {
        // Every entry's signature reproduces from its fragment.
        let signatures: Vec<_> = abi
            .functions()
            .filter_map(|f| canonical_signature(f).ok())
            .collect();
        for entry in table {
            assert!(signatures.contains(&entry.signature));
        }
    }

    let _ = serde_json::to_string(&abi);
});
