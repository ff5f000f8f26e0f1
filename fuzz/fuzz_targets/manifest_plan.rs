#![no_main]

//! Fuzz target for the cut planner.
//!
//! Structured input builds a manifest and routing table from a small pool
//! of functions and addresses. Any plan the planner accepts must touch each
//! selector at most once and use the null address only for removals.

use arbitrary::Arbitrary;
use diamondcut_domain::plan_cuts;
use diamondcut_types::manifest::{DeploymentManifest, FacetRemoval, ManifestFacet};
use diamondcut_types::routing::{FacetRegistration, RoutingSnapshot};
use diamondcut_types::{Abi, AbiFragment, AbiParam, Address, CutAction};
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

const NAMES: [&str; 6] = ["deposit", "withdraw", "pause", "unpause", "lock", "unlock"];

#[derive(Debug, Arbitrary)]
struct PlanInput {
    facets: Vec<FacetInput>,
    removals: Vec<RemovalInput>,
    routes: Vec<(u8, Vec<u8>)>,
}

#[derive(Debug, Arbitrary)]
struct FacetInput {
    name: u8,
    previous: Option<u8>,
    new: Option<u8>,
    functions: Vec<u8>,
}

#[derive(Debug, Arbitrary)]
struct RemovalInput {
    name: u8,
    functions: Vec<u8>,
}

fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address::new(bytes)
}

fn function(n: u8) -> AbiFragment {
    let name = NAMES[n as usize % NAMES.len()];
    let inputs = if n % 2 == 0 {
        vec![AbiParam::new("v", "uint256")]
    } else {
        vec![]
    };
    AbiFragment::function(name, inputs)
}

fn abi(functions: &[u8]) -> Abi {
    Abi::new(functions.iter().take(8).map(|n| function(*n)).collect())
}

fuzz_target!(|input: PlanInput| {
    let manifest = DeploymentManifest {
        diamond: Some(addr(0xd1)),
        facets: input
            .facets
            .iter()
            .take(4)
            .map(|f| ManifestFacet {
                name: format!("Facet{}", f.name % 5),
                previous_address: f.previous.map(addr).and_then(Address::non_zero),
                new_address: f.new.map(addr).and_then(Address::non_zero),
                abi: abi(&f.functions),
            })
            .collect(),
        remove: input
            .removals
            .iter()
            .take(2)
            .map(|r| FacetRemoval {
                name: format!("Facet{}", r.name % 5),
                selectors: vec![],
                abi: Some(abi(&r.functions)),
            })
            .collect(),
    };

    let mut seen = HashSet::new();
    let routing = RoutingSnapshot::new(
        input
            .routes
            .iter()
            .take(4)
            .filter(|(a, _)| *a != 0)
            .map(|(a, fns)| FacetRegistration {
                facet_address: addr(*a),
                function_selectors: fns
                    .iter()
                    .take(8)
                    .filter_map(|n| diamondcut_domain::selector_of(&function(*n)).ok())
                    .filter(|s| seen.insert(*s))
                    .collect(),
            })
            .collect(),
    );

    if let Ok(cuts) = plan_cuts(&manifest, &routing) {
        let mut touched = HashSet::new();
        for cut in &cuts {
            assert_eq!(cut.action == CutAction::Remove, cut.facet_address.is_zero());
            assert!(!cut.function_selectors.is_empty());
            for s in &cut.function_selectors {
                assert!(touched.insert(*s), "selector {} in two cuts", s);
            }
        }
    }
});
