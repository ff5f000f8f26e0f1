//! Calldata codec for the diamond's `diamondCut` entry point.
//!
//! The call is declared once with `sol!`; this crate only maps between the
//! generated wire structs and the planner's [`FacetCut`] / [`InitCall`].

mod error;

pub use error::{CalldataError, CalldataResult};

use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;
use diamondcut_types::{Address, CutAction, FacetCut, InitCall, Selector};
use tracing::debug;

/// `sol!` bindings for the diamond's cut entry point.
pub mod wire {
    alloy_sol_types::sol! {
        struct FacetCut {
            address facetAddress;
            uint8 action;
            bytes4[] functionSelectors;
        }

        function diamondCut(FacetCut[] cuts, address init, bytes data);
    }
}

pub const DIAMOND_CUT_SIGNATURE: &str = wire::diamondCutCall::SIGNATURE;

/// `keccak256(DIAMOND_CUT_SIGNATURE)[..4]`.
pub const DIAMOND_CUT_SELECTOR: Selector = Selector::new(wire::diamondCutCall::SELECTOR);

/// A decoded `diamondCut` call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiamondCutCall {
    pub cuts: Vec<FacetCut>,
    pub init: InitCall,
}

impl From<&FacetCut> for wire::FacetCut {
    fn from(cut: &FacetCut) -> Self {
        wire::FacetCut {
            facetAddress: cut.facet_address.into(),
            action: cut.action.code(),
            functionSelectors: cut.function_selectors.iter().map(|s| s.0).collect(),
        }
    }
}

/// ABI-encode `diamondCut(cuts, init.target, init.calldata)`.
pub fn encode_diamond_cut(cuts: &[FacetCut], init: &InitCall) -> Vec<u8> {
    let call = wire::diamondCutCall {
        cuts: cuts.iter().map(wire::FacetCut::from).collect(),
        init: init.target.into(),
        data: Bytes::copy_from_slice(&init.calldata),
    };
    let out = call.abi_encode();
    debug!(cuts = cuts.len(), bytes = out.len(), "encoded diamondCut calldata");
    out
}

/// `0x`-prefixed lowercase hex of [`encode_diamond_cut`].
pub fn calldata_hex(cuts: &[FacetCut], init: &InitCall) -> String {
    format!("0x{}", hex::encode(encode_diamond_cut(cuts, init)))
}

/// Parse hex text (with or without `0x`, surrounding whitespace ignored).
pub fn calldata_from_hex(text: &str) -> CalldataResult<Vec<u8>> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| CalldataError::Hex(e.to_string()))
}

/// Decode calldata produced by [`encode_diamond_cut`].
///
/// Decoded cuts carry no facet name; names are not part of the wire format.
pub fn decode_diamond_cut(data: &[u8]) -> CalldataResult<DiamondCutCall> {
    let Some(head) = data.first_chunk::<4>() else {
        return Err(CalldataError::Truncated {
            needed: 4 - data.len(),
        });
    };
    let found = Selector::new(*head);
    if found != DIAMOND_CUT_SELECTOR {
        return Err(CalldataError::WrongSelector {
            found,
            expected: DIAMOND_CUT_SELECTOR,
        });
    }

    let call = wire::diamondCutCall::abi_decode(data)
        .map_err(|e| CalldataError::Abi(e.to_string()))?;

    let cuts = call
        .cuts
        .into_iter()
        .enumerate()
        .map(|(index, cut)| {
            let code = cut.action;
            let action =
                CutAction::from_code(code).ok_or(CalldataError::InvalidAction { index, code })?;
            let function_selectors = cut.functionSelectors.into_iter().map(Selector::from);
            Ok(FacetCut {
                facet: None,
                facet_address: Address::from(cut.facetAddress),
                action,
                function_selectors: function_selectors.collect(),
            })
        })
        .collect::<CalldataResult<Vec<_>>>()?;

    Ok(DiamondCutCall {
        cuts,
        init: InitCall {
            target: Address::from(call.init),
            calldata: call.data.to_vec(),
        },
    })
}
