use crate::primitives::{Address, Selector, hex_bytes};
use serde::{Deserialize, Serialize};

/// Routing-table edit, in the order of the on-chain `FacetCutAction` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutAction {
    Add,
    Replace,
    Remove,
}

impl CutAction {
    /// Wire code: Add = 0, Replace = 1, Remove = 2.
    pub fn code(self) -> u8 {
        match self {
            CutAction::Add => 0,
            CutAction::Replace => 1,
            CutAction::Remove => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CutAction::Add),
            1 => Some(CutAction::Replace),
            2 => Some(CutAction::Remove),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CutAction::Add => "add",
            CutAction::Replace => "replace",
            CutAction::Remove => "remove",
        }
    }
}

/// One entry of a cut list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCut {
    /// Manifest facet this entry came from. Not part of the wire encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,

    #[serde(rename = "facetAddress")]
    pub facet_address: Address,

    pub action: CutAction,

    #[serde(rename = "functionSelectors")]
    pub function_selectors: Vec<Selector>,
}

impl FacetCut {
    pub fn add(facet: &str, target: Address, selectors: Vec<Selector>) -> Self {
        Self {
            facet: Some(facet.to_string()),
            facet_address: target,
            action: CutAction::Add,
            function_selectors: selectors,
        }
    }

    pub fn replace(facet: &str, target: Address, selectors: Vec<Selector>) -> Self {
        Self {
            facet: Some(facet.to_string()),
            facet_address: target,
            action: CutAction::Replace,
            function_selectors: selectors,
        }
    }

    /// Remove entries always target the null address.
    pub fn remove(facet: &str, selectors: Vec<Selector>) -> Self {
        Self {
            facet: Some(facet.to_string()),
            facet_address: Address::ZERO,
            action: CutAction::Remove,
            function_selectors: selectors,
        }
    }
}

/// Optional initializer delegate-called after the cut is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InitCall {
    #[serde(default)]
    pub target: Address,

    #[serde(default, with = "hex_bytes")]
    pub calldata: Vec<u8>,
}

impl InitCall {
    pub fn is_empty(&self) -> bool {
        self.target.is_zero() && self.calldata.is_empty()
    }
}
