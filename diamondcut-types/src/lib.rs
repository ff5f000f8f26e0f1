//! Shared DTOs (schemas-as-code) for the diamondcut workspace.
//!
//! # Design constraints
//! - These types are intended to be serialized to disk.
//! - ABI and routing shapes follow the compiler and loupe JSON layouts.
//! - Prefer adding optional fields over changing semantics.

pub mod abi;
pub mod commit;
pub mod cut;
pub mod manifest;
pub mod plan;
pub mod primitives;
pub mod report;
pub mod routing;

pub use abi::{Abi, AbiFragment, AbiParam, FragmentKind};
pub use cut::{CutAction, FacetCut, InitCall};
pub use primitives::{Address, HexParseError, Selector};

/// Schema identifiers.
pub mod schema {
    pub const DIAMONDCUT_PLAN_V1: &str = "diamondcut.plan.v1";
    pub const DIAMONDCUT_COMMIT_V1: &str = "diamondcut.commit.v1";
    pub const DIAMONDCUT_REPORT_V1: &str = "diamondcut.report.v1";
}
