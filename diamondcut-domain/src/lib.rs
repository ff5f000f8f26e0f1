//! Domain logic: turn a deployment manifest and the live routing table into a
//! deterministic facet cut plan, and keep the stored interface in step.
//!
//! This crate owns *what* should be cut and why. It does not own how the cut
//! is encoded for submission; that's the `diamondcut-calldata` crate.

pub mod commit;
mod error;
pub mod merge;
mod planner;
mod ports;
pub mod selectors;

pub use commit::{CutReceipt, collect_incoming, commit_merged_interface};
pub use error::{CommitError, PlanError};
pub use merge::{EqualityMode, dedup_abi, entries_equal, merge};
pub use planner::{PlanContext, Planner, PlannerConfig, abi_fingerprint, plan_cuts};
pub use ports::RoutingTable;
pub use selectors::{
    SelectorEntry, canonical_signature, dedup, intersect, selector_of, selector_table,
    selectors_of, subtract, validate_abi,
};
