//! Embeddable core library for diamondcut.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into deployment scripts or other host processes.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`ManifestSource`](ports::ManifestSource): load the deployment manifest
//! - [`RoutingSource`](ports::RoutingSource): load the diamond's routing snapshot
//! - [`AbiSource`](ports::AbiSource): load the stored canonical ABI
//! - [`PlanSource`](ports::PlanSource): load a previously written plan
//! - [`WritePort`](ports::WritePort): write files and create directories
//!
//! The [`adapters`] module provides filesystem-backed and in-memory implementations.
//!
//! # Entry points
//!
//! - [`run_plan`](pipeline::run_plan): reconcile the manifest into a cut plan + report
//! - [`run_commit`](pipeline::run_commit): fold a confirmed plan's interfaces into the stored ABI

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;
pub mod stored;

// Re-export the domain's routing port so callers don't need diamondcut-domain directly.
pub use diamondcut_domain::{EqualityMode, RoutingTable};

pub use stored::StoredAbi;
