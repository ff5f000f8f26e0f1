//! Clap-free settings for plan and commit pipelines.

use camino::{Utf8Path, Utf8PathBuf};
use diamondcut_domain::EqualityMode;
use diamondcut_types::InitCall;

/// Settings for the plan pipeline.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub out_dir: Utf8PathBuf,

    // Caps
    pub max_cuts: Option<u64>,
    pub max_selectors: Option<u64>,

    /// Initializer carried into the plan and its calldata.
    pub init: InitCall,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            out_dir: Utf8PathBuf::from("artifacts/diamondcut"),
            max_cuts: None,
            max_selectors: None,
            init: InitCall::default(),
        }
    }
}

/// Settings for the commit pipeline.
#[derive(Debug, Clone)]
pub struct CommitSettings {
    /// Directory holding `plan.json`; commit artifacts are written here too.
    pub out_dir: Utf8PathBuf,

    pub stored_abi: Utf8PathBuf,

    /// Where the merged ABI goes; defaults to overwriting `stored_abi`.
    pub abi_out: Option<Utf8PathBuf>,

    /// Hash of the confirmed `diamondCut` transaction. Required unless the plan is in sync.
    pub tx_hash: Option<String>,

    pub equality: EqualityMode,
}

impl CommitSettings {
    pub fn plan_path(&self) -> Utf8PathBuf {
        self.out_dir.join("plan.json")
    }

    pub fn abi_target(&self) -> &Utf8Path {
        self.abi_out.as_deref().unwrap_or(&self.stored_abi)
    }
}

impl Default for CommitSettings {
    fn default() -> Self {
        Self {
            out_dir: Utf8PathBuf::from("artifacts/diamondcut"),
            stored_abi: Utf8PathBuf::from("deployments/Diamond.abi.json"),
            abi_out: None,
            tx_hash: None,
            equality: EqualityMode::default(),
        }
    }
}
