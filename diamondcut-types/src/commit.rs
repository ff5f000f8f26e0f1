use crate::plan::ToolInfo;
use serde::{Deserialize, Serialize};

/// Record of folding a confirmed cut's interfaces into the stored ABI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub schema: String,
    pub tool: ToolInfo,
    pub plan_ref: PlanRef,

    /// Transaction that applied the cut; absent when the plan was already in sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,

    pub stored_abi: AbiRef,
    pub summary: CommitSummary,
}

impl CommitRecord {
    pub fn new(tool: ToolInfo, plan_ref: PlanRef, stored_abi: AbiRef) -> Self {
        Self {
            schema: crate::schema::DIAMONDCUT_COMMIT_V1.to_string(),
            tool,
            plan_ref,
            tx_hash: None,
            stored_abi,
            summary: CommitSummary::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRef {
    pub plan_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiRef {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_before: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_after: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub fragments_before: u64,
    pub fragments_incoming: u64,
    pub fragments_after: u64,
    pub facets_merged: u64,
}

impl CommitSummary {
    pub fn fragments_appended(&self) -> u64 {
        self.fragments_after.saturating_sub(self.fragments_before)
    }
}
