use crate::cut::{CutAction, FacetCut, InitCall};
use crate::primitives::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// The reconciled cut list plus everything needed to audit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutPlan {
    pub schema: String,

    /// Deterministic id derived from the cut list and init call.
    pub plan_id: String,

    pub tool: ToolInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diamond: Option<Address>,

    #[serde(default)]
    pub cuts: Vec<FacetCut>,

    #[serde(default)]
    pub init: InitCall,

    #[serde(default)]
    pub facets: Vec<FacetOutcome>,

    pub summary: PlanSummary,
}

impl CutPlan {
    pub fn new(tool: ToolInfo, diamond: Option<Address>) -> Self {
        Self {
            schema: crate::schema::DIAMONDCUT_PLAN_V1.to_string(),
            plan_id: String::new(),
            tool,
            diamond,
            cuts: vec![],
            init: InitCall::default(),
            facets: vec![],
            summary: PlanSummary::default(),
        }
    }

    /// An empty cut list means the routing table already matches the build.
    pub fn is_in_sync(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Names of facets whose new code this plan routes to.
    pub fn processed_facets(&self) -> impl Iterator<Item = &str> {
        self.facets
            .iter()
            .filter(|f| matches!(f.status, FacetStatus::Added | FacetStatus::Reconciled))
            .map(|f| f.name.as_str())
    }
}

/// What the planner did with one manifest or removal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetStatus {
    /// Listed for full removal.
    Removed,
    /// No prior registration; every selector is new.
    Added,
    /// Redeployed over an existing registration.
    Reconciled,
    /// Not redeployed this run.
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetOutcome {
    pub name: String,
    pub status: FacetStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_address: Option<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_address: Option<Address>,

    #[serde(default)]
    pub removed: u64,

    #[serde(default)]
    pub replaced: u64,

    #[serde(default)]
    pub added: u64,

    /// sha256 of the interface the facet was planned with; set for redeployed facets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi_sha256: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub cuts_total: u64,
    pub selectors_added: u64,
    pub selectors_replaced: u64,
    pub selectors_removed: u64,
    pub facets_processed: u64,
    pub facets_skipped: u64,
}

impl PlanSummary {
    pub fn selectors_total(&self) -> u64 {
        self.selectors_added + self.selectors_replaced + self.selectors_removed
    }

    pub fn from_cuts(cuts: &[FacetCut]) -> Self {
        let mut summary = PlanSummary {
            cuts_total: cuts.len() as u64,
            ..Default::default()
        };
        for cut in cuts {
            let n = cut.function_selectors.len() as u64;
            match cut.action {
                CutAction::Add => summary.selectors_added += n,
                CutAction::Replace => summary.selectors_replaced += n,
                CutAction::Remove => summary.selectors_removed += n,
            }
        }
        summary
    }
}
