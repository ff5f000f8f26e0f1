//! Error types for diamondcut-domain.
//!
//! Every variant is a local, synchronous refusal: the planner returns either a
//! complete cut list or one of these, never a partial plan.

use diamondcut_types::{Address, Selector};
use thiserror::Error;

/// Why a cut list could not be planned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Manifest registration info for a facet conflicts with itself or another entry.
    #[error("ambiguous registration for facet '{facet}': {detail}")]
    AmbiguousRegistration { facet: String, detail: String },

    /// Two distinct declarations resolve to the same selector.
    #[error("selector collision on {selector}: {first} vs {second}")]
    SelectorCollision {
        selector: Selector,
        first: String,
        second: String,
    },

    /// A fragment's declared parameter shape is inconsistent.
    #[error("malformed fragment '{fragment}' in facet '{facet}': {detail}")]
    MalformedFragment {
        facet: String,
        fragment: String,
        detail: String,
    },

    /// The routing table could not be read for a previously registered facet.
    #[error("routing lookup failed for facet '{facet}' at {address}: {message}")]
    RoutingLookup {
        facet: String,
        address: Address,
        message: String,
    },

    /// A selector would be touched by more than one cut entry.
    #[error("selector {selector} appears in more than one cut: {first} and {second}")]
    ConflictingCut {
        selector: Selector,
        first: String,
        second: String,
    },

    /// Configured plan caps were exceeded.
    #[error("caps exceeded: {message}")]
    CapsExceeded { message: String },
}

impl PlanError {
    /// Stable token for reports.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::AmbiguousRegistration { .. } => "ambiguous_registration",
            PlanError::SelectorCollision { .. } => "selector_collision",
            PlanError::MalformedFragment { .. } => "malformed_fragment",
            PlanError::RoutingLookup { .. } => "routing_lookup",
            PlanError::ConflictingCut { .. } => "conflicting_cut",
            PlanError::CapsExceeded { .. } => "caps_exceeded",
        }
    }

    /// Facet the error is attributed to, when there is one.
    pub fn facet(&self) -> Option<&str> {
        match self {
            PlanError::AmbiguousRegistration { facet, .. }
            | PlanError::MalformedFragment { facet, .. }
            | PlanError::RoutingLookup { facet, .. } => Some(facet.as_str()),
            _ => None,
        }
    }

    /// Attribute an ABI-level error to the facet whose interface produced it.
    pub fn in_facet(self, name: &str) -> Self {
        match self {
            PlanError::MalformedFragment {
                fragment, detail, ..
            } => PlanError::MalformedFragment {
                facet: name.to_string(),
                fragment,
                detail,
            },
            PlanError::SelectorCollision {
                selector,
                first,
                second,
            } => PlanError::SelectorCollision {
                selector,
                first: qualify(name, first),
                second: qualify(name, second),
            },
            other => other,
        }
    }
}

fn qualify(facet: &str, signature: String) -> String {
    if signature.contains("::") {
        signature
    } else {
        format!("{}::{}", facet, signature)
    }
}

/// Why a merged interface could not be committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The plan carries cuts, so a confirmed transaction is required.
    #[error("plan {plan_id} has {cuts} cut(s); commit requires a confirmed transaction")]
    Unconfirmed { plan_id: String, cuts: usize },

    /// A transaction was supplied for a plan that had nothing to submit.
    #[error("plan {plan_id} is already in sync; no transaction should exist for it")]
    UnexpectedTransaction { plan_id: String },

    #[error("invalid transaction hash '{value}'")]
    InvalidTxHash { value: String },

    /// The plan processed a facet the manifest does not describe.
    #[error("facet '{facet}' from the plan is missing from the manifest")]
    UnknownFacet { facet: String },

    /// The manifest interface of a processed facet differs from the one planned.
    #[error("facet '{facet}' interface changed since plan (planned {planned}, now {current})")]
    AbiChanged {
        facet: String,
        planned: String,
        current: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_facet_fills_malformed_fragment_facet() {
        let err = PlanError::MalformedFragment {
            facet: String::new(),
            fragment: "open".to_string(),
            detail: "tuple without components".to_string(),
        }
        .in_facet("TradingOpenFacet");
        assert_eq!(err.facet(), Some("TradingOpenFacet"));
        assert!(err.to_string().contains("TradingOpenFacet"));
    }

    #[test]
    fn in_facet_qualifies_collision_sides_once() {
        let err = PlanError::SelectorCollision {
            selector: Selector::new([1, 2, 3, 4]),
            first: "a()".to_string(),
            second: "Other::b()".to_string(),
        }
        .in_facet("VaultFacet");
        match err {
            PlanError::SelectorCollision { first, second, .. } => {
                assert_eq!(first, "VaultFacet::a()");
                assert_eq!(second, "Other::b()");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn codes_are_snake_case_tokens() {
        let err = PlanError::CapsExceeded {
            message: "max_cuts 3 > 2 allowed".to_string(),
        };
        assert_eq!(err.code(), "caps_exceeded");
        assert!(err.to_string().starts_with("caps exceeded"));
        assert_eq!(err.facet(), None);
    }
}
