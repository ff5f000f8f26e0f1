//! Commit boundary between an applied cut plan and the stored interface.
//!
//! The stored ABI mirrors what the diamond routes on-chain, so it may only
//! change once the plan that produced the new routes has been confirmed.
//! [`CutReceipt`] is the proof of that; it cannot be built from thin air.

use crate::error::CommitError;
use crate::merge::{EqualityMode, merge};
use crate::planner::abi_fingerprint;
use diamondcut_types::Abi;
use diamondcut_types::manifest::DeploymentManifest;
use diamondcut_types::plan::{CutPlan, FacetStatus};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutReceipt {
    plan_id: String,
    tx_hash: Option<String>,
    facets: Vec<String>,
    /// Interface fingerprints recorded by the plan, parallel to `facets`.
    abi_sha256: Vec<Option<String>>,
}

impl CutReceipt {
    /// Receipt for a plan whose cut transaction `tx_hash` was confirmed.
    pub fn confirmed(plan: &CutPlan, tx_hash: &str) -> Result<Self, CommitError> {
        if plan.is_in_sync() {
            return Err(CommitError::UnexpectedTransaction {
                plan_id: plan.plan_id.clone(),
            });
        }
        let tx_hash = normalize_tx_hash(tx_hash)?;
        Ok(Self::new(plan, Some(tx_hash)))
    }

    /// Receipt for a plan with no cuts; nothing was submitted.
    pub fn in_sync(plan: &CutPlan) -> Result<Self, CommitError> {
        if !plan.is_in_sync() {
            return Err(CommitError::Unconfirmed {
                plan_id: plan.plan_id.clone(),
                cuts: plan.cuts.len(),
            });
        }
        Ok(Self::new(plan, None))
    }

    fn new(plan: &CutPlan, tx_hash: Option<String>) -> Self {
        let (facets, abi_sha256): (Vec<_>, Vec<_>) = plan
            .facets
            .iter()
            .filter(|f| matches!(f.status, FacetStatus::Added | FacetStatus::Reconciled))
            .map(|f| (f.name.clone(), f.abi_sha256.clone()))
            .unzip();
        Self {
            plan_id: plan.plan_id.clone(),
            tx_hash,
            facets,
            abi_sha256,
        }
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref()
    }

    /// Facets the plan added or reconciled, in plan order.
    pub fn facets(&self) -> &[String] {
        &self.facets
    }
}

fn normalize_tx_hash(value: &str) -> Result<String, CommitError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CommitError::InvalidTxHash {
            value: value.to_string(),
        });
    }
    Ok(format!("0x{}", digits.to_ascii_lowercase()))
}

/// Interface fragments the receipt's facets introduced, in plan order.
///
/// Refuses when a facet's manifest interface no longer matches the
/// fingerprint the plan recorded for it.
pub fn collect_incoming(
    receipt: &CutReceipt,
    manifest: &DeploymentManifest,
) -> Result<Abi, CommitError> {
    let parts = receipt
        .facets
        .iter()
        .zip(&receipt.abi_sha256)
        .map(|(name, planned)| {
            let facet = manifest
                .facet(name)
                .ok_or_else(|| CommitError::UnknownFacet {
                    facet: name.clone(),
                })?;
            if let Some(planned) = planned {
                let current = abi_fingerprint(&facet.abi);
                if &current != planned {
                    return Err(CommitError::AbiChanged {
                        facet: name.clone(),
                        planned: planned.clone(),
                        current,
                    });
                }
            }
            Ok(&facet.abi)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Abi::concat(parts))
}

/// Fold the `stored` interface into `incoming` once the receipt proves the
/// routes exist.
///
/// Incoming fragments come first, so a redeployed function's new outputs and
/// mutability replace the stored copy it is structurally equal to.
pub fn commit_merged_interface(
    receipt: &CutReceipt,
    stored: &Abi,
    incoming: &Abi,
    mode: EqualityMode,
) -> Abi {
    let merged = merge(incoming, stored, mode);
    info!(
        plan_id = %receipt.plan_id,
        tx_hash = receipt.tx_hash.as_deref().unwrap_or("-"),
        appended = merged.len().saturating_sub(stored.len()),
        "committed merged interface"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use diamondcut_types::manifest::ManifestFacet;
    use diamondcut_types::plan::{FacetOutcome, FacetStatus, ToolInfo};
    use diamondcut_types::{AbiFragment, AbiParam, Address, FacetCut, Selector};

    const TX: &str = "0xAB00000000000000000000000000000000000000000000000000000000000001";

    fn plan_with(cuts: Vec<FacetCut>, facets: &[(&str, FacetStatus)]) -> CutPlan {
        let mut plan = CutPlan::new(
            ToolInfo {
                name: "diamondcut".to_string(),
                version: None,
                commit: None,
            },
            None,
        );
        plan.plan_id = "plan-1".to_string();
        plan.cuts = cuts;
        plan.facets = facets
            .iter()
            .map(|(name, status)| FacetOutcome {
                name: name.to_string(),
                status: *status,
                previous_address: None,
                new_address: None,
                removed: 0,
                replaced: 0,
                added: 0,
                abi_sha256: None,
            })
            .collect();
        plan
    }

    fn manifest_facet(name: &str, abi: Abi) -> ManifestFacet {
        ManifestFacet {
            name: name.to_string(),
            previous_address: None,
            new_address: None,
            abi,
        }
    }

    fn price(output: &str, mutability: &str) -> AbiFragment {
        let mut fragment = AbiFragment::function("price", vec![AbiParam::new("id", "uint256")]);
        fragment.outputs = vec![AbiParam::new("", output)];
        fragment.state_mutability = Some(mutability.to_string());
        fragment
    }

    fn one_cut() -> Vec<FacetCut> {
        vec![FacetCut::add("A", Address::new([1; 20]), vec![Selector::new([1, 2, 3, 4])])]
    }

    #[test]
    fn confirmed_requires_cuts_and_valid_hash() {
        let pending = plan_with(one_cut(), &[("A", FacetStatus::Added)]);
        let receipt = CutReceipt::confirmed(&pending, TX).expect("receipt");
        assert_eq!(
            receipt.tx_hash(),
            Some("0xab00000000000000000000000000000000000000000000000000000000000001")
        );
        assert_eq!(receipt.facets(), &["A".to_string()]);

        assert!(matches!(
            CutReceipt::confirmed(&pending, "0x1234"),
            Err(CommitError::InvalidTxHash { .. })
        ));

        let synced = plan_with(vec![], &[]);
        assert!(matches!(
            CutReceipt::confirmed(&synced, TX),
            Err(CommitError::UnexpectedTransaction { .. })
        ));
    }

    #[test]
    fn in_sync_refuses_pending_plans() {
        let pending = plan_with(one_cut(), &[("A", FacetStatus::Added)]);
        assert_eq!(
            CutReceipt::in_sync(&pending),
            Err(CommitError::Unconfirmed {
                plan_id: "plan-1".to_string(),
                cuts: 1
            })
        );
        let synced = plan_with(vec![], &[("C", FacetStatus::Unchanged)]);
        let receipt = CutReceipt::in_sync(&synced).expect("receipt");
        assert!(receipt.tx_hash().is_none());
        assert!(receipt.facets().is_empty());
    }

    #[test]
    fn incoming_follows_plan_order_and_skips_unprocessed_facets() {
        let plan = plan_with(
            one_cut(),
            &[
                ("Old", FacetStatus::Removed),
                ("B", FacetStatus::Reconciled),
                ("C", FacetStatus::Unchanged),
                ("A", FacetStatus::Added),
            ],
        );
        let facet = |name: &str, fns: &[&str]| ManifestFacet {
            name: name.to_string(),
            previous_address: None,
            new_address: None,
            abi: Abi::new(fns.iter().map(|f| AbiFragment::function(*f, vec![])).collect()),
        };
        let manifest = DeploymentManifest {
            diamond: None,
            facets: vec![facet("A", &["a"]), facet("B", &["b"]), facet("C", &["c"])],
            remove: vec![],
        };

        let receipt = CutReceipt::confirmed(&plan, TX).unwrap();
        let incoming = collect_incoming(&receipt, &manifest).unwrap();
        let names: Vec<_> = incoming.iter().map(|f| f.display_name()).collect();
        assert_eq!(names, vec!["b", "a"]);

        let stored = Abi::new(vec![AbiFragment::function("b", vec![])]);
        let merged = commit_merged_interface(&receipt, &stored, &incoming, EqualityMode::Strict);
        let names: Vec<_> = merged.iter().map(|f| f.display_name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn redeployed_fragment_replaces_stale_stored_copy() {
        let plan = plan_with(one_cut(), &[("A", FacetStatus::Reconciled)]);
        let receipt = CutReceipt::confirmed(&plan, TX).unwrap();

        let stored = Abi::new(vec![
            AbiFragment::function("owner", vec![]),
            price("uint128", "view"),
        ]);
        let incoming = Abi::new(vec![price("uint256", "nonpayable")]);
        let merged = commit_merged_interface(&receipt, &stored, &incoming, EqualityMode::Strict);

        assert_eq!(merged.len(), 2);
        let fragments: Vec<_> = merged.iter().collect();
        assert_eq!(fragments[0].display_name(), "price");
        assert_eq!(fragments[0].outputs[0].ty, "uint256");
        assert_eq!(fragments[0].state_mutability.as_deref(), Some("nonpayable"));
        assert_eq!(fragments[1].display_name(), "owner");
    }

    #[test]
    fn interface_edited_after_planning_is_refused() {
        let planned = Abi::new(vec![AbiFragment::function("f", vec![])]);
        let mut plan = plan_with(one_cut(), &[("A", FacetStatus::Added)]);
        plan.facets[0].abi_sha256 = Some(abi_fingerprint(&planned));
        let receipt = CutReceipt::confirmed(&plan, TX).unwrap();

        let same = DeploymentManifest {
            facets: vec![manifest_facet("A", planned.clone())],
            ..Default::default()
        };
        assert_eq!(collect_incoming(&receipt, &same).unwrap(), planned);

        let rebuilt = Abi::new(vec![
            AbiFragment::function("f", vec![]),
            AbiFragment::function("g", vec![]),
        ]);
        let edited = DeploymentManifest {
            facets: vec![manifest_facet("A", rebuilt.clone())],
            ..Default::default()
        };
        assert_eq!(
            collect_incoming(&receipt, &edited),
            Err(CommitError::AbiChanged {
                facet: "A".to_string(),
                planned: abi_fingerprint(&planned),
                current: abi_fingerprint(&rebuilt),
            })
        );
    }

    #[test]
    fn unknown_facet_is_reported() {
        let plan = plan_with(one_cut(), &[("Ghost", FacetStatus::Added)]);
        let receipt = CutReceipt::confirmed(&plan, TX).unwrap();
        assert_eq!(
            collect_incoming(&receipt, &DeploymentManifest::default()),
            Err(CommitError::UnknownFacet {
                facet: "Ghost".to_string()
            })
        );
    }
}
