use crate::error::PlanError;
use crate::ports::RoutingTable;
use crate::selectors::{dedup, intersect, selector_table, subtract, validate_abi};
use diamondcut_types::manifest::{DeploymentManifest, FacetRemoval, ManifestFacet};
use diamondcut_types::plan::{CutPlan, FacetOutcome, FacetStatus, PlanSummary, ToolInfo};
use diamondcut_types::{Abi, Address, CutAction, FacetCut, InitCall, Selector};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    pub max_cuts: Option<u64>,
    pub max_selectors: Option<u64>,
    /// Initializer delegate-called after the cuts are applied.
    pub init: InitCall,
}

#[derive(Debug, Clone, Default)]
pub struct PlanContext {
    pub config: PlannerConfig,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Planner;

impl Planner {
    pub fn new() -> Self {
        Self
    }

    /// Build the full cut plan for `manifest` against the live `routing` table.
    ///
    /// Either every facet is planned or an error is returned; there is no
    /// partial plan.
    pub fn plan(
        &self,
        ctx: &PlanContext,
        manifest: &DeploymentManifest,
        routing: &dyn RoutingTable,
        tool: ToolInfo,
    ) -> Result<CutPlan, PlanError> {
        let reconciled = reconcile(manifest, routing)?;
        enforce_caps(&ctx.config, &reconciled.cuts)?;

        let mut plan = CutPlan::new(tool, manifest.diamond);
        plan.summary = summarize(&reconciled.cuts, &reconciled.outcomes);
        plan.plan_id = deterministic_plan_id(manifest.diamond, &reconciled.cuts, &ctx.config.init)
            .to_string();
        plan.cuts = reconciled.cuts;
        plan.facets = reconciled.outcomes;
        plan.init = ctx.config.init.clone();

        if plan.is_in_sync() {
            info!(plan_id = %plan.plan_id, "routing table already in sync");
        } else {
            info!(
                plan_id = %plan.plan_id,
                cuts = plan.summary.cuts_total,
                added = plan.summary.selectors_added,
                replaced = plan.summary.selectors_replaced,
                removed = plan.summary.selectors_removed,
                "planned facet cuts"
            );
        }
        Ok(plan)
    }
}

/// The ordered cut list for `manifest`; empty means the table is in sync.
pub fn plan_cuts(
    manifest: &DeploymentManifest,
    routing: &dyn RoutingTable,
) -> Result<Vec<FacetCut>, PlanError> {
    reconcile(manifest, routing).map(|r| r.cuts)
}

struct Reconciled {
    cuts: Vec<FacetCut>,
    outcomes: Vec<FacetOutcome>,
}

/// Signature that first claimed a selector, qualified by facet name.
type Claims = HashMap<Selector, String>;

fn reconcile(
    manifest: &DeploymentManifest,
    routing: &dyn RoutingTable,
) -> Result<Reconciled, PlanError> {
    check_registrations(manifest)?;

    let mut cuts: Vec<FacetCut> = Vec::new();
    let mut outcomes: Vec<FacetOutcome> = Vec::new();

    for removal in &manifest.remove {
        let selectors = removal_selectors(removal)?;
        debug!(facet = %removal.name, selectors = selectors.len(), "facet removal");
        outcomes.push(FacetOutcome {
            name: removal.name.clone(),
            status: FacetStatus::Removed,
            previous_address: None,
            new_address: None,
            removed: selectors.len() as u64,
            replaced: 0,
            added: 0,
            abi_sha256: None,
        });
        if !selectors.is_empty() {
            cuts.push(FacetCut::remove(&removal.name, selectors));
        }
    }

    let mut claims = Claims::new();
    for facet in &manifest.facets {
        let outcome = reconcile_facet(facet, routing, &mut claims, &mut cuts)?;
        outcomes.push(outcome);
    }

    check_conflicts(&cuts)?;
    check_live_owners(&cuts, routing, &claims)?;

    Ok(Reconciled { cuts, outcomes })
}

fn reconcile_facet(
    facet: &ManifestFacet,
    routing: &dyn RoutingTable,
    claims: &mut Claims,
    cuts: &mut Vec<FacetCut>,
) -> Result<FacetOutcome, PlanError> {
    let mut outcome = FacetOutcome {
        name: facet.name.clone(),
        status: FacetStatus::Unchanged,
        previous_address: facet.previous_address,
        new_address: facet.new_address,
        removed: 0,
        replaced: 0,
        added: 0,
        abi_sha256: None,
    };

    let Some(new_address) = facet.new_address else {
        debug!(facet = %facet.name, "facet not redeployed, skipping");
        return Ok(outcome);
    };
    outcome.abi_sha256 = Some(abi_fingerprint(&facet.abi));

    validate_abi(&facet.abi).map_err(|e| e.in_facet(&facet.name))?;
    let table = selector_table(&facet.abi).map_err(|e| e.in_facet(&facet.name))?;
    for entry in &table {
        let qualified = format!("{}::{}", facet.name, entry.signature);
        if let Some(first) = claims.get(&entry.selector) {
            return Err(PlanError::SelectorCollision {
                selector: entry.selector,
                first: first.clone(),
                second: qualified,
            });
        }
        claims.insert(entry.selector, qualified);
    }
    let new: Vec<Selector> = table.iter().map(|e| e.selector).collect();

    let old = match facet.previous_address {
        None => Vec::new(),
        Some(previous) => {
            let old = routing
                .facet_function_selectors(previous)
                .map_err(|e| PlanError::RoutingLookup {
                    facet: facet.name.clone(),
                    address: previous,
                    message: format!("{e:#}"),
                })?;
            if old.is_empty() {
                warn!(
                    facet = %facet.name,
                    address = %previous,
                    "previous address has no routed selectors; planning as a fresh add"
                );
            }
            dedup(&old)
        }
    };

    let removed = subtract(&old, &new);
    let replaced = intersect(&old, &new);
    let added = subtract(&new, &old);

    debug!(
        facet = %facet.name,
        old = old.len(),
        new = new.len(),
        removed = removed.len(),
        replaced = replaced.len(),
        added = added.len(),
        "reconciled facet"
    );

    outcome.status = if facet.previous_address.is_none() {
        FacetStatus::Added
    } else {
        FacetStatus::Reconciled
    };
    outcome.removed = removed.len() as u64;
    outcome.replaced = replaced.len() as u64;
    outcome.added = added.len() as u64;

    if !removed.is_empty() {
        cuts.push(FacetCut::remove(&facet.name, removed));
    }
    if !replaced.is_empty() {
        cuts.push(FacetCut::replace(&facet.name, new_address, replaced));
    }
    if !added.is_empty() {
        cuts.push(FacetCut::add(&facet.name, new_address, added));
    }

    Ok(outcome)
}

fn removal_selectors(removal: &FacetRemoval) -> Result<Vec<Selector>, PlanError> {
    if !removal.selectors.is_empty() {
        return Ok(dedup(&removal.selectors));
    }
    match &removal.abi {
        Some(abi) => Ok(selector_table(abi)
            .map_err(|e| e.in_facet(&removal.name))?
            .into_iter()
            .map(|e| e.selector)
            .collect()),
        None => Ok(Vec::new()),
    }
}

fn check_registrations(manifest: &DeploymentManifest) -> Result<(), PlanError> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    let mut previous: HashMap<Address, &str> = HashMap::new();

    for facet in &manifest.facets {
        if !names.insert(facet.name.as_str()) {
            return Err(ambiguous(&facet.name, "facet is listed more than once"));
        }
        if let (Some(prev), Some(new)) = (facet.previous_address, facet.new_address)
            && prev == new
        {
            return Err(ambiguous(
                &facet.name,
                format!("new address {} equals the previous address", new),
            ));
        }
        if let Some(prev) = facet.previous_address
            && let Some(other) = previous.insert(prev, facet.name.as_str())
        {
            return Err(ambiguous(
                &facet.name,
                format!("previous address {} is also claimed by '{}'", prev, other),
            ));
        }
    }

    let mut removed: BTreeSet<&str> = BTreeSet::new();
    for removal in &manifest.remove {
        if names.contains(removal.name.as_str()) {
            return Err(ambiguous(
                &removal.name,
                "facet is both redeployed and scheduled for removal",
            ));
        }
        if !removed.insert(removal.name.as_str()) {
            return Err(ambiguous(&removal.name, "removal is listed more than once"));
        }
    }

    Ok(())
}

fn ambiguous(facet: &str, detail: impl Into<String>) -> PlanError {
    PlanError::AmbiguousRegistration {
        facet: facet.to_string(),
        detail: detail.into(),
    }
}

fn cut_label(cut: &FacetCut) -> String {
    format!(
        "{} {}",
        cut.action.as_str(),
        cut.facet.as_deref().unwrap_or("<unnamed>")
    )
}

fn check_conflicts(cuts: &[FacetCut]) -> Result<(), PlanError> {
    let mut seen: HashMap<Selector, usize> = HashMap::new();
    for (idx, cut) in cuts.iter().enumerate() {
        for selector in &cut.function_selectors {
            if let Some(first) = seen.insert(*selector, idx) {
                return Err(PlanError::ConflictingCut {
                    selector: *selector,
                    first: cut_label(&cuts[first]),
                    second: cut_label(cut),
                });
            }
        }
    }
    Ok(())
}

/// Added selectors must not still be routed anywhere on the live table.
fn check_live_owners(
    cuts: &[FacetCut],
    routing: &dyn RoutingTable,
    claims: &Claims,
) -> Result<(), PlanError> {
    let Some(first_add) = cuts.iter().find(|c| c.action == CutAction::Add) else {
        return Ok(());
    };

    let lookup_failed = |address: Address, e: anyhow::Error| PlanError::RoutingLookup {
        facet: first_add.facet.clone().unwrap_or_default(),
        address,
        message: format!("{e:#}"),
    };

    let mut owners: HashMap<Selector, Address> = HashMap::new();
    for address in routing
        .facet_addresses()
        .map_err(|e| lookup_failed(Address::ZERO, e))?
    {
        for selector in routing
            .facet_function_selectors(address)
            .map_err(|e| lookup_failed(address, e))?
        {
            owners.entry(selector).or_insert(address);
        }
    }

    for cut in cuts.iter().filter(|c| c.action == CutAction::Add) {
        for selector in &cut.function_selectors {
            if let Some(owner) = owners.get(selector) {
                let second = claims
                    .get(selector)
                    .cloned()
                    .unwrap_or_else(|| cut_label(cut));
                return Err(PlanError::SelectorCollision {
                    selector: *selector,
                    first: format!("live facet {}", owner),
                    second,
                });
            }
        }
    }
    Ok(())
}

fn enforce_caps(cfg: &PlannerConfig, cuts: &[FacetCut]) -> Result<(), PlanError> {
    if let Some(max_cuts) = cfg.max_cuts {
        let total = cuts.len() as u64;
        if total > max_cuts {
            return Err(PlanError::CapsExceeded {
                message: format!("max_cuts {} > {} allowed", total, max_cuts),
            });
        }
    }

    if let Some(max_selectors) = cfg.max_selectors {
        let total: u64 = cuts.iter().map(|c| c.function_selectors.len() as u64).sum();
        if total > max_selectors {
            return Err(PlanError::CapsExceeded {
                message: format!("max_selectors {} > {} allowed", total, max_selectors),
            });
        }
    }

    Ok(())
}

fn summarize(cuts: &[FacetCut], outcomes: &[FacetOutcome]) -> PlanSummary {
    let mut summary = PlanSummary::from_cuts(cuts);
    for outcome in outcomes {
        match outcome.status {
            FacetStatus::Added | FacetStatus::Reconciled => summary.facets_processed += 1,
            FacetStatus::Unchanged => summary.facets_skipped += 1,
            FacetStatus::Removed => {}
        }
    }
    summary
}

fn deterministic_plan_id(diamond: Option<Address>, cuts: &[FacetCut], init: &InitCall) -> Uuid {
    // Deterministic ID: v5(namespace, stable_key_bytes)
    const NAMESPACE: Uuid = Uuid::from_bytes([
        0x1f, 0x93, 0x1c, 0x1c, 0x7a, 0x0e, 0x4d, 0x62, 0x9a, 0xdf, 0xca, 0x15, 0x52, 0xef, 0x6b,
        0x2c,
    ]);

    let stable_key = format!(
        "{}|{}|{}",
        diamond.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
        fingerprint(&serde_json::to_string(cuts).unwrap_or_default()),
        fingerprint(&serde_json::to_string(init).unwrap_or_default()),
    );
    Uuid::new_v5(&NAMESPACE, stable_key.as_bytes())
}

/// sha256 over the serialized interface, as recorded in a plan's facet outcomes.
pub fn abi_fingerprint(abi: &Abi) -> String {
    fingerprint(&serde_json::to_string(abi).unwrap_or_default())
}

fn fingerprint(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectors::selector_of;
    use diamondcut_types::routing::{FacetRegistration, RoutingSnapshot};
    use diamondcut_types::{Abi, AbiFragment};

    fn addr(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::new(bytes)
    }

    fn func(name: &str) -> AbiFragment {
        AbiFragment::function(name, vec![])
    }

    fn abi(names: &[&str]) -> Abi {
        Abi::new(names.iter().map(|n| func(n)).collect())
    }

    fn sel(name: &str) -> Selector {
        selector_of(&func(name)).expect("selector")
    }

    fn sels(names: &[&str]) -> Vec<Selector> {
        names.iter().map(|n| sel(n)).collect()
    }

    fn facet(name: &str, prev: Option<u8>, new: Option<u8>, fns: &[&str]) -> ManifestFacet {
        ManifestFacet {
            name: name.to_string(),
            previous_address: prev.map(addr),
            new_address: new.map(addr),
            abi: abi(fns),
        }
    }

    fn routing(entries: &[(u8, &[&str])]) -> RoutingSnapshot {
        RoutingSnapshot::new(
            entries
                .iter()
                .map(|(a, fns)| FacetRegistration {
                    facet_address: addr(*a),
                    function_selectors: sels(fns),
                })
                .collect(),
        )
    }

    fn manifest(facets: Vec<ManifestFacet>) -> DeploymentManifest {
        DeploymentManifest {
            diamond: Some(addr(0xd1)),
            facets,
            remove: vec![],
        }
    }

    fn tool() -> ToolInfo {
        ToolInfo {
            name: "diamondcut".to_string(),
            version: None,
            commit: None,
        }
    }

    struct FailingRouting;

    impl RoutingTable for FailingRouting {
        fn facet_function_selectors(&self, _facet: Address) -> anyhow::Result<Vec<Selector>> {
            anyhow::bail!("rpc timeout")
        }

        fn facet_addresses(&self) -> anyhow::Result<Vec<Address>> {
            anyhow::bail!("rpc timeout")
        }
    }

    #[test]
    fn redeployed_facet_gets_remove_replace_add_in_order() {
        let m = manifest(vec![facet("A", Some(0xa0), Some(0xa1), &["two", "three", "four"])]);
        let r = routing(&[(0xa0, &["one", "two", "three"])]);

        let cuts = plan_cuts(&m, &r).expect("plan");
        assert_eq!(
            cuts,
            vec![
                FacetCut::remove("A", sels(&["one"])),
                FacetCut::replace("A", addr(0xa1), sels(&["two", "three"])),
                FacetCut::add("A", addr(0xa1), sels(&["four"])),
            ]
        );
    }

    #[test]
    fn new_facet_is_a_single_add() {
        let m = manifest(vec![facet("B", None, Some(0xb1), &["ten", "eleven"])]);
        let cuts = plan_cuts(&m, &RoutingSnapshot::default()).expect("plan");
        assert_eq!(cuts, vec![FacetCut::add("B", addr(0xb1), sels(&["ten", "eleven"]))]);
    }

    #[test]
    fn unchanged_facet_contributes_nothing() {
        let m = manifest(vec![facet("C", Some(0xc0), None, &["x"])]);
        let r = routing(&[(0xc0, &["x"])]);
        let plan = Planner::new()
            .plan(&PlanContext::default(), &m, &r, tool())
            .expect("plan");
        assert!(plan.is_in_sync());
        assert_eq!(plan.facets[0].status, FacetStatus::Unchanged);
        assert_eq!(plan.summary.facets_skipped, 1);
    }

    #[test]
    fn redeploy_with_identical_interface_is_a_full_replace() {
        let m = manifest(vec![facet("A", Some(0xa1), Some(0xa2), &["two", "three"])]);
        let r = routing(&[(0xa1, &["two", "three"])]);
        let cuts = plan_cuts(&m, &r).expect("plan");
        assert_eq!(cuts, vec![FacetCut::replace("A", addr(0xa2), sels(&["two", "three"]))]);
    }

    /// Routing table after the diamond executes `cuts`.
    fn applied(routing: &RoutingSnapshot, cuts: &[FacetCut]) -> RoutingSnapshot {
        let mut table: Vec<(Selector, Address)> = routing
            .facets
            .iter()
            .flat_map(|f| f.function_selectors.iter().map(move |s| (*s, f.facet_address)))
            .collect();
        for cut in cuts {
            for s in &cut.function_selectors {
                table.retain(|(routed, _)| routed != s);
                if cut.action != CutAction::Remove {
                    table.push((*s, cut.facet_address));
                }
            }
        }
        let mut facets: Vec<FacetRegistration> = Vec::new();
        for (s, a) in table {
            match facets.iter_mut().find(|f| f.facet_address == a) {
                Some(f) => f.function_selectors.push(s),
                None => facets.push(FacetRegistration {
                    facet_address: a,
                    function_selectors: vec![s],
                }),
            }
        }
        RoutingSnapshot::new(facets)
    }

    #[test]
    fn replanning_after_apply_is_in_sync() {
        let mut m = manifest(vec![
            facet("A", Some(0xa1), Some(0xa2), &["two", "three", "four"]),
            facet("B", None, Some(0xb1), &["ten"]),
        ]);
        m.remove = vec![FacetRemoval {
            name: "Old".to_string(),
            selectors: sels(&["gone"]),
            abi: None,
        }];
        let r = routing(&[(0xa1, &["one", "two", "three"]), (0xe0, &["gone"])]);

        let cuts = plan_cuts(&m, &r).expect("plan");
        assert_eq!(cuts.len(), 5);

        let after = applied(&r, &cuts);
        assert!(after.selectors_for(addr(0xa1)).is_empty());
        assert!(after.selectors_for(addr(0xe0)).is_empty());
        assert_eq!(after.selectors_for(addr(0xa2)), sels(&["two", "three", "four"]));
        assert_eq!(after.selectors_for(addr(0xb1)), sels(&["ten"]));

        m.remove.clear();
        for f in &mut m.facets {
            f.previous_address = f.new_address.take();
        }
        assert_eq!(plan_cuts(&m, &after).expect("replan"), vec![]);
    }

    #[test]
    fn removals_come_first_and_use_null_address() {
        let mut m = manifest(vec![facet("B", None, Some(0xb1), &["ten"])]);
        m.remove = vec![
            FacetRemoval {
                name: "TimeLockFacet".to_string(),
                selectors: vec![],
                abi: Some(abi(&["lock", "unlock", "lock"])),
            },
            FacetRemoval {
                name: "Empty".to_string(),
                selectors: vec![],
                abi: None,
            },
        ];
        let r = routing(&[(0xe0, &["lock", "unlock"])]);

        let plan = Planner::new()
            .plan(&PlanContext::default(), &m, &r, tool())
            .expect("plan");
        assert_eq!(plan.cuts.len(), 2);
        assert_eq!(plan.cuts[0], FacetCut::remove("TimeLockFacet", sels(&["lock", "unlock"])));
        assert!(plan.cuts[0].facet_address.is_zero());
        assert_eq!(plan.cuts[1].action, CutAction::Add);
        assert_eq!(plan.facets[1].status, FacetStatus::Removed);
        assert_eq!(plan.facets[1].removed, 0);
    }

    #[test]
    fn routing_failure_is_distinct_from_no_registration() {
        let m = manifest(vec![facet("A", Some(0xa0), Some(0xa1), &["x"])]);
        let err = plan_cuts(&m, &FailingRouting).expect_err("lookup fails");
        match err {
            PlanError::RoutingLookup {
                facet,
                address,
                message,
            } => {
                assert_eq!(facet, "A");
                assert_eq!(address, addr(0xa0));
                assert!(message.contains("rpc timeout"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn previous_address_without_selectors_plans_an_add() {
        let m = manifest(vec![facet("A", Some(0xa0), Some(0xa1), &["x"])]);
        let cuts = plan_cuts(&m, &RoutingSnapshot::default()).expect("plan");
        assert_eq!(cuts, vec![FacetCut::add("A", addr(0xa1), sels(&["x"]))]);
    }

    #[test]
    fn selector_declared_by_two_facets_is_a_collision() {
        let m = manifest(vec![
            facet("A", None, Some(0xa1), &["shared"]),
            facet("B", None, Some(0xb1), &["shared"]),
        ]);
        let err = plan_cuts(&m, &RoutingSnapshot::default()).expect_err("collision");
        match err {
            PlanError::SelectorCollision { first, second, .. } => {
                assert_eq!(first, "A::shared()");
                assert_eq!(second, "B::shared()");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn add_of_selector_routed_elsewhere_is_a_collision() {
        let m = manifest(vec![facet("B", None, Some(0xb1), &["owner"])]);
        let r = routing(&[(0xaa, &["owner"])]);
        let err = plan_cuts(&m, &r).expect_err("collision");
        assert_eq!(err.code(), "selector_collision");
        assert!(err.to_string().contains("B::owner()"));
    }

    #[test]
    fn moving_a_selector_between_facets_conflicts() {
        let m = manifest(vec![
            facet("A", Some(0xa0), Some(0xa1), &["keep"]),
            facet("B", None, Some(0xb1), &["moved"]),
        ]);
        let r = routing(&[(0xa0, &["keep", "moved"])]);
        let err = plan_cuts(&m, &r).expect_err("conflict");
        match err {
            PlanError::ConflictingCut { first, second, .. } => {
                assert_eq!(first, "remove A");
                assert_eq!(second, "add B");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ambiguous_registrations_are_rejected() {
        let dup = manifest(vec![
            facet("A", None, Some(0xa1), &["x"]),
            facet("A", None, Some(0xa2), &["y"]),
        ]);
        assert_eq!(
            plan_cuts(&dup, &RoutingSnapshot::default()).unwrap_err().code(),
            "ambiguous_registration"
        );

        let same = manifest(vec![facet("A", Some(0xa1), Some(0xa1), &["x"])]);
        assert!(matches!(
            plan_cuts(&same, &RoutingSnapshot::default()),
            Err(PlanError::AmbiguousRegistration { .. })
        ));

        let shared_prev = manifest(vec![
            facet("A", Some(0xa0), Some(0xa1), &["x"]),
            facet("B", Some(0xa0), Some(0xb1), &["y"]),
        ]);
        assert!(matches!(
            plan_cuts(&shared_prev, &RoutingSnapshot::default()),
            Err(PlanError::AmbiguousRegistration { .. })
        ));

        let mut both = manifest(vec![facet("A", None, Some(0xa1), &["x"])]);
        both.remove.push(FacetRemoval {
            name: "A".to_string(),
            selectors: sels(&["x"]),
            abi: None,
        });
        assert!(matches!(
            plan_cuts(&both, &RoutingSnapshot::default()),
            Err(PlanError::AmbiguousRegistration { .. })
        ));
    }

    #[test]
    fn malformed_fragment_names_the_facet() {
        let mut bad = facet("Vault", None, Some(0xa1), &[]);
        bad.abi = Abi::new(vec![AbiFragment::function(
            "deposit",
            vec![diamondcut_types::AbiParam::new("d", "tuple")],
        )]);
        let err = plan_cuts(&manifest(vec![bad]), &RoutingSnapshot::default()).unwrap_err();
        assert_eq!(err.facet(), Some("Vault"));
    }

    #[test]
    fn caps_reject_oversized_plans() {
        let m = manifest(vec![facet("A", Some(0xa0), Some(0xa1), &["two", "three", "four"])]);
        let r = routing(&[(0xa0, &["one", "two", "three"])]);

        let ctx = PlanContext {
            config: PlannerConfig {
                max_cuts: Some(2),
                ..Default::default()
            },
        };
        let err = Planner::new().plan(&ctx, &m, &r, tool()).unwrap_err();
        assert_eq!(
            err,
            PlanError::CapsExceeded {
                message: "max_cuts 3 > 2 allowed".to_string()
            }
        );

        let ctx = PlanContext {
            config: PlannerConfig {
                max_selectors: Some(3),
                ..Default::default()
            },
        };
        assert!(Planner::new().plan(&ctx, &m, &r, tool()).is_err());
    }

    #[test]
    fn plan_id_is_deterministic_and_input_sensitive() {
        let m = manifest(vec![facet("B", None, Some(0xb1), &["ten"])]);
        let r = RoutingSnapshot::default();
        let a = Planner::new().plan(&PlanContext::default(), &m, &r, tool()).unwrap();
        let b = Planner::new().plan(&PlanContext::default(), &m, &r, tool()).unwrap();
        assert_eq!(a.plan_id, b.plan_id);
        assert_eq!(a.cuts, b.cuts);

        let ctx = PlanContext {
            config: PlannerConfig {
                init: InitCall {
                    target: addr(0x99),
                    calldata: vec![0xe1, 0xc7, 0x39, 0x2a],
                },
                ..Default::default()
            },
        };
        let c = Planner::new().plan(&ctx, &m, &r, tool()).unwrap();
        assert_ne!(a.plan_id, c.plan_id);
        assert_eq!(c.init.target, addr(0x99));
    }

    #[test]
    fn summary_counts_processed_facets() {
        let m = manifest(vec![
            facet("A", Some(0xa0), Some(0xa1), &["two", "three", "four"]),
            facet("B", None, Some(0xb1), &["ten"]),
            facet("C", Some(0xc0), None, &[]),
        ]);
        let r = routing(&[(0xa0, &["one", "two", "three"]), (0xc0, &["c"])]);
        let plan = Planner::new().plan(&PlanContext::default(), &m, &r, tool()).unwrap();
        assert_eq!(plan.summary.cuts_total, 4);
        assert_eq!(plan.summary.selectors_added, 2);
        assert_eq!(plan.summary.selectors_replaced, 2);
        assert_eq!(plan.summary.selectors_removed, 1);
        assert_eq!(plan.summary.facets_processed, 2);
        assert_eq!(plan.summary.facets_skipped, 1);
        assert_eq!(plan.processed_facets().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
