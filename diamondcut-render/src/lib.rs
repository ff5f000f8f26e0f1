//! Rendering helpers (markdown) for human-readable artifacts.

use diamondcut_types::commit::CommitRecord;
use diamondcut_types::plan::{CutPlan, FacetStatus};
use diamondcut_types::{CutAction, FacetCut};

pub fn render_plan_md(plan: &CutPlan) -> String {
    let mut out = String::new();
    out.push_str("# diamondcut plan\n\n");
    out.push_str(&format!("- Plan: `{}`\n", plan.plan_id));
    if let Some(diamond) = plan.diamond {
        out.push_str(&format!("- Diamond: `{}`\n", diamond));
    }
    out.push_str(&format!(
        "- Cuts: {} (add {}, replace {}, remove {} selectors)\n",
        plan.summary.cuts_total,
        plan.summary.selectors_added,
        plan.summary.selectors_replaced,
        plan.summary.selectors_removed
    ));
    out.push_str(&format!(
        "- Facets: {} processed, {} unchanged\n",
        plan.summary.facets_processed, plan.summary.facets_skipped
    ));
    if !plan.init.is_empty() {
        out.push_str(&format!(
            "- Init: `{}` with {} byte(s) of calldata\n",
            plan.init.target,
            plan.init.calldata.len()
        ));
    }
    out.push('\n');

    if !plan.facets.is_empty() {
        out.push_str("## Facets\n\n");
        out.push_str("| Facet | Status | Removed | Replaced | Added |\n");
        out.push_str("|---|---|---:|---:|---:|\n");
        for f in &plan.facets {
            out.push_str(&format!(
                "| {} | `{}` | {} | {} | {} |\n",
                f.name,
                status_label(f.status),
                f.removed,
                f.replaced,
                f.added
            ));
        }
        out.push('\n');
    }

    out.push_str("## Cuts\n\n");
    if plan.cuts.is_empty() {
        out.push_str("_Routing table already in sync; nothing to submit._\n");
        return out;
    }

    for (i, cut) in plan.cuts.iter().enumerate() {
        render_cut(&mut out, i + 1, cut);
    }

    out
}

fn render_cut(out: &mut String, n: usize, cut: &FacetCut) {
    out.push_str(&format!(
        "### {}. {} {}\n\n",
        n,
        action_label(cut.action),
        cut.facet.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("- Facet address: `{}`\n", cut.facet_address));
    out.push_str(&format!("- Selectors ({}):", cut.function_selectors.len()));
    for s in &cut.function_selectors {
        out.push_str(&format!(" `{}`", s));
    }
    out.push_str("\n\n");
}

pub fn render_commit_md(record: &CommitRecord) -> String {
    let mut out = String::new();
    out.push_str("# diamondcut commit\n\n");
    out.push_str(&format!("- Plan: `{}`\n", record.plan_ref.plan_id));
    match &record.tx_hash {
        Some(tx) => out.push_str(&format!("- Transaction: `{}`\n", tx)),
        None => out.push_str("- Transaction: none (plan was already in sync)\n"),
    }
    out.push_str(&format!("- Stored ABI: `{}`\n", record.stored_abi.path));
    let before = record.stored_abi.sha256_before.as_deref().unwrap_or("-");
    let after = record.stored_abi.sha256_after.as_deref().unwrap_or("-");
    out.push_str(&format!("- sha256: {} → {}\n\n", before, after));

    out.push_str("## Summary\n\n");
    out.push_str(&format!(
        "- Facets merged: {}\n- Fragments: {} before, {} incoming, {} after ({} appended)\n",
        record.summary.facets_merged,
        record.summary.fragments_before,
        record.summary.fragments_incoming,
        record.summary.fragments_after,
        record.summary.fragments_appended()
    ));

    out
}

fn action_label(a: CutAction) -> &'static str {
    match a {
        CutAction::Add => "Add",
        CutAction::Replace => "Replace",
        CutAction::Remove => "Remove",
    }
}

fn status_label(s: FacetStatus) -> &'static str {
    match s {
        FacetStatus::Removed => "removed",
        FacetStatus::Added => "added",
        FacetStatus::Reconciled => "reconciled",
        FacetStatus::Unchanged => "unchanged",
    }
}
