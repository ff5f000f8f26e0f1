//! Core plan and commit pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: every read and write goes through
//! the port traits.

use crate::ports::{AbiSource, ManifestSource, PlanSource, RoutingSource, WritePort};
use crate::settings::{CommitSettings, PlanSettings};
use crate::stored::StoredAbi;
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use diamondcut_calldata::{decode_diamond_cut, encode_diamond_cut};
use diamondcut_domain::{
    CommitError, CutReceipt, PlanContext, PlanError, Planner, PlannerConfig, collect_incoming,
    commit_merged_interface, validate_abi,
};
use diamondcut_render::{render_commit_md, render_plan_md};
use diamondcut_types::commit::{AbiRef, CommitRecord, CommitSummary, PlanRef};
use diamondcut_types::plan::{CutPlan, FacetStatus, ToolInfo};
use diamondcut_types::report::{
    CutReport, ReportArtifacts, ReportCounts, ReportFinding, ReportRunInfo, ReportSeverity,
    ReportStatus, ReportToolInfo, ReportVerdict,
};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Error type for pipeline results.  Exit code 2 = domain refusal, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("domain refusal: {0}")]
    Plan(#[from] PlanError),
    #[error("commit refused: {0}")]
    Commit(#[from] CommitError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Plan(_) | ToolError::Commit(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_plan`.
pub struct PlanOutcome {
    pub plan: CutPlan,
    pub report: CutReport,
    /// `0x`-prefixed `diamondCut` calldata; `None` when the table is in sync.
    pub calldata: Option<String>,
}

/// Run the plan pipeline. Returns the plan, report, and calldata.
///
/// The caller is responsible for writing artifacts to disk (via `WritePort`)
/// or the convenience `write_plan_artifacts` helper. On a domain refusal,
/// [`report_from_refusal`] builds the failing report.
pub fn run_plan(
    settings: &PlanSettings,
    manifest_port: &dyn ManifestSource,
    routing_port: &dyn RoutingSource,
    tool: ToolInfo,
) -> Result<PlanOutcome, ToolError> {
    let manifest = manifest_port.load_manifest()?;
    let routing = routing_port.load_routing()?;
    debug!(
        facets = manifest.facets.len(),
        removals = manifest.remove.len(),
        registrations = routing.facets.len(),
        "loaded plan inputs"
    );

    let ctx = PlanContext {
        config: PlannerConfig {
            max_cuts: settings.max_cuts,
            max_selectors: settings.max_selectors,
            init: settings.init.clone(),
        },
    };
    let plan = Planner::new().plan(&ctx, &manifest, &routing, tool.clone())?;

    let calldata = if plan.is_in_sync() {
        None
    } else {
        Some(encode_verified(&plan)?)
    };
    let report = report_from_plan(&plan, tool);

    Ok(PlanOutcome {
        plan,
        report,
        calldata,
    })
}

/// Encode the plan's `diamondCut` call and check it decodes back to the same cuts.
fn encode_verified(plan: &CutPlan) -> anyhow::Result<String> {
    let bytes = encode_diamond_cut(&plan.cuts, &plan.init);
    let decoded = decode_diamond_cut(&bytes).context("decode encoded diamondCut calldata")?;
    let same_cuts = decoded.cuts.len() == plan.cuts.len()
        && decoded.cuts.iter().zip(&plan.cuts).all(|(d, p)| {
            d.facet_address == p.facet_address
                && d.action == p.action
                && d.function_selectors == p.function_selectors
        });
    if !same_cuts || decoded.init != plan.init {
        anyhow::bail!(
            "encoded calldata does not decode back to plan {}",
            plan.plan_id
        );
    }
    Ok(format!("0x{}", hex::encode(bytes)))
}

/// Write all plan artifacts to the output directory.
pub fn write_plan_artifacts(
    outcome: &PlanOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let plan_json = serde_json::to_string_pretty(&outcome.plan).context("serialize plan")?;
    writer.write_file(&out_dir.join("plan.json"), plan_json.as_bytes())?;

    let plan_md = render_plan_md(&outcome.plan);
    writer.write_file(&out_dir.join("plan.md"), plan_md.as_bytes())?;

    if let Some(calldata) = &outcome.calldata {
        writer.write_file(
            &out_dir.join("calldata.hex"),
            format!("{}\n", calldata).as_bytes(),
        )?;
    }

    write_report(&outcome.report, out_dir, writer)
}

/// Write `report.json` to the output directory.
pub fn write_report(
    report: &CutReport,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    let report_json = serde_json::to_string_pretty(report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())
}

/// Outcome of `run_commit`.
pub struct CommitOutcome {
    pub record: CommitRecord,
    pub merged: StoredAbi,
    pub report: CutReport,
}

/// Run the commit pipeline: fold the interfaces of the facets a confirmed
/// plan processed into the stored ABI.
pub fn run_commit(
    settings: &CommitSettings,
    plan_port: &dyn PlanSource,
    manifest_port: &dyn ManifestSource,
    abi_port: &dyn AbiSource,
    tool: ToolInfo,
) -> Result<CommitOutcome, ToolError> {
    let plan = plan_port.load_plan()?;
    let receipt = match settings.tx_hash.as_deref() {
        Some(tx_hash) => CutReceipt::confirmed(&plan, tx_hash)?,
        None => CutReceipt::in_sync(&plan)?,
    };

    let manifest = manifest_port.load_manifest()?;
    let incoming = collect_incoming(&receipt, &manifest)?;
    validate_abi(&incoming)?;

    let stored = abi_port.load_abi()?;
    let sha256_before = match &stored {
        Some(doc) => Some(sha256_hex(doc.to_json_pretty()?.as_bytes())),
        None => None,
    };
    let base = stored.unwrap_or_default();

    let merged_abi = commit_merged_interface(&receipt, base.abi(), &incoming, settings.equality);
    let merged = base.with_abi(merged_abi);
    let merged_json = merged.to_json_pretty()?;

    let mut record = CommitRecord::new(
        tool.clone(),
        PlanRef {
            plan_id: receipt.plan_id().to_string(),
            path: Some(settings.plan_path().to_string()),
        },
        AbiRef {
            path: settings.abi_target().to_string(),
            sha256_before,
            sha256_after: Some(sha256_hex(merged_json.as_bytes())),
        },
    );
    record.tx_hash = receipt.tx_hash().map(str::to_string);
    record.summary = CommitSummary {
        fragments_before: base.abi().len() as u64,
        fragments_incoming: incoming.len() as u64,
        fragments_after: merged.abi().len() as u64,
        facets_merged: receipt.facets().len() as u64,
    };

    info!(
        plan_id = %record.plan_ref.plan_id,
        facets = record.summary.facets_merged,
        appended = record.summary.fragments_appended(),
        "commit prepared"
    );

    let report = report_from_commit(&record, tool);
    Ok(CommitOutcome {
        record,
        merged,
        report,
    })
}

/// Write the merged ABI plus commit artifacts.
pub fn write_commit_artifacts(
    outcome: &CommitOutcome,
    settings: &CommitSettings,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    let abi_json = outcome.merged.to_json_pretty()?;
    writer.write_file(settings.abi_target(), abi_json.as_bytes())?;

    writer.create_dir_all(&settings.out_dir)?;
    let commit_json = serde_json::to_string_pretty(&outcome.record).context("serialize commit")?;
    writer.write_file(&settings.out_dir.join("commit.json"), commit_json.as_bytes())?;

    let commit_md = render_commit_md(&outcome.record);
    writer.write_file(&settings.out_dir.join("commit.md"), commit_md.as_bytes())?;

    write_report(&outcome.report, &settings.out_dir, writer)
}

// ── report helpers ───────────────────────────────────────────────────────

fn report_tool(tool: ToolInfo) -> ReportToolInfo {
    ReportToolInfo {
        name: tool.name,
        version: tool.version.unwrap_or_else(|| "unknown".to_string()),
        commit: tool.commit,
    }
}

fn run_info() -> ReportRunInfo {
    let now = Utc::now().to_rfc3339();
    ReportRunInfo {
        started_at: now.clone(),
        ended_at: Some(now),
        duration_ms: Some(0),
    }
}

pub fn report_from_plan(plan: &CutPlan, tool: ToolInfo) -> CutReport {
    let status = if plan.is_in_sync() {
        ReportStatus::Pass
    } else {
        ReportStatus::Warn
    };

    let mut findings: Vec<ReportFinding> = plan
        .cuts
        .iter()
        .map(|cut| ReportFinding {
            severity: ReportSeverity::Warn,
            code: format!("cut_{}", cut.action.as_str()),
            message: format!(
                "{} {} selector(s) at {}",
                cut.action.as_str(),
                cut.function_selectors.len(),
                cut.facet_address
            ),
            facet: cut.facet.clone(),
            data: Some(serde_json::json!({
                "selectors": cut.function_selectors,
            })),
        })
        .collect();
    findings.extend(
        plan.facets
            .iter()
            .filter(|f| f.status == FacetStatus::Unchanged)
            .map(|f| ReportFinding {
                severity: ReportSeverity::Info,
                code: "facet_unchanged".to_string(),
                message: format!("{} was not redeployed", f.name),
                facet: Some(f.name.clone()),
                data: None,
            }),
    );

    let warn = plan.cuts.len() as u64;
    let info = findings.len() as u64 - warn;

    CutReport {
        schema: diamondcut_types::schema::DIAMONDCUT_REPORT_V1.to_string(),
        tool: report_tool(tool),
        run: run_info(),
        verdict: ReportVerdict {
            status,
            counts: ReportCounts {
                info,
                warn,
                error: 0,
            },
            reasons: if plan.is_in_sync() {
                vec![]
            } else {
                vec!["cuts_pending".to_string()]
            },
        },
        findings,
        artifacts: Some(ReportArtifacts {
            plan: Some("plan.json".to_string()),
            calldata: (!plan.is_in_sync()).then(|| "calldata.hex".to_string()),
            commit: None,
            abi: None,
        }),
        data: Some(serde_json::json!({
            "diamondcut": {
                "plan": {
                    "plan_id": plan.plan_id,
                    "in_sync": plan.is_in_sync(),
                    "cuts_total": plan.summary.cuts_total,
                    "selectors_added": plan.summary.selectors_added,
                    "selectors_replaced": plan.summary.selectors_replaced,
                    "selectors_removed": plan.summary.selectors_removed,
                    "facets_processed": plan.summary.facets_processed,
                    "facets_skipped": plan.summary.facets_skipped,
                }
            }
        })),
    }
}

/// Failing report for a plan the domain refused; nothing may be submitted.
pub fn report_from_refusal(err: &PlanError, tool: ToolInfo) -> CutReport {
    CutReport {
        schema: diamondcut_types::schema::DIAMONDCUT_REPORT_V1.to_string(),
        tool: report_tool(tool),
        run: run_info(),
        verdict: ReportVerdict {
            status: ReportStatus::Fail,
            counts: ReportCounts {
                info: 0,
                warn: 0,
                error: 1,
            },
            reasons: vec![err.code().to_string()],
        },
        findings: vec![ReportFinding {
            severity: ReportSeverity::Error,
            code: err.code().to_string(),
            message: err.to_string(),
            facet: err.facet().map(str::to_string),
            data: None,
        }],
        artifacts: None,
        data: Some(serde_json::json!({
            "diamondcut": {
                "plan": {
                    "refused": err.code(),
                }
            }
        })),
    }
}

pub fn report_from_commit(record: &CommitRecord, tool: ToolInfo) -> CutReport {
    CutReport {
        schema: diamondcut_types::schema::DIAMONDCUT_REPORT_V1.to_string(),
        tool: report_tool(tool),
        run: run_info(),
        verdict: ReportVerdict {
            status: ReportStatus::Pass,
            counts: ReportCounts {
                info: record.summary.fragments_appended(),
                warn: 0,
                error: 0,
            },
            reasons: vec![],
        },
        findings: vec![],
        artifacts: Some(ReportArtifacts {
            plan: Some("plan.json".to_string()),
            calldata: None,
            commit: Some("commit.json".to_string()),
            abi: Some(record.stored_abi.path.clone()),
        }),
        data: Some(serde_json::json!({
            "diamondcut": {
                "commit": {
                    "plan_id": record.plan_ref.plan_id,
                    "tx_hash": record.tx_hash,
                    "facets_merged": record.summary.facets_merged,
                    "fragments_before": record.summary.fragments_before,
                    "fragments_after": record.summary.fragments_after,
                    "fragments_appended": record.summary.fragments_appended(),
                }
            }
        })),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
