mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger, MergedConfig};
use diamondcut_core::adapters::{
    FsAbiSource, FsManifestSource, FsPlanSource, FsRoutingSource, FsWritePort,
};
use diamondcut_core::pipeline::{
    ToolError, report_from_refusal, run_commit, run_plan, write_commit_artifacts,
    write_plan_artifacts, write_report,
};
use diamondcut_core::ports::PlanSource;
use diamondcut_core::settings::{CommitSettings, PlanSettings};
use diamondcut_core::{EqualityMode, StoredAbi};
use diamondcut_domain::{merge, selector_table, validate_abi};
use diamondcut_types::plan::ToolInfo;
use fs_err as fs;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "diamondcut",
    version,
    about = "Selector-level reconciler for diamond (EIP-2535) proxy upgrades."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile the deployment manifest against the routing table into a cut plan.
    Plan(PlanArgs),
    /// Fold the interfaces of a confirmed plan's facets into the stored ABI.
    Commit(CommitArgs),
    /// Print `selector  signature` for every function in an ABI file.
    Selectors(SelectorsArgs),
    /// Print the merge of two ABI files (base fragments first).
    MergeAbi(MergeAbiArgs),
    /// Print the diamondCut calldata for an existing plan.
    Encode(EncodeArgs),
}

#[derive(Debug, Parser)]
struct RootArgs {
    /// Project root holding diamondcut.toml (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Deployment manifest (default: <root>/deploy/manifest.json).
    #[arg(long)]
    manifest: Option<Utf8PathBuf>,

    /// Output directory for artifacts (default: <root>/artifacts/diamondcut).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct PlanArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Routing snapshot: loupe facets() output (default: <root>/deploy/routing.json).
    #[arg(long)]
    routing: Option<Utf8PathBuf>,

    /// Maximum number of cut entries allowed in the plan.
    #[arg(long)]
    max_cuts: Option<u64>,

    /// Maximum number of selectors the plan may touch.
    #[arg(long)]
    max_selectors: Option<u64>,

    /// Initializer delegate-called after the cut.
    #[arg(long)]
    init_target: Option<String>,

    /// Hex calldata for the initializer.
    #[arg(long)]
    init_calldata: Option<String>,
}

#[derive(Debug, Parser)]
struct CommitArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Hash of the confirmed diamondCut transaction (omit only for in-sync plans).
    #[arg(long)]
    tx_hash: Option<String>,

    /// Stored canonical ABI (default: <root>/deployments/Diamond.abi.json).
    #[arg(long)]
    stored_abi: Option<Utf8PathBuf>,

    /// Write the merged ABI here instead of overwriting the stored ABI.
    #[arg(long)]
    out: Option<Utf8PathBuf>,

    /// Fragment equality used when merging (strict, shape).
    #[arg(long)]
    equality: Option<EqualityMode>,
}

#[derive(Debug, Parser)]
struct SelectorsArgs {
    /// ABI file: a fragment array or a deployment record with an `abi` field.
    abi: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct MergeAbiArgs {
    base: Utf8PathBuf,
    incoming: Utf8PathBuf,

    /// Fragment equality (strict, shape).
    #[arg(long, default_value = "strict")]
    equality: EqualityMode,
}

#[derive(Debug, Parser)]
struct EncodeArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Plan file (default: <out-dir>/plan.json).
    #[arg(long)]
    plan: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn real_main() -> Result<(), ToolError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Commit(args) => cmd_commit(args),
        Command::Selectors(args) => cmd_selectors(args),
        Command::MergeAbi(args) => cmd_merge_abi(args),
        Command::Encode(args) => cmd_encode(args),
    }
}

fn merged_config(root: &RootArgs, mut cli: CliOverrides) -> anyhow::Result<MergedConfig> {
    cli.manifest = root.manifest.clone();
    cli.out_dir = root.out_dir.clone();
    let file_config =
        config::load_or_default(&root.root).context("load diamondcut.toml config")?;
    ConfigMerger::new(file_config).merge(&root.root, &cli)
}

fn cmd_plan(args: PlanArgs) -> Result<(), ToolError> {
    let merged = merged_config(
        &args.root,
        CliOverrides {
            routing: args.routing,
            max_cuts: args.max_cuts,
            max_selectors: args.max_selectors,
            init_target: args.init_target,
            init_calldata: args.init_calldata,
            ..Default::default()
        },
    )?;

    let settings = PlanSettings {
        out_dir: merged.out_dir.clone(),
        max_cuts: merged.max_cuts,
        max_selectors: merged.max_selectors,
        init: merged.init.clone(),
    };
    let manifest = FsManifestSource::new(merged.manifest.clone());
    let routing = FsRoutingSource::new(merged.routing.clone());

    let outcome = match run_plan(&settings, &manifest, &routing, tool_info()) {
        Ok(outcome) => outcome,
        Err(ToolError::Plan(err)) => {
            let report = report_from_refusal(&err, tool_info());
            write_report(&report, &settings.out_dir, &FsWritePort)?;
            return Err(ToolError::Plan(err));
        }
        Err(other) => return Err(other),
    };

    write_plan_artifacts(&outcome, &settings.out_dir, &FsWritePort)?;

    if outcome.plan.is_in_sync() {
        info!("routing table in sync; nothing to cut");
        println!("in sync: no cuts needed");
    } else {
        println!(
            "{} cut(s) planned (add {}, replace {}, remove {}); calldata in {}",
            outcome.plan.summary.cuts_total,
            outcome.plan.summary.selectors_added,
            outcome.plan.summary.selectors_replaced,
            outcome.plan.summary.selectors_removed,
            settings.out_dir.join("calldata.hex")
        );
    }
    info!("wrote plan artifacts to {}", settings.out_dir);
    Ok(())
}

fn cmd_commit(args: CommitArgs) -> Result<(), ToolError> {
    let merged = merged_config(
        &args.root,
        CliOverrides {
            stored_abi: args.stored_abi,
            equality: args.equality,
            ..Default::default()
        },
    )?;

    let settings = CommitSettings {
        out_dir: merged.out_dir.clone(),
        stored_abi: merged.stored_abi.clone(),
        abi_out: args.out,
        tx_hash: args.tx_hash,
        equality: merged.equality,
    };
    let outcome = run_commit(
        &settings,
        &FsPlanSource::new(settings.plan_path()),
        &FsManifestSource::new(merged.manifest.clone()),
        &FsAbiSource::new(merged.stored_abi.clone()),
        tool_info(),
    )?;
    write_commit_artifacts(&outcome, &settings, &FsWritePort)?;

    println!(
        "committed plan {}: {} fragment(s) appended to {}",
        outcome.record.plan_ref.plan_id,
        outcome.record.summary.fragments_appended(),
        settings.abi_target()
    );
    Ok(())
}

fn read_abi(path: &Utf8Path) -> anyhow::Result<StoredAbi> {
    let text = fs::read_to_string(path).with_context(|| format!("read ABI {}", path))?;
    StoredAbi::parse(&text).with_context(|| format!("parse ABI {}", path))
}

fn cmd_selectors(args: SelectorsArgs) -> Result<(), ToolError> {
    let abi = read_abi(&args.abi)?.into_abi();
    validate_abi(&abi)?;
    for entry in selector_table(&abi)? {
        println!("{}  {}", entry.selector, entry.signature);
    }
    Ok(())
}

fn cmd_merge_abi(args: MergeAbiArgs) -> Result<(), ToolError> {
    let base = read_abi(&args.base)?;
    let incoming = read_abi(&args.incoming)?.into_abi();
    validate_abi(base.abi())?;
    validate_abi(&incoming)?;

    let merged = base.with_abi(merge(base.abi(), &incoming, args.equality));
    print!("{}", merged.to_json_pretty()?);
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> Result<(), ToolError> {
    let plan_path = match args.plan {
        Some(path) => path,
        None => {
            let merged = merged_config(&args.root, CliOverrides::default())?;
            merged.out_dir.join("plan.json")
        }
    };
    let plan = FsPlanSource::new(plan_path).load_plan()?;
    if plan.is_in_sync() {
        info!(plan_id = %plan.plan_id, "plan is in sync; nothing to encode");
        return Ok(());
    }
    println!(
        "{}",
        diamondcut_calldata::calldata_hex(&plan.cuts, &plan.init)
    );
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "diamondcut".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        commit: None,
    }
}
