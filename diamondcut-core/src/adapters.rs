//! Default filesystem-backed and in-memory port implementations.

use crate::ports::{AbiSource, ManifestSource, PlanSource, RoutingSource, WritePort};
use crate::stored::StoredAbi;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diamondcut_types::manifest::DeploymentManifest;
use diamondcut_types::plan::CutPlan;
use diamondcut_types::routing::{FacetRegistration, RoutingSnapshot};
use fs_err as fs;
use serde::de::DeserializeOwned;
use tracing::debug;

fn read_json<T: DeserializeOwned>(path: &Utf8Path, what: &str) -> anyhow::Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("read {} {}", what, path))?;
    serde_json::from_str(&text).with_context(|| format!("parse {} {}", what, path))
}

/// Loads a [`DeploymentManifest`] from a JSON file.
#[derive(Debug, Clone)]
pub struct FsManifestSource {
    pub path: Utf8PathBuf,
}

impl FsManifestSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl ManifestSource for FsManifestSource {
    fn load_manifest(&self) -> anyhow::Result<DeploymentManifest> {
        read_json(&self.path, "manifest")
    }
}

/// Loads a routing snapshot from a JSON file.
///
/// Accepts either `{"facets": [...]}` or the bare loupe `facets()` array.
#[derive(Debug, Clone)]
pub struct FsRoutingSource {
    pub path: Utf8PathBuf,
}

impl FsRoutingSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl RoutingSource for FsRoutingSource {
    fn load_routing(&self) -> anyhow::Result<RoutingSnapshot> {
        let value: serde_json::Value = read_json(&self.path, "routing snapshot")?;
        let snapshot = if value.is_array() {
            let facets: Vec<FacetRegistration> = serde_json::from_value(value)
                .with_context(|| format!("decode loupe facets in {}", self.path))?;
            RoutingSnapshot::new(facets)
        } else {
            serde_json::from_value(value)
                .with_context(|| format!("decode routing snapshot {}", self.path))?
        };
        debug!(
            path = %self.path,
            facets = snapshot.facets.len(),
            "loaded routing snapshot"
        );
        Ok(snapshot)
    }
}

/// Loads the stored ABI; a missing file means nothing is stored yet.
#[derive(Debug, Clone)]
pub struct FsAbiSource {
    pub path: Utf8PathBuf,
}

impl FsAbiSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl AbiSource for FsAbiSource {
    fn load_abi(&self) -> anyhow::Result<Option<StoredAbi>> {
        if !self.path.exists() {
            debug!(path = %self.path, "no stored ABI yet");
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("read stored ABI {}", self.path))?;
        StoredAbi::parse(&text)
            .with_context(|| format!("parse stored ABI {}", self.path))
            .map(Some)
    }
}

/// Loads `plan.json` written by the plan pipeline.
#[derive(Debug, Clone)]
pub struct FsPlanSource {
    pub path: Utf8PathBuf,
}

impl FsPlanSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl PlanSource for FsPlanSource {
    fn load_plan(&self) -> anyhow::Result<CutPlan> {
        let plan: CutPlan = read_json(&self.path, "plan")?;
        if plan.schema != diamondcut_types::schema::DIAMONDCUT_PLAN_V1 {
            anyhow::bail!(
                "unsupported plan schema '{}' in {}",
                plan.schema,
                self.path
            );
        }
        Ok(plan)
    }
}

/// In-memory manifest for embedding and testing.
#[derive(Debug, Clone)]
pub struct InMemoryManifestSource(pub DeploymentManifest);

impl ManifestSource for InMemoryManifestSource {
    fn load_manifest(&self) -> anyhow::Result<DeploymentManifest> {
        Ok(self.0.clone())
    }
}

/// In-memory routing snapshot for embedding and testing.
#[derive(Debug, Clone)]
pub struct InMemoryRoutingSource(pub RoutingSnapshot);

impl RoutingSource for InMemoryRoutingSource {
    fn load_routing(&self) -> anyhow::Result<RoutingSnapshot> {
        Ok(self.0.clone())
    }
}

/// In-memory stored ABI for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAbiSource(pub Option<StoredAbi>);

impl AbiSource for InMemoryAbiSource {
    fn load_abi(&self) -> anyhow::Result<Option<StoredAbi>> {
        Ok(self.0.clone())
    }
}

/// In-memory plan for embedding and testing.
#[derive(Debug, Clone)]
pub struct InMemoryPlanSource(pub CutPlan);

impl PlanSource for InMemoryPlanSource {
    fn load_plan(&self) -> anyhow::Result<CutPlan> {
        Ok(self.0.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
