//! Port traits abstracting all I/O away from the pipeline.

use crate::stored::StoredAbi;
use camino::Utf8Path;
use diamondcut_types::manifest::DeploymentManifest;
use diamondcut_types::plan::CutPlan;
use diamondcut_types::routing::RoutingSnapshot;

/// Source of the deployment manifest.
pub trait ManifestSource {
    fn load_manifest(&self) -> anyhow::Result<DeploymentManifest>;
}

/// Source of the diamond's current routing table (loupe `facets()` output).
pub trait RoutingSource {
    fn load_routing(&self) -> anyhow::Result<RoutingSnapshot>;
}

/// Source of the stored canonical ABI. `None` means nothing is stored yet.
pub trait AbiSource {
    fn load_abi(&self) -> anyhow::Result<Option<StoredAbi>>;
}

/// Source of a plan written by an earlier `plan` run.
pub trait PlanSource {
    fn load_plan(&self) -> anyhow::Result<CutPlan>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
