//! Configuration file loading for diamondcut.
//!
//! Discovers and loads `diamondcut.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diamondcut_calldata::calldata_from_hex;
use diamondcut_core::EqualityMode;
use diamondcut_types::{Address, InitCall};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "diamondcut.toml";

pub const DEFAULT_MANIFEST: &str = "deploy/manifest.json";
pub const DEFAULT_ROUTING: &str = "deploy/routing.json";
pub const DEFAULT_STORED_ABI: &str = "deployments/Diamond.abi.json";
pub const DEFAULT_OUT_DIR: &str = "artifacts/diamondcut";

/// Top-level configuration from diamondcut.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiamondcutConfig {
    /// Reconciliation settings (equality mode, caps).
    pub reconcile: ReconcileConfig,

    /// Post-cut initializer.
    pub init: InitConfig,

    /// Input and output locations, relative to the project root.
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// How fragments are compared when merging ABIs.
    pub equality: Option<EqualityMode>,

    /// Maximum number of cut entries allowed in a plan.
    pub max_cuts: Option<u64>,

    /// Maximum number of selectors touched by a plan.
    pub max_selectors: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitConfig {
    pub target: Option<String>,
    pub calldata: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub manifest: Option<Utf8PathBuf>,
    pub routing: Option<Utf8PathBuf>,
    pub stored_abi: Option<Utf8PathBuf>,
    pub out_dir: Option<Utf8PathBuf>,
}

/// Discover the diamondcut.toml config file in the project root.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a diamondcut.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<DiamondcutConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<DiamondcutConfig> {
    let config: DiamondcutConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<DiamondcutConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(DiamondcutConfig::default()),
    }
}

/// Values given on the command line; `None` defers to the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub manifest: Option<Utf8PathBuf>,
    pub routing: Option<Utf8PathBuf>,
    pub stored_abi: Option<Utf8PathBuf>,
    pub out_dir: Option<Utf8PathBuf>,
    pub equality: Option<EqualityMode>,
    pub max_cuts: Option<u64>,
    pub max_selectors: Option<u64>,
    pub init_target: Option<String>,
    pub init_calldata: Option<String>,
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub manifest: Utf8PathBuf,
    pub routing: Utf8PathBuf,
    pub stored_abi: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub equality: EqualityMode,
    pub max_cuts: Option<u64>,
    pub max_selectors: Option<u64>,
    pub init: InitCall,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: DiamondcutConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: DiamondcutConfig) -> Self {
        Self { config }
    }

    /// Merge with CLI arguments.
    ///
    /// CLI paths are taken as given; config and default paths resolve
    /// against `root`. Scalar CLI values replace config values.
    pub fn merge(self, root: &Utf8Path, cli: &CliOverrides) -> anyhow::Result<MergedConfig> {
        let paths = &self.config.paths;
        let resolve = |cli: &Option<Utf8PathBuf>, file: &Option<Utf8PathBuf>, default: &str| {
            cli.clone()
                .unwrap_or_else(|| root.join(file.as_deref().unwrap_or(Utf8Path::new(default))))
        };

        let target = cli
            .init_target
            .as_deref()
            .or(self.config.init.target.as_deref());
        let calldata = cli
            .init_calldata
            .as_deref()
            .or(self.config.init.calldata.as_deref());
        let init = parse_init(target, calldata)?;

        Ok(MergedConfig {
            manifest: resolve(&cli.manifest, &paths.manifest, DEFAULT_MANIFEST),
            routing: resolve(&cli.routing, &paths.routing, DEFAULT_ROUTING),
            stored_abi: resolve(&cli.stored_abi, &paths.stored_abi, DEFAULT_STORED_ABI),
            out_dir: resolve(&cli.out_dir, &paths.out_dir, DEFAULT_OUT_DIR),
            equality: cli
                .equality
                .or(self.config.reconcile.equality)
                .unwrap_or_default(),
            max_cuts: cli.max_cuts.or(self.config.reconcile.max_cuts),
            max_selectors: cli.max_selectors.or(self.config.reconcile.max_selectors),
            init,
        })
    }
}

fn parse_init(target: Option<&str>, calldata: Option<&str>) -> anyhow::Result<InitCall> {
    let target = match target {
        Some(text) => text
            .parse::<Address>()
            .with_context(|| format!("invalid init target '{}'", text))?,
        None => Address::ZERO,
    };
    let calldata = match calldata {
        Some(text) => calldata_from_hex(text)
            .map_err(|e| anyhow::anyhow!("invalid init calldata: {}", e))?,
        None => Vec::new(),
    };
    if target.is_zero() && !calldata.is_empty() {
        anyhow::bail!("init calldata requires a non-zero init target");
    }
    Ok(InitCall { target, calldata })
}
