pub mod build;
pub mod completions;
pub mod show;
pub mod stats;
pub mod unused;
pub mod verify;

use std::path::{Path, PathBuf};

use assetdeps_core::config::{ProjectConfig, load_project_config};
use assetdeps_core::{
    AssetSource, ErrorCode, GraphIndex, LoadOutcome, ManifestSource, SummaryService,
};
use tracing::warn;

use crate::icons::KindTable;
use crate::output::{OutputMode, fail};

/// A project root together with its loaded config.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    /// Load `.assetdeps/config.toml` under `root`.
    ///
    /// # Errors
    ///
    /// Renders and returns a `ConfigParseError` if the config is malformed.
    pub fn open(root: &Path, output: OutputMode) -> anyhow::Result<Self> {
        let config =
            load_project_config(root).map_err(|err| fail(output, err.code(), err.to_string()))?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn cache_path(&self) -> PathBuf {
        self.config.cache_path(&self.root)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.config.manifest_path(&self.root)
    }

    /// The dependency manifest, when present and readable.
    pub fn manifest(&self) -> Option<ManifestSource> {
        let path = self.manifest_path();
        if !path.exists() {
            return None;
        }
        match ManifestSource::from_path(&path) {
            Ok(manifest) => Some(manifest),
            Err(err) => {
                warn!("manifest unreadable, folders inferred from the graph: {err:#}");
                None
            }
        }
    }

    /// Kind labels for `graph`, with folders taken from the manifest.
    pub fn kind_table(&self, graph: &GraphIndex) -> KindTable {
        let manifest = self.manifest();
        KindTable::new(graph, manifest.as_ref().map(|m| m as &dyn AssetSource))
    }

    /// Load the cached graph into a fresh service.
    ///
    /// # Errors
    ///
    /// Renders and returns `CacheMissing` when no cache exists, or the
    /// cache's own error code when it cannot be read.
    pub fn load_summary(&self, output: OutputMode) -> anyhow::Result<SummaryService> {
        let cache = self.cache_path();
        let mut service = SummaryService::new();
        match service.load(&cache) {
            Ok(LoadOutcome::Loaded | LoadOutcome::AlreadyLoaded) => Ok(service),
            Ok(LoadOutcome::Missing) => Err(fail(
                output,
                ErrorCode::CacheMissing,
                format!("no dependency cache at {}", cache.display()),
            )),
            Err(err) => Err(fail(output, err.code(), err.to_string())),
        }
    }
}
