//! Cache file writer.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::cache::encode_graph;
use crate::graph::GraphIndex;

/// Statistics returned after writing a cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Records written.
    pub asset_count: usize,
    /// `uses` edges written.
    pub edge_count: usize,
    /// Final cache file size in bytes.
    pub file_size_bytes: u64,
}

/// Writes a [`GraphIndex`] to the on-disk cache format.
#[derive(Debug, Clone, Copy)]
pub struct CacheWriter<'g> {
    graph: &'g GraphIndex,
}

impl<'g> CacheWriter<'g> {
    #[must_use]
    pub const fn new(graph: &'g GraphIndex) -> Self {
        Self { graph }
    }

    /// Encode the graph and write it to `path`, replacing any existing file.
    ///
    /// Parent directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or file I/O fails.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn write_to_file(&self, path: &Path) -> Result<CacheStats> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create cache dir {}", parent.display()))?;
        }

        let bytes = encode_graph(self.graph).context("encode dependency cache")?;
        fs::write(path, &bytes).with_context(|| format!("write cache file {}", path.display()))?;

        let stats = CacheStats {
            asset_count: self.graph.len(),
            edge_count: self.graph.edge_count(),
            file_size_bytes: bytes.len() as u64,
        };
        debug!(?stats, "wrote dependency cache");
        Ok(stats)
    }
}
