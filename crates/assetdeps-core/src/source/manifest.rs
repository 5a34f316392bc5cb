//! [`AssetSource`] backed by a JSON dependency manifest.
//!
//! The manifest is an export of the project database:
//!
//! ```json
//! {
//!   "folders": ["Assets", "Assets/Materials"],
//!   "assets": {
//!     "Assets/Materials/Wood.mat": ["Assets/Textures/Wood.png"],
//!     "Assets/Textures/Wood.png": []
//!   }
//! }
//! ```
//!
//! Paths use `/` separators. Dependency targets do not need an entry of
//! their own; the builder mints dummy records for them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{AssetSource, SourceError};

/// In-memory dependency manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSource {
    #[serde(default)]
    folders: BTreeSet<String>,
    #[serde(default)]
    assets: BTreeMap<String, Vec<String>>,
}

impl ManifestSource {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// manifest.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }

    /// Parse a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text is not a valid manifest.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add (or replace) an asset and its direct dependencies.
    #[must_use]
    pub fn with_asset<I, S>(mut self, path: &str, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets
            .insert(path.to_owned(), deps.into_iter().map(Into::into).collect());
        self
    }

    /// Register a folder path.
    #[must_use]
    pub fn with_folder(mut self, path: &str) -> Self {
        self.folders.insert(path.to_owned());
        self
    }

    /// Number of assets with a dependency entry.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    fn under_root<'a>(
        root: &'a str,
        paths: impl Iterator<Item = &'a String> + 'a,
    ) -> impl Iterator<Item = &'a String> + 'a {
        paths.filter(move |p| is_under(p, root))
    }
}

fn is_under(path: &str, root: &str) -> bool {
    path.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

impl AssetSource for ManifestSource {
    fn enumerate_assets(&self, roots: &[String]) -> Result<Vec<String>, SourceError> {
        let mut found: BTreeSet<&String> = BTreeSet::new();
        for root in roots {
            let prefix = root.trim_end_matches('/');
            let mut matched = 0usize;
            for path in Self::under_root(prefix, self.folders.iter())
                .chain(Self::under_root(prefix, self.assets.keys()))
            {
                matched += 1;
                found.insert(path);
            }
            if matched == 0 {
                return Err(SourceError::UnreachableRoot(root.clone()));
            }
        }
        Ok(found.into_iter().cloned().collect())
    }

    fn is_folder(&self, path: &str) -> bool {
        self.folders.contains(path)
    }

    fn direct_dependencies(&self, path: &str) -> Result<Vec<String>, SourceError> {
        if let Some(deps) = self.assets.get(path) {
            return Ok(deps.clone());
        }
        if self.folders.contains(path) {
            return Ok(Vec::new());
        }
        Err(SourceError::UnknownAsset(path.to_owned()))
    }
}
