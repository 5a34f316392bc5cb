//! Bidirectional path ↔ [`AssetId`] interning.
//!
//! Identifiers are handed out sequentially, so the table is always dense
//! (`0..len`) and its order is the order in which paths were first seen.
//! Interning takes `&mut self`: the discovery phase that mints ids is
//! single-threaded by construction.

use std::collections::HashMap;

use crate::graph::AssetId;

/// Dense interner for asset paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathInterner {
    paths: Vec<String>,
    ids: HashMap<String, AssetId>,
}

/// A persisted path table contained the same path twice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("path {path:?} appears at both index {first} and index {second}")]
pub struct DuplicatePath {
    pub path: String,
    pub first: usize,
    pub second: usize,
}

impl PathInterner {
    /// Create an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty interner with room for `capacity` paths.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            paths: Vec::with_capacity(capacity),
            ids: HashMap::with_capacity(capacity),
        }
    }

    /// Rebuild an interner from a path table, keeping every path's index as
    /// its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicatePath`] if two entries are equal; such a table
    /// cannot be a bijection.
    pub fn from_paths(paths: Vec<String>) -> Result<Self, DuplicatePath> {
        let mut ids = HashMap::with_capacity(paths.len());
        for (index, path) in paths.iter().enumerate() {
            if let Some(previous) = ids.insert(path.clone(), AssetId::from_index(index)) {
                return Err(DuplicatePath {
                    path: path.clone(),
                    first: previous.index(),
                    second: index,
                });
            }
        }
        Ok(Self { paths, ids })
    }

    /// Return the identifier for `path`, minting the next one if unseen.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` distinct paths are interned.
    pub fn intern(&mut self, path: &str) -> AssetId {
        if let Some(&id) = self.ids.get(path) {
            return id;
        }
        let id = AssetId::from_index(self.paths.len());
        self.paths.push(path.to_owned());
        self.ids.insert(path.to_owned(), id);
        id
    }

    /// Look up an already-interned path without mutating the table.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<AssetId> {
        self.ids.get(path).copied()
    }

    /// Resolve an identifier back to its path.
    #[must_use]
    pub fn resolve(&self, id: AssetId) -> Option<&str> {
        self.paths.get(id.index()).map(String::as_str)
    }

    /// Number of interned paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true when nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The path table, indexed by identifier.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}
