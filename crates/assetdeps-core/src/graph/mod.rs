//! The asset dependency graph.
//!
//! # Overview
//!
//! A [`GraphIndex`] owns the interned path table and one [`AssetRecord`] per
//! [`AssetId`]. Every record carries both directions of the relation:
//!
//! - `uses`: what the asset directly depends on.
//! - `used_by`: who directly depends on the asset.
//!
//! `j ∈ used_by(i) ⇔ i ∈ uses(j)` holds after every build and every load.
//! [`GraphIndex::verify`] checks it, together with totality (every
//! referenced id has a record and a path).
//!
//! ## Pipeline
//!
//! ```text
//! AssetSource (enumerate + direct deps)
//!        ↓  build::build_graph()
//! GraphIndex ──→ cache::encode_graph() ──→ bytes on disk
//!        ↑  GraphIndex::from_parts()
//! cache::decode_graph()
//! ```
//!
//! Both paths end in [`GraphIndex::from_parts`]'s finalize step, which
//! sorts every edge list by referenced path and derives the display fields
//! in parallel, one record per unit of work.

pub mod build;
pub mod view;

use std::fmt;

use rayon::prelude::*;

use crate::intern::{DuplicatePath, PathInterner};

pub use build::{BuildOptions, BuildOutput, BuildReport, build_graph};
pub use view::AssetView;

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Dense identifier of an asset, valid within one build/load cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(u32);

impl AssetId {
    /// Wrap a table index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("asset id space exhausted"))
    }

    /// Position of this asset in the path table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AssetRecord
// ---------------------------------------------------------------------------

/// One node of the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetRecord {
    id: AssetId,
    uses: Vec<AssetId>,
    used_by: Vec<AssetId>,
    directory: String,
    file_name: String,
}

impl AssetRecord {
    /// Create a record from its edge lists. Display fields are filled in by
    /// [`GraphIndex::from_parts`].
    #[must_use]
    pub fn new(id: AssetId, uses: Vec<AssetId>, used_by: Vec<AssetId>) -> Self {
        Self {
            id,
            uses,
            used_by,
            directory: String::new(),
            file_name: String::new(),
        }
    }

    /// Identifier of this record, equal to its slot in the graph.
    #[must_use]
    pub const fn id(&self) -> AssetId {
        self.id
    }

    /// Direct dependencies, ordered by path.
    #[must_use]
    pub fn uses(&self) -> &[AssetId] {
        &self.uses
    }

    /// Direct dependents, ordered by path.
    #[must_use]
    pub fn used_by(&self) -> &[AssetId] {
        &self.used_by
    }

    /// Parent directory of the asset path, empty for a top-level path.
    #[must_use]
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Last segment of the asset path.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Sort both edge lists by referenced path and derive display fields.
    fn finalize(&mut self, paths: &[String]) {
        let by_path = |a: &AssetId, b: &AssetId| paths[a.index()].cmp(&paths[b.index()]);
        self.uses.sort_unstable_by(by_path);
        self.used_by.sort_unstable_by(by_path);

        let (directory, file_name) = split_path(&paths[self.id.index()]);
        directory.clone_into(&mut self.directory);
        file_name.clone_into(&mut self.file_name);
    }
}

/// Split a `/`-separated path into (directory, file name).
#[must_use]
pub fn split_path(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A structural problem found while assembling or verifying a graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    /// The record array and the path table disagree in length.
    #[error("graph has {records} records but {paths} paths")]
    CountMismatch { records: usize, paths: usize },

    /// A record is stored at a slot that does not match its own id.
    #[error("record at slot {slot} carries id {id}")]
    MisplacedRecord { slot: usize, id: AssetId },

    /// An edge points outside the path table.
    #[error("record {from} references {to}, but only {len} assets exist")]
    DanglingEdge { from: AssetId, to: AssetId, len: usize },

    /// A persisted identifier is negative or past the end of the table.
    #[error("identifier {id} is outside 0..{len}")]
    IdOutOfRange { id: i64, len: usize },

    /// Two persisted records claim the same identifier.
    #[error("more than one record carries id {0}")]
    DuplicateRecord(AssetId),

    /// An edge list names the same asset twice.
    #[error("edge {from} -> {to} is listed more than once")]
    DuplicateEdge { from: AssetId, to: AssetId },

    /// `uses` and `used_by` are not inverses of each other.
    #[error("{from} uses {to} but {to} is not used by {from} (or vice versa)")]
    NotInverse { from: AssetId, to: AssetId },

    /// The path table is not a bijection.
    #[error(transparent)]
    DuplicatePath(#[from] DuplicatePath),
}

impl InvariantError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> crate::error::ErrorCode {
        crate::error::ErrorCode::InvariantViolation
    }
}

// ---------------------------------------------------------------------------
// GraphIndex
// ---------------------------------------------------------------------------

/// The complete dependency graph: path table, records, and path lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphIndex {
    interner: PathInterner,
    records: Vec<AssetRecord>,
}

impl GraphIndex {
    /// Assemble a graph from an interner and records, then finalize it.
    ///
    /// `records[i]` must carry id `i` and every edge must point inside the
    /// path table. The inverse relation is not checked here; use
    /// [`verify`](Self::verify) for that.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] on a count mismatch, a misplaced record, or
    /// a dangling edge.
    pub fn from_parts(
        interner: PathInterner,
        mut records: Vec<AssetRecord>,
    ) -> Result<Self, InvariantError> {
        let len = interner.len();
        if records.len() != len {
            return Err(InvariantError::CountMismatch {
                records: records.len(),
                paths: len,
            });
        }
        for (slot, record) in records.iter().enumerate() {
            if record.id.index() != slot {
                return Err(InvariantError::MisplacedRecord {
                    slot,
                    id: record.id,
                });
            }
            if let Some(&to) = record
                .uses
                .iter()
                .chain(&record.used_by)
                .find(|to| to.index() >= len)
            {
                return Err(InvariantError::DanglingEdge {
                    from: record.id,
                    to,
                    len,
                });
            }
        }

        let paths = interner.paths();
        records
            .par_iter_mut()
            .for_each(|record| record.finalize(paths));

        Ok(Self { interner, records })
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the graph has no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of `uses` edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.records.iter().map(|r| r.uses.len()).sum()
    }

    /// The path table, indexed by [`AssetId`].
    #[must_use]
    pub fn paths(&self) -> &[String] {
        self.interner.paths()
    }

    /// All records, indexed by [`AssetId`].
    #[must_use]
    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    /// Path of an asset.
    #[must_use]
    pub fn path(&self, id: AssetId) -> Option<&str> {
        self.interner.resolve(id)
    }

    /// Identifier of a path, if it is part of the graph.
    #[must_use]
    pub fn id_of(&self, path: &str) -> Option<AssetId> {
        self.interner.lookup(path)
    }

    /// Record of an asset.
    #[must_use]
    pub fn record(&self, id: AssetId) -> Option<&AssetRecord> {
        self.records.get(id.index())
    }

    /// Look up an asset by path.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<AssetView<'_>> {
        self.id_of(path).and_then(|id| self.view(id))
    }

    /// View of an asset by identifier.
    #[must_use]
    pub fn view(&self, id: AssetId) -> Option<AssetView<'_>> {
        let record = self.record(id)?;
        Some(AssetView::new(self, record))
    }

    /// Iterate views over every asset in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = AssetView<'_>> {
        self.records.iter().map(|record| AssetView::new(self, record))
    }

    /// Check totality and the `uses` / `used_by` inverse relation.
    ///
    /// Every edge list is sorted by path after finalize, so duplicates are
    /// adjacent and membership is a binary search: O(E log d).
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantError`] found.
    pub fn verify(&self) -> Result<(), InvariantError> {
        let len = self.len();
        if self.paths().len() != len {
            return Err(InvariantError::CountMismatch {
                records: len,
                paths: self.paths().len(),
            });
        }

        for record in &self.records {
            if let Some(to) = adjacent_duplicate(&record.uses) {
                return Err(InvariantError::DuplicateEdge { from: record.id, to });
            }
            if let Some(from) = adjacent_duplicate(&record.used_by) {
                return Err(InvariantError::DuplicateEdge { from, to: record.id });
            }
            for &to in &record.uses {
                let target = self.neighbour(record.id, to)?;
                if !self.contains_sorted(&target.used_by, record.id) {
                    return Err(InvariantError::NotInverse { from: record.id, to });
                }
            }
            for &from in &record.used_by {
                let source = self.neighbour(record.id, from)?;
                if !self.contains_sorted(&source.uses, record.id) {
                    return Err(InvariantError::NotInverse { from, to: record.id });
                }
            }
        }
        Ok(())
    }

    fn neighbour(&self, from: AssetId, to: AssetId) -> Result<&AssetRecord, InvariantError> {
        self.records
            .get(to.index())
            .ok_or(InvariantError::DanglingEdge {
                from,
                to,
                len: self.len(),
            })
    }

    fn contains_sorted(&self, list: &[AssetId], id: AssetId) -> bool {
        let paths = self.paths();
        list.binary_search_by(|probe| paths[probe.index()].cmp(&paths[id.index()]))
            .is_ok()
    }
}

fn adjacent_duplicate(list: &[AssetId]) -> Option<AssetId> {
    list.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: usize) -> AssetId {
        AssetId::from_index(i)
    }

    fn interner(paths: &[&str]) -> PathInterner {
        PathInterner::from_paths(paths.iter().map(|p| (*p).to_string()).collect())
            .expect("unique paths")
    }

    #[test]
    fn split_path_handles_roots_and_nesting() {
        assert_eq!(split_path("Assets/Art/Hero.png"), ("Assets/Art", "Hero.png"));
        assert_eq!(split_path("Assets"), ("", "Assets"));
        assert_eq!(split_path("Assets/"), ("Assets", ""));
    }

    #[test]
    fn from_parts_sorts_edges_by_path_and_derives_fields() {
        // 0 = z, 1 = a, 2 = m; 0 uses 1 and 2 in id order.
        let table = interner(&["Assets/z.mat", "Assets/a.png", "Assets/m.png"]);
        let records = vec![
            AssetRecord::new(id(0), vec![id(2), id(1)], vec![]),
            AssetRecord::new(id(1), vec![], vec![id(0)]),
            AssetRecord::new(id(2), vec![], vec![id(0)]),
        ];
        let graph = GraphIndex::from_parts(table, records).expect("valid graph");

        let z = graph.record(id(0)).expect("record");
        assert_eq!(z.uses(), [id(1), id(2)]);
        assert_eq!(z.directory(), "Assets");
        assert_eq!(z.file_name(), "z.mat");
        assert_eq!(graph.edge_count(), 2);
        graph.verify().expect("inverse holds");
    }

    #[test]
    fn from_parts_rejects_count_mismatch() {
        let err = GraphIndex::from_parts(interner(&["a", "b"]), vec![AssetRecord::new(
            id(0),
            vec![],
            vec![],
        )])
        .expect_err("mismatch");
        assert_eq!(err, InvariantError::CountMismatch { records: 1, paths: 2 });
    }

    #[test]
    fn from_parts_rejects_dangling_edges() {
        let err = GraphIndex::from_parts(interner(&["a"]), vec![AssetRecord::new(
            id(0),
            vec![id(3)],
            vec![],
        )])
        .expect_err("dangling");
        assert!(matches!(err, InvariantError::DanglingEdge { len: 1, .. }));
    }

    #[test]
    fn from_parts_rejects_misplaced_records() {
        let err = GraphIndex::from_parts(interner(&["a", "b"]), vec![
            AssetRecord::new(id(1), vec![], vec![]),
            AssetRecord::new(id(0), vec![], vec![]),
        ])
        .expect_err("misplaced");
        assert!(matches!(err, InvariantError::MisplacedRecord { slot: 0, .. }));
    }

    #[test]
    fn verify_detects_missing_inverse_edge() {
        let graph = GraphIndex::from_parts(interner(&["a", "b"]), vec![
            AssetRecord::new(id(0), vec![id(1)], vec![]),
            AssetRecord::new(id(1), vec![], vec![]),
        ])
        .expect("structurally valid");
        let err = graph.verify().expect_err("b should list a as a dependent");
        assert_eq!(err, InvariantError::NotInverse { from: id(0), to: id(1) });
        assert_eq!(err.code(), crate::error::ErrorCode::InvariantViolation);
    }

    #[test]
    fn verify_detects_one_sided_duplicates() {
        let graph = GraphIndex::from_parts(interner(&["a", "b"]), vec![
            AssetRecord::new(id(0), vec![id(1)], vec![]),
            AssetRecord::new(id(1), vec![], vec![id(0), id(0)]),
        ])
        .expect("structurally valid");
        assert_eq!(
            graph.verify(),
            Err(InvariantError::DuplicateEdge { from: id(0), to: id(1) })
        );
    }

    #[test]
    fn empty_graph_is_valid() {
        let graph = GraphIndex::default();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.lookup("anything").is_none());
        graph.verify().expect("empty graph is valid");
    }

    #[test]
    fn asset_id_display() {
        assert_eq!(id(42).to_string(), "#42");
        assert_eq!(id(42).get(), 42);
    }
}
