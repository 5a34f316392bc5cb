//! Borrowed, presentation-friendly view of one asset.

use std::fmt;

use super::{AssetId, AssetRecord, GraphIndex};

/// An asset record together with the graph it belongs to.
///
/// `uses()` and `used_by()` yield further views, in path order, so callers
/// can walk the graph without touching identifiers.
#[derive(Clone, Copy)]
pub struct AssetView<'g> {
    graph: &'g GraphIndex,
    record: &'g AssetRecord,
}

impl<'g> AssetView<'g> {
    pub(crate) const fn new(graph: &'g GraphIndex, record: &'g AssetRecord) -> Self {
        Self { graph, record }
    }

    /// Identifier of the asset.
    #[must_use]
    pub const fn id(&self) -> AssetId {
        self.record.id()
    }

    /// Full asset path.
    #[must_use]
    pub fn path(&self) -> &'g str {
        // Every record id has a path entry; GraphIndex::from_parts checks it.
        self.graph.paths()[self.record.id().index()].as_str()
    }

    /// Parent directory, empty for a top-level path.
    #[must_use]
    pub fn directory(&self) -> &'g str {
        self.record.directory()
    }

    /// Last path segment.
    #[must_use]
    pub fn file_name(&self) -> &'g str {
        self.record.file_name()
    }

    /// The underlying record.
    #[must_use]
    pub const fn record(&self) -> &'g AssetRecord {
        self.record
    }

    /// Direct dependencies, sorted by path.
    pub fn uses(self) -> impl ExactSizeIterator<Item = AssetView<'g>> + 'g {
        let graph = self.graph;
        self.record
            .uses()
            .iter()
            .map(move |&id| Self::new(graph, &graph.records()[id.index()]))
    }

    /// Direct dependents, sorted by path.
    pub fn used_by(self) -> impl ExactSizeIterator<Item = AssetView<'g>> + 'g {
        let graph = self.graph;
        self.record
            .used_by()
            .iter()
            .map(move |&id| Self::new(graph, &graph.records()[id.index()]))
    }

    /// Number of direct dependencies.
    #[must_use]
    pub fn uses_count(&self) -> usize {
        self.record.uses().len()
    }

    /// Number of direct dependents.
    #[must_use]
    pub fn used_by_count(&self) -> usize {
        self.record.used_by().len()
    }
}

impl fmt::Debug for AssetView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetView")
            .field("id", &self.id())
            .field("path", &self.path())
            .field("uses", &self.uses_count())
            .field("used_by", &self.used_by_count())
            .finish()
    }
}

impl PartialEq for AssetView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id() == other.id()
    }
}

impl Eq for AssetView<'_> {}

#[cfg(test)]
mod tests {
    use crate::graph::{AssetId, AssetRecord, GraphIndex};
    use crate::intern::PathInterner;

    fn graph() -> GraphIndex {
        let mut interner = PathInterner::new();
        let a = interner.intern("Assets/A.asset");
        let c = interner.intern("Assets/Sub/C.asset");
        let b = interner.intern("Assets/B.asset");
        GraphIndex::from_parts(interner, vec![
            AssetRecord::new(a, vec![c, b], vec![]),
            AssetRecord::new(c, vec![], vec![a]),
            AssetRecord::new(b, vec![], vec![a]),
        ])
        .expect("valid graph")
    }

    #[test]
    fn lookup_exposes_display_fields() {
        let graph = graph();
        let c = graph.lookup("Assets/Sub/C.asset").expect("present");
        assert_eq!(c.id(), AssetId::from_index(1));
        assert_eq!(c.directory(), "Assets/Sub");
        assert_eq!(c.file_name(), "C.asset");
        assert_eq!(c.used_by_count(), 1);
    }

    #[test]
    fn uses_are_yielded_in_path_order() {
        let graph = graph();
        let a = graph.lookup("Assets/A.asset").expect("present");
        let uses: Vec<&str> = a.uses().map(|v| v.path()).collect();
        assert_eq!(uses, ["Assets/B.asset", "Assets/Sub/C.asset"]);
        assert_eq!(a.uses().len(), 2);
        assert_eq!(a.used_by().len(), 0);
    }

    #[test]
    fn used_by_walks_back_to_dependents() {
        let graph = graph();
        let b = graph.lookup("Assets/B.asset").expect("present");
        let dependents: Vec<_> = b.used_by().collect();
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0], graph.lookup("Assets/A.asset").expect("present"));
    }

    #[test]
    fn iter_visits_every_asset() {
        let graph = graph();
        assert_eq!(graph.iter().count(), 3);
        assert!(format!("{:?}", graph.iter().next().expect("first")).contains("Assets/A.asset"));
    }
}
