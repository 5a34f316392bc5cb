//! Graph construction from an [`AssetSource`].
//!
//! # Overview
//!
//! The build runs in four phases, reported to a [`ProgressSink`]:
//!
//! 1. **Enumerate**: list candidates under every search root and intern
//!    them in enumeration order.
//! 2. **Resolve**: sequentially ask the source for each enumerated asset's
//!    direct dependencies and intern them. Paths that only ever show up as
//!    dependency targets become dummy records with no `uses`.
//! 3. **Invert**: one linear pass over every edge appends `i` to the
//!    accumulator of each `j ∈ uses(i)`.
//! 4. **Setup**: in parallel, each record takes its accumulator as
//!    `used_by`, then sorts its edge lists and derives display fields.
//!
//! ## Failure policy
//!
//! Source failures never abort a build. An unreachable root is skipped, a
//! failed dependency lookup leaves that asset with an empty `uses` list;
//! both are logged and counted in the [`BuildReport`].
//!
//! ## Determinism
//!
//! Interning is sequential, so the path table follows enumeration order then
//! discovery order. The inversion pass visits sources in id order, which
//! makes every `used_by` set independent of thread scheduling.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{AssetId, AssetRecord, GraphIndex, InvariantError};
use crate::intern::PathInterner;
use crate::source::{AssetSource, Phase, ProgressSink};

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// What to enumerate and which paths to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Roots that are always searched.
    pub search_roots: Vec<String>,
    /// Roots added when `include_packages` is set.
    pub secondary_roots: Vec<String>,
    /// Widen the search to `secondary_roots`.
    pub include_packages: bool,
    /// Keep folder paths, both as enumerated assets and as dependencies.
    pub include_folders: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            search_roots: vec!["Assets".to_string()],
            secondary_roots: vec!["Packages".to_string()],
            include_packages: true,
            include_folders: true,
        }
    }
}

impl BuildOptions {
    /// Every root the build will search, in order.
    #[must_use]
    pub fn roots(&self) -> Vec<String> {
        let mut roots = self.search_roots.clone();
        if self.include_packages {
            roots.extend(self.secondary_roots.iter().cloned());
        }
        roots
    }
}

/// Statistics about one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Total assets in the graph, dummies included.
    pub asset_count: usize,
    /// Assets returned by enumeration (after folder filtering).
    pub enumerated_count: usize,
    /// Assets discovered only as dependency targets.
    pub dummy_count: usize,
    /// Total `uses` edges.
    pub edge_count: usize,
    /// Dependency lookups that failed and were recovered as empty.
    pub failed_lookups: usize,
    /// Roots that could not be enumerated.
    pub skipped_roots: Vec<String>,
    /// Wall-clock duration of the whole build.
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// A finished graph plus its build statistics.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub index: GraphIndex,
    pub report: BuildReport,
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build a complete dependency graph from `source`.
///
/// Never fails: per-root and per-asset source errors are recovered locally.
///
/// # Panics
///
/// Panics only if the assembled graph violates its own structural
/// invariants, which indicates a bug in this module rather than bad input.
#[instrument(skip_all, fields(roots = ?options.roots()))]
pub fn build_graph<S>(
    source: &S,
    options: &BuildOptions,
    progress: &dyn ProgressSink,
) -> BuildOutput
where
    S: AssetSource + ?Sized,
{
    let started = Instant::now();
    let mut report = BuildReport::default();
    let mut interner = PathInterner::new();

    // Phase 1: enumerate.
    enumerate(source, options, &mut interner, &mut report);
    let enumerated = interner.len();
    report.enumerated_count = enumerated;
    progress.report(Phase::Enumerate, "", 1.0);
    debug!(enumerated, "enumerated assets");

    // Phase 2: resolve direct dependencies, sequentially.
    let mut uses = resolve(source, options, &mut interner, &mut report, progress);
    uses.resize_with(interner.len(), Vec::new);
    report.dummy_count = interner.len() - enumerated;

    // Phase 3: invert.
    let used_by = invert(&uses);
    progress.report(Phase::Invert, "", 1.0);

    // Phase 4: assemble records in parallel, then finalize.
    let records: Vec<AssetRecord> = uses
        .into_par_iter()
        .zip(used_by.into_par_iter())
        .enumerate()
        .map(|(i, (uses, used_by))| AssetRecord::new(AssetId::from_index(i), uses, used_by))
        .collect();

    let index = match GraphIndex::from_parts(interner, records) {
        Ok(index) => index,
        Err(err) => unreachable_invariant(&err),
    };
    progress.report(Phase::Setup, "", 1.0);

    report.asset_count = index.len();
    report.edge_count = index.edge_count();
    report.elapsed = started.elapsed();

    info!(
        assets = report.asset_count,
        edges = report.edge_count,
        dummies = report.dummy_count,
        failed_lookups = report.failed_lookups,
        "asset dependency graph updated in {:.3}s",
        report.elapsed.as_secs_f64()
    );

    BuildOutput { index, report }
}

#[cold]
fn unreachable_invariant(err: &InvariantError) -> ! {
    panic!("graph builder produced an inconsistent graph: {err}")
}

fn enumerate<S>(
    source: &S,
    options: &BuildOptions,
    interner: &mut PathInterner,
    report: &mut BuildReport,
) where
    S: AssetSource + ?Sized,
{
    for root in options.roots() {
        match source.enumerate_assets(std::slice::from_ref(&root)) {
            Ok(paths) => {
                for path in paths {
                    if options.include_folders || !source.is_folder(&path) {
                        interner.intern(&path);
                    }
                }
            }
            Err(err) => {
                warn!(root = %root, "skipping search root: {err}");
                report.skipped_roots.push(root);
            }
        }
    }
}

fn resolve<S>(
    source: &S,
    options: &BuildOptions,
    interner: &mut PathInterner,
    report: &mut BuildReport,
    progress: &dyn ProgressSink,
) -> Vec<Vec<AssetId>>
where
    S: AssetSource + ?Sized,
{
    let enumerated = interner.len();
    let mut uses = Vec::with_capacity(enumerated);

    for index in 0..enumerated {
        let path = interner.paths()[index].clone();
        #[allow(clippy::cast_precision_loss)]
        let fraction = (index + 1) as f32 / enumerated as f32;
        progress.report(Phase::Resolve, &path, fraction);

        let deps = match source.direct_dependencies(&path) {
            Ok(deps) => deps,
            Err(err) => {
                warn!(path = %path, "dependency lookup failed, recording no dependencies: {err}");
                report.failed_lookups += 1;
                Vec::new()
            }
        };

        let mut ids: Vec<AssetId> = deps
            .iter()
            .filter(|dep| options.include_folders || !source.is_folder(dep))
            .map(|dep| interner.intern(dep))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        uses.push(ids);
    }

    uses
}

/// Invert `uses` into `used_by` in a single pass over all edges.
///
/// Sources are visited in ascending id order and each `uses` list is
/// de-duplicated, so every accumulator comes out ascending and unique.
#[must_use]
pub fn invert(uses: &[Vec<AssetId>]) -> Vec<Vec<AssetId>> {
    let mut used_by: Vec<Vec<AssetId>> = vec![Vec::new(); uses.len()];
    for (from, targets) in uses.iter().enumerate() {
        let from = AssetId::from_index(from);
        for to in targets {
            used_by[to.index()].push(from);
        }
    }
    used_by
}
