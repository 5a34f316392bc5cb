//! `adeps stats`: graph size and the most referenced assets.

use std::io::Write;

use assetdeps_core::GraphIndex;
use clap::Args;
use serde::Serialize;

use super::Project;
use crate::icons::KindTable;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `adeps stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// How many of the most referenced assets to list.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Debug, Serialize)]
pub struct ReferencedAsset {
    pub path: String,
    pub kind: &'static str,
    pub used_by: usize,
}

/// Report payload for `adeps stats`.
#[derive(Debug, Serialize)]
pub struct GraphStats {
    pub assets: usize,
    pub edges: usize,
    /// Assets that depend on nothing.
    pub leaves: usize,
    /// Assets nothing depends on.
    pub unreferenced: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub cache_path: String,
    pub most_referenced: Vec<ReferencedAsset>,
}

/// Execute `adeps stats`.
pub fn run_stats(args: &StatsArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let service = project.load_summary(output)?;
    let empty = GraphIndex::default();
    let graph = service.graph().unwrap_or(&empty);

    let kinds = project.kind_table(graph);
    let mut payload = collect_stats(graph, &kinds, args.top);
    payload.last_updated = service.last_updated_display();
    payload.cache_path = project.cache_path().display().to_string();

    render_mode(output, &payload, render_stats_text, render_stats_pretty)
}

fn collect_stats(graph: &GraphIndex, kinds: &KindTable, top: usize) -> GraphStats {

    let mut referenced: Vec<_> = graph.iter().filter(|v| v.used_by_count() > 0).collect();
    referenced.sort_by(|a, b| {
        b.used_by_count()
            .cmp(&a.used_by_count())
            .then_with(|| a.path().cmp(b.path()))
    });

    GraphStats {
        assets: graph.len(),
        edges: graph.edge_count(),
        leaves: graph.iter().filter(|v| v.uses_count() == 0).count(),
        unreferenced: graph.iter().filter(|v| v.used_by_count() == 0).count(),
        last_updated: None,
        cache_path: String::new(),
        most_referenced: referenced
            .into_iter()
            .take(top)
            .map(|v| ReferencedAsset {
                path: v.path().to_string(),
                kind: kinds.kind(v),
                used_by: v.used_by_count(),
            })
            .collect(),
    }
}

fn render_stats_text(stats: &GraphStats, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "assets={} edges={} leaves={} unreferenced={}",
        stats.assets, stats.edges, stats.leaves, stats.unreferenced
    )?;
    for asset in &stats.most_referenced {
        writeln!(w, "{}  {}", asset.used_by, asset.path)?;
    }
    Ok(())
}

fn render_stats_pretty(stats: &GraphStats, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Dependency graph")?;
    pretty_kv(w, "assets", stats.assets.to_string())?;
    pretty_kv(w, "edges", stats.edges.to_string())?;
    pretty_kv(w, "leaves", stats.leaves.to_string())?;
    pretty_kv(w, "unused", stats.unreferenced.to_string())?;
    if let Some(ref updated) = stats.last_updated {
        pretty_kv(w, "updated", updated)?;
    }
    pretty_kv(w, "cache", &stats.cache_path)?;

    if !stats.most_referenced.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Most referenced")?;
        for asset in &stats.most_referenced {
            writeln!(w, "  {:>5}  {:<10} {}", asset.used_by, asset.kind, asset.path)?;
        }
    }
    Ok(())
}
