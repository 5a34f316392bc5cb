//! `adeps verify`: check the cached graph's inverse and totality invariants.

use assetdeps_core::ErrorCode;
use serde::Serialize;

use super::Project;
use crate::output::{OutputMode, fail, pretty_kv, pretty_section, render_mode};

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub ok: bool,
    pub assets: usize,
    pub edges: usize,
    pub cache_path: String,
}

/// Execute `adeps verify`.
pub fn run_verify(output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let service = project.load_summary(output)?;
    let Some(graph) = service.graph() else {
        return Err(fail(output, ErrorCode::NotReady, "no dependency graph loaded"));
    };

    if let Err(err) = graph.verify() {
        return Err(fail(output, err.code(), format!("cache failed verification: {err}")));
    }

    let report = VerifyReport {
        ok: true,
        assets: graph.len(),
        edges: graph.edge_count(),
        cache_path: project.cache_path().display().to_string(),
    };
    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "ok assets={} edges={}", r.assets, r.edges),
        |r, w| {
            pretty_section(w, "Dependency cache verified")?;
            pretty_kv(w, "assets", r.assets.to_string())?;
            pretty_kv(w, "edges", r.edges.to_string())?;
            pretty_kv(w, "cache", &r.cache_path)
        },
    )
}
