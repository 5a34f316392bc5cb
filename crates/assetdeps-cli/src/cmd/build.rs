//! `adeps build`: rebuild the dependency graph from the manifest and save it.

use std::io::Write;

use assetdeps_core::{BuildReport, ErrorCode, ManifestSource, SummaryService, TracingProgress};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::Project;
use crate::output::{OutputMode, fail, pretty_kv, pretty_section, render_mode};

/// Arguments for `adeps build`.
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Search only the primary roots, not the package roots.
    #[arg(long)]
    pub no_packages: bool,

    /// Drop folders from the graph.
    #[arg(long)]
    pub no_folders: bool,
}

/// Result payload for `adeps build`.
#[derive(Debug, Serialize)]
pub struct BuildSummary {
    #[serde(flatten)]
    pub report: BuildReport,
    pub cache_path: String,
    pub cache_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Execute `adeps build`.
pub fn run_build(args: &BuildArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let manifest_path = project.manifest_path();
    if !manifest_path.exists() {
        return Err(fail(
            output,
            ErrorCode::SourceUnavailable,
            format!("no dependency manifest at {}", manifest_path.display()),
        ));
    }
    let source = ManifestSource::from_path(&manifest_path)
        .map_err(|err| fail(output, ErrorCode::ManifestInvalid, format!("{err:#}")))?;

    let mut options = project.config.build_options();
    if args.no_packages {
        options.include_packages = false;
    }
    if args.no_folders {
        options.include_folders = false;
    }

    let mut service = SummaryService::new();
    let report = service.build(&source, &options, &TracingProgress);

    let cache_path = project.cache_path();
    let stats = service
        .save(&cache_path)
        .map_err(|err| fail(output, err.code(), format!("{err:#}")))?;
    info!(path = %cache_path.display(), "dependency cache written");

    let summary = BuildSummary {
        report,
        cache_path: cache_path.display().to_string(),
        cache_bytes: stats.file_size_bytes,
        last_updated: service.last_updated_display(),
    };
    render_mode(output, &summary, render_build_text, render_build_pretty)
}

fn render_build_text(summary: &BuildSummary, w: &mut dyn Write) -> std::io::Result<()> {
    let report = &summary.report;
    writeln!(
        w,
        "built {} assets, {} edges, {} dummies in {:.3}s -> {}",
        report.asset_count,
        report.edge_count,
        report.dummy_count,
        report.elapsed.as_secs_f64(),
        summary.cache_path
    )?;
    for root in &report.skipped_roots {
        writeln!(w, "skipped root {root}")?;
    }
    if report.failed_lookups > 0 {
        writeln!(w, "{} dependency lookups failed", report.failed_lookups)?;
    }
    Ok(())
}

fn render_build_pretty(summary: &BuildSummary, w: &mut dyn Write) -> std::io::Result<()> {
    let report = &summary.report;
    pretty_section(w, "Dependency graph updated")?;
    pretty_kv(w, "assets", report.asset_count.to_string())?;
    pretty_kv(w, "enumerated", report.enumerated_count.to_string())?;
    pretty_kv(w, "dummies", report.dummy_count.to_string())?;
    pretty_kv(w, "edges", report.edge_count.to_string())?;
    if report.failed_lookups > 0 {
        pretty_kv(w, "failed", report.failed_lookups.to_string())?;
    }
    if !report.skipped_roots.is_empty() {
        pretty_kv(w, "skipped", report.skipped_roots.join(", "))?;
    }
    pretty_kv(w, "elapsed", format!("{:.3}s", report.elapsed.as_secs_f64()))?;
    pretty_kv(w, "cache", format!("{} ({} bytes)", summary.cache_path, summary.cache_bytes))?;
    if let Some(ref updated) = summary.last_updated {
        pretty_kv(w, "updated", updated)?;
    }
    Ok(())
}
