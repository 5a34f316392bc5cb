//! `adeps show`: uses and used-by lists of one asset.

use std::io::Write;

use assetdeps_core::{AssetView, ErrorCode};
use clap::Args;
use serde::Serialize;

use super::Project;
use crate::icons::KindTable;
use crate::output::{OutputMode, fail, pretty_kv, pretty_rule, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Asset path, e.g. `Assets/Materials/Wood.mat`.
    pub path: String,
}

/// One neighbour in the `show` output.
#[derive(Debug, Serialize)]
pub struct ShowLink {
    pub path: String,
    pub kind: &'static str,
}

/// Full asset detail as returned in JSON output.
#[derive(Debug, Serialize)]
pub struct ShowAsset {
    pub id: u32,
    pub path: String,
    pub directory: String,
    pub file_name: String,
    pub kind: &'static str,
    pub uses: Vec<ShowLink>,
    pub used_by: Vec<ShowLink>,
}

impl ShowAsset {
    fn from_view(view: AssetView<'_>, kinds: &KindTable) -> Self {
        let link = |v: AssetView<'_>| ShowLink {
            path: v.path().to_string(),
            kind: kinds.kind(v),
        };
        Self {
            id: view.id().get(),
            path: view.path().to_string(),
            directory: view.directory().to_string(),
            file_name: view.file_name().to_string(),
            kind: kinds.kind(view),
            uses: view.uses().map(link).collect(),
            used_by: view.used_by().map(link).collect(),
        }
    }
}

/// Execute `adeps show`.
pub fn run_show(args: &ShowArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let service = project.load_summary(output)?;
    let Some(view) = service.lookup(&args.path) else {
        return Err(fail(
            output,
            ErrorCode::AssetNotFound,
            format!("asset '{}' is not in the dependency graph", args.path),
        ));
    };

    let kinds = service
        .graph()
        .map(|graph| project.kind_table(graph))
        .ok_or_else(|| fail(output, ErrorCode::NotReady, "no dependency graph loaded"))?;
    let asset = ShowAsset::from_view(view, &kinds);
    render_mode(output, &asset, render_show_text, render_show_pretty)
}

fn render_show_text(asset: &ShowAsset, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}  {}  uses={}  used_by={}",
        asset.path,
        asset.kind,
        asset.uses.len(),
        asset.used_by.len()
    )?;
    for link in &asset.uses {
        writeln!(w, "uses  {}", link.path)?;
    }
    for link in &asset.used_by {
        writeln!(w, "used_by  {}", link.path)?;
    }
    Ok(())
}

fn render_show_pretty(asset: &ShowAsset, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Asset #{}", asset.id))?;
    writeln!(w, "{}", asset.file_name)?;
    pretty_rule(w)?;
    pretty_kv(w, "directory", &asset.directory)?;
    pretty_kv(w, "kind", asset.kind)?;

    for (heading, links) in [("Uses", &asset.uses), ("Used by", &asset.used_by)] {
        writeln!(w)?;
        pretty_section(w, &format!("{heading} ({})", links.len()))?;
        if links.is_empty() {
            writeln!(w, "  (none)")?;
        }
        for link in links {
            writeln!(w, "  {:<10} {}", link.kind, link.path)?;
        }
    }
    Ok(())
}
