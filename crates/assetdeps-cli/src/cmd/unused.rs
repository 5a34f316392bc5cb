//! `adeps unused`: assets that nothing depends on.

use std::io::Write;

use assetdeps_core::GraphIndex;
use clap::Args;
use serde::Serialize;

use super::Project;
use crate::icons::KindTable;
use crate::output::{OutputMode, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct UnusedArgs {
    /// Only list assets under this path prefix.
    #[arg(long, value_name = "PREFIX")]
    pub under: Option<String>,

    /// Include folders in the listing.
    #[arg(long)]
    pub folders: bool,
}

/// Report payload for `adeps unused`.
#[derive(Debug, Serialize)]
pub struct UnusedReport {
    pub count: usize,
    pub assets: Vec<UnusedAsset>,
}

#[derive(Debug, Serialize)]
pub struct UnusedAsset {
    pub path: String,
    pub kind: &'static str,
    pub uses: usize,
}

/// Execute `adeps unused`.
pub fn run_unused(args: &UnusedArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let service = project.load_summary(output)?;
    let empty = GraphIndex::default();
    let graph = service.graph().unwrap_or(&empty);
    let kinds = project.kind_table(graph);
    let assets = collect_unused(graph, &kinds, args);
    let report = UnusedReport {
        count: assets.len(),
        assets,
    };
    render_mode(output, &report, render_unused_text, render_unused_pretty)
}

fn collect_unused(graph: &GraphIndex, kinds: &KindTable, args: &UnusedArgs) -> Vec<UnusedAsset> {
    let mut unused: Vec<UnusedAsset> = graph
        .iter()
        .filter(|v| v.used_by_count() == 0)
        .filter(|v| args.folders || !kinds.is_folder(v.id()))
        .filter(|v| args.under.as_deref().is_none_or(|prefix| is_under(v.path(), prefix)))
        .map(|v| UnusedAsset {
            path: v.path().to_string(),
            kind: kinds.kind(v),
            uses: v.uses_count(),
        })
        .collect();
    unused.sort_by(|a, b| a.path.cmp(&b.path));
    unused
}

fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn render_unused_text(report: &UnusedReport, w: &mut dyn Write) -> std::io::Result<()> {
    for asset in &report.assets {
        writeln!(w, "{}", asset.path)?;
    }
    Ok(())
}

fn render_unused_pretty(report: &UnusedReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Unused assets ({})", report.count))?;
    for asset in &report.assets {
        writeln!(w, "  {:<10} {}", asset.kind, asset.path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdeps_core::{BuildOptions, ManifestSource, NoProgress, build_graph};

    fn unused_in(source: &ManifestSource, args: &UnusedArgs) -> Vec<String> {
        let graph = build_graph(source, &BuildOptions::default(), &NoProgress).index;
        let kinds = KindTable::new(&graph, Some(source));
        collect_unused(&graph, &kinds, args)
            .into_iter()
            .map(|a| a.path)
            .collect()
    }

    fn source() -> ManifestSource {
        ManifestSource::new()
            .with_folder("Assets")
            .with_folder("Assets/Scenes")
            .with_asset("Assets/Scenes/Main.unity", ["Assets/Hero.prefab"])
            .with_asset("Assets/Hero.prefab", Vec::<String>::new())
            .with_asset("Assets/Old/Unused.mat", Vec::<String>::new())
    }

    #[test]
    fn lists_unreferenced_files() {
        let unused = unused_in(&source(), &UnusedArgs::default());
        assert_eq!(unused, ["Assets/Old/Unused.mat", "Assets/Scenes/Main.unity"]);
    }

    #[test]
    fn folders_on_request() {
        let args = UnusedArgs {
            folders: true,
            ..UnusedArgs::default()
        };
        let unused = unused_in(&source(), &args);
        assert!(unused.iter().any(|p| p == "Assets/Scenes"));
    }

    #[test]
    fn prefix_filter_respects_segments() {
        let args = UnusedArgs {
            under: Some("Assets/Old/".into()),
            ..UnusedArgs::default()
        };
        assert_eq!(unused_in(&source(), &args), ["Assets/Old/Unused.mat"]);
        assert!(!is_under("Assets/Older/x.mat", "Assets/Old"));
    }

    #[test]
    fn extensionless_files_listed_and_dotted_folders_hidden() {
        let source = ManifestSource::new()
            .with_folder("Assets")
            .with_folder("Assets/Plugins/Foo.bundle")
            .with_asset("Assets/LICENSE", Vec::<String>::new());
        assert_eq!(unused_in(&source, &UnusedArgs::default()), ["Assets/LICENSE"]);

        let args = UnusedArgs {
            folders: true,
            ..UnusedArgs::default()
        };
        assert_eq!(
            unused_in(&source, &args),
            ["Assets", "Assets/LICENSE", "Assets/Plugins/Foo.bundle"]
        );
    }
}
