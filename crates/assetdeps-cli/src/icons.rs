//! Per-asset kind labels, resolved lazily and cached by [`AssetId`].
//!
//! The graph itself carries no presentation data. Listings that show many
//! assets ask this table, which classifies each asset at most once.
//!
//! Folder-ness is never guessed from the file name. A path is a folder when
//! the asset source says so, or when other paths in the graph sit under it.

use std::cell::OnceCell;
use std::collections::HashSet;

use assetdeps_core::{AssetId, AssetSource, AssetView, GraphIndex};

pub const FOLDER: &str = "folder";

/// Lazily-populated side table of kind labels, one slot per asset.
#[derive(Debug)]
pub struct KindTable {
    folders: Vec<bool>,
    labels: Vec<OnceCell<&'static str>>,
}

impl KindTable {
    /// Build the table for `graph`, consulting `source` for folders that
    /// have no children in the graph.
    pub fn new(graph: &GraphIndex, source: Option<&dyn AssetSource>) -> Self {
        let parents = parent_dirs(graph.paths());
        let folders = graph
            .paths()
            .iter()
            .map(|path| {
                parents.contains(path.as_str()) || source.is_some_and(|s| s.is_folder(path))
            })
            .collect();
        Self {
            folders,
            labels: (0..graph.len()).map(|_| OnceCell::new()).collect(),
        }
    }

    /// Returns true when `id` names a folder.
    pub fn is_folder(&self, id: AssetId) -> bool {
        self.folders.get(id.index()).copied().unwrap_or(false)
    }

    /// Kind label of `asset`, computed on first request.
    pub fn kind(&self, asset: AssetView<'_>) -> &'static str {
        let label = || {
            if self.is_folder(asset.id()) {
                FOLDER
            } else {
                classify(asset.file_name())
            }
        };
        self.slot(asset.id())
            .map_or_else(label, |cell| *cell.get_or_init(label))
    }

    #[cfg(test)]
    fn cached(&self, id: AssetId) -> Option<&'static str> {
        self.slot(id).and_then(|cell| cell.get().copied())
    }

    fn slot(&self, id: AssetId) -> Option<&OnceCell<&'static str>> {
        self.labels.get(id.index())
    }
}

/// Every proper ancestor directory of every path.
fn parent_dirs(paths: &[String]) -> HashSet<&str> {
    let mut dirs = HashSet::new();
    for path in paths {
        let mut rest = path.as_str();
        while let Some((parent, _)) = rest.rsplit_once('/') {
            // Ancestors of a known directory are already present.
            if !dirs.insert(parent) {
                break;
            }
            rest = parent;
        }
    }
    dirs
}

/// Classify a file name by extension. Files without one are `file`.
pub fn classify(file_name: &str) -> &'static str {
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return "file";
    };
    match ext.to_ascii_lowercase().as_str() {
        "unity" => "scene",
        "prefab" => "prefab",
        "mat" => "material",
        "png" | "jpg" | "jpeg" | "tga" | "psd" | "exr" => "texture",
        "fbx" | "obj" | "blend" => "model",
        "anim" | "controller" | "overridecontroller" => "animation",
        "shader" | "shadergraph" | "hlsl" | "cginc" => "shader",
        "cs" => "script",
        "asmdef" | "dll" => "assembly",
        "wav" | "mp3" | "ogg" => "audio",
        "asset" => "asset",
        _ => "file",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdeps_core::{BuildOptions, ManifestSource, NoProgress, build_graph};

    #[test]
    fn classify_by_extension() {
        assert_eq!(classify("Hero.prefab"), "prefab");
        assert_eq!(classify("Wood.PNG"), "texture");
        assert_eq!(classify("Main.unity"), "scene");
        assert_eq!(classify("LICENSE"), "file");
        assert_eq!(classify("notes.txt"), "file");
    }

    #[test]
    fn labels_are_cached_on_first_use() {
        let source = ManifestSource::new()
            .with_asset("Assets/Hero.prefab", ["Assets/Wood.mat"])
            .with_asset("Assets/Wood.mat", Vec::<String>::new());
        let graph = build_graph(&source, &BuildOptions::default(), &NoProgress).index;
        let table = KindTable::new(&graph, Some(&source));

        let hero = graph.lookup("Assets/Hero.prefab").expect("present");
        assert_eq!(table.cached(hero.id()), None);
        assert_eq!(table.kind(hero), "prefab");
        assert_eq!(table.cached(hero.id()), Some("prefab"));

        let wood = graph.lookup("Assets/Wood.mat").expect("present");
        assert_eq!(table.cached(wood.id()), None);
    }

    #[test]
    fn folders_come_from_source_not_extension() {
        let source = ManifestSource::new()
            .with_folder("Assets")
            .with_folder("Assets/Plugins")
            .with_folder("Assets/Plugins/Foo.bundle")
            .with_folder("Assets/Empty")
            .with_asset("Assets/LICENSE", Vec::<String>::new());
        let graph = build_graph(&source, &BuildOptions::default(), &NoProgress).index;
        let table = KindTable::new(&graph, Some(&source));

        let kind = |path: &str| table.kind(graph.lookup(path).expect("present"));
        assert_eq!(kind("Assets/LICENSE"), "file");
        assert_eq!(kind("Assets/Plugins/Foo.bundle"), FOLDER);
        assert_eq!(kind("Assets/Empty"), FOLDER);
        assert_eq!(kind("Assets"), FOLDER);
    }

    #[test]
    fn parents_in_the_graph_are_folders_without_a_source() {
        let source = ManifestSource::new()
            .with_folder("Assets")
            .with_folder("Assets/Foo.bundle")
            .with_asset("Assets/Foo.bundle/lib.dll", Vec::<String>::new())
            .with_asset("Assets/README", Vec::<String>::new());
        let graph = build_graph(&source, &BuildOptions::default(), &NoProgress).index;
        let table = KindTable::new(&graph, None);

        let id = |path: &str| graph.id_of(path).expect("present");
        assert!(table.is_folder(id("Assets")));
        assert!(table.is_folder(id("Assets/Foo.bundle")));
        assert!(!table.is_folder(id("Assets/Foo.bundle/lib.dll")));
        assert!(!table.is_folder(id("Assets/README")));
    }
}
