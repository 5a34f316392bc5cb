use assetdeps_core::config::load_project_config;
use assetdeps_core::{
    ErrorCode, LoadOutcome, ManifestSource, NoProgress, SummaryService, TracingProgress,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn uses(service: &SummaryService, path: &str) -> Vec<String> {
    service
        .lookup(path)
        .expect("asset present")
        .uses()
        .map(|v| v.path().to_string())
        .collect()
}

fn used_by(service: &SummaryService, path: &str) -> Vec<String> {
    service
        .lookup(path)
        .expect("asset present")
        .used_by()
        .map(|v| v.path().to_string())
        .collect()
}

/// Build from `manifest_json` in a fresh project, save, and reload into a
/// second service.
fn build_save_reload(root: &Path, manifest_json: &str) -> SummaryService {
    let config = load_project_config(root).expect("defaults");
    let manifest_path = config.manifest_path(root);
    fs::create_dir_all(manifest_path.parent().expect("has parent")).expect("mkdir");
    fs::write(&manifest_path, manifest_json).expect("write manifest");

    let source = ManifestSource::from_path(&manifest_path).expect("valid manifest");
    let mut builder = SummaryService::new();
    builder.build(&source, &config.build_options(), &TracingProgress);
    builder.save(&config.cache_path(root)).expect("save");

    let mut loaded = SummaryService::new();
    assert_eq!(
        loaded.load(&config.cache_path(root)).expect("load"),
        LoadOutcome::Loaded
    );
    assert!(loaded.graph().expect("ready").verify().is_ok());
    loaded
}

#[test]
fn fan_out() {
    let root = TempDir::new().expect("tempdir");
    let service = build_save_reload(
        root.path(),
        r#"{"assets": {
            "Assets/A.asset": ["Assets/B.asset", "Assets/C.asset"],
            "Assets/B.asset": [],
            "Assets/C.asset": []
        }}"#,
    );

    assert_eq!(uses(&service, "Assets/A.asset"), ["Assets/B.asset", "Assets/C.asset"]);
    assert!(used_by(&service, "Assets/A.asset").is_empty());
    assert_eq!(used_by(&service, "Assets/B.asset"), ["Assets/A.asset"]);
    assert_eq!(used_by(&service, "Assets/C.asset"), ["Assets/A.asset"]);
}

#[test]
fn cycle() {
    let root = TempDir::new().expect("tempdir");
    let service = build_save_reload(
        root.path(),
        r#"{"assets": {
            "Assets/A.asset": ["Assets/B.asset"],
            "Assets/B.asset": ["Assets/A.asset"]
        }}"#,
    );

    for (from, to) in [("Assets/A.asset", "Assets/B.asset"), ("Assets/B.asset", "Assets/A.asset")] {
        assert_eq!(uses(&service, from), [to]);
        assert_eq!(used_by(&service, from), [to]);
    }
}

#[test]
fn dummy_record_for_unenumerated_dependency() {
    let root = TempDir::new().expect("tempdir");
    let service = build_save_reload(
        root.path(),
        r#"{"assets": {
            "Assets/A.asset": ["ProjectSettings/D.asset"],
            "ProjectSettings/D.asset": ["Assets/A.asset"]
        }}"#,
    );

    let d = service.lookup("ProjectSettings/D.asset").expect("dummy present");
    assert_eq!(d.uses_count(), 0);
    assert_eq!(d.directory(), "ProjectSettings");
    assert_eq!(d.file_name(), "D.asset");
    assert_eq!(used_by(&service, "ProjectSettings/D.asset"), ["Assets/A.asset"]);
}

#[test]
fn empty_graph() {
    let root = TempDir::new().expect("tempdir");
    fs::create_dir_all(root.path().join(".assetdeps")).expect("mkdir");
    fs::write(
        root.path().join(".assetdeps/config.toml"),
        "[build]\ninclude_folders = false\n",
    )
    .expect("write config");

    let service = build_save_reload(root.path(), r#"{"folders": ["Assets"]}"#);
    assert!(service.graph().expect("ready").is_empty());
    assert!(service.lookup("Assets").is_none());
}

#[test]
fn folders_are_assets_by_default() {
    let root = TempDir::new().expect("tempdir");
    let service = build_save_reload(
        root.path(),
        r#"{"folders": ["Assets", "Assets/Art"],
            "assets": {"Assets/Art/Hero.prefab": ["Assets/Art"]}}"#,
    );

    assert_eq!(used_by(&service, "Assets/Art"), ["Assets/Art/Hero.prefab"]);
    assert!(service.lookup("Assets").is_some());
}

#[test]
fn corrupt_cache_reports_and_recovers_by_rebuild() {
    let root = TempDir::new().expect("tempdir");
    let config = load_project_config(root.path()).expect("defaults");
    let cache = config.cache_path(root.path());
    fs::create_dir_all(cache.parent().expect("has parent")).expect("mkdir");
    fs::write(&cache, vec![0u8; 64]).expect("write garbage");

    let mut service = SummaryService::new();
    let err = service.load(&cache).expect_err("garbage cache");
    assert_eq!(err.code(), ErrorCode::CacheCorrupt);
    assert!(!service.is_ready());

    let source = ManifestSource::new().with_asset("Assets/A.asset", Vec::<String>::new());
    service.build(&source, &config.build_options(), &NoProgress);
    service.save(&cache).expect("overwrite");

    let mut reloaded = SummaryService::new();
    assert_eq!(reloaded.load(&cache).expect("load"), LoadOutcome::Loaded);
    assert!(reloaded.lookup("Assets/A.asset").is_some());
}
