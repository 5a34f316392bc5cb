use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;
use crate::graph::BuildOptions;

/// Project-relative location of the project config file.
pub const PROJECT_CONFIG_PATH: &str = ".assetdeps/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_search_roots")]
    pub search_roots: Vec<String>,
    #[serde(default = "default_secondary_roots")]
    pub secondary_roots: Vec<String>,
    #[serde(default = "default_true")]
    pub include_packages: bool,
    #[serde(default = "default_true")]
    pub include_folders: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            search_roots: default_search_roots(),
            secondary_roots: default_secondary_roots(),
            include_packages: default_true(),
            include_folders: default_true(),
        }
    }
}

impl From<&BuildConfig> for BuildOptions {
    fn from(config: &BuildConfig) -> Self {
        Self {
            search_roots: config.search_roots.clone(),
            secondary_roots: config.secondary_roots.clone(),
            include_packages: config.include_packages,
            include_folders: config.include_folders,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

impl ProjectConfig {
    /// Manifest location, resolved against `project_root` when relative.
    #[must_use]
    pub fn manifest_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.source.manifest)
    }

    /// Cache file location, resolved against `project_root` when relative.
    #[must_use]
    pub fn cache_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.cache.path)
    }

    #[must_use]
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::from(&self.build)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

/// Errors raised while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ConfigParseError
    }
}

/// Load `.assetdeps/config.toml` under `project_root`. A missing file
/// yields defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig, ConfigError> {
    load_toml(&project_root.join(PROJECT_CONFIG_PATH))
}

/// Load the per-user config from the platform config directory.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_toml(&config_dir.join("assetdeps/config.toml"))
}

fn load_toml<T>(path: &Path) -> Result<T, ConfigError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Map a user-supplied output mode to its canonical name.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

const fn default_true() -> bool {
    true
}

fn default_search_roots() -> Vec<String> {
    vec!["Assets".to_string()]
}

fn default_secondary_roots() -> Vec<String> {
    vec!["Packages".to_string()]
}

fn default_manifest() -> PathBuf {
    PathBuf::from(".assetdeps/manifest.json")
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(".assetdeps/cache/dep.dat")
}
