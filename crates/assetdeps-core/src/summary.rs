//! The long-lived owner of the current dependency graph.
//!
//! A [`SummaryService`] is either empty or holds one complete
//! [`GraphIndex`]. Loads and builds construct the new index in full before
//! swapping it in, so a failure never leaves a half-built graph behind.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use tracing::{info, instrument, warn};

use crate::cache::{CacheReader, CacheReaderError, CacheStats, CacheWriter};
use crate::error::ErrorCode;
use crate::graph::{AssetView, BuildOptions, BuildReport, GraphIndex, build_graph};
use crate::source::{AssetSource, ProgressSink};

/// Result of [`SummaryService::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A graph was already loaded; nothing was read.
    AlreadyLoaded,
    /// No cache file exists at the path; the service stays empty.
    Missing,
    /// The cache was read and the service is now ready.
    Loaded,
}

/// Errors returned by [`SummaryService`].
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// The operation needs a graph, but none is loaded.
    #[error("no dependency graph is loaded")]
    NotReady,

    /// The cache exists but could not be read or decoded.
    #[error(transparent)]
    Load(#[from] CacheReaderError),

    /// The cache could not be written.
    #[error(transparent)]
    Save(#[from] anyhow::Error),
}

impl SummaryError {
    /// Machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotReady => ErrorCode::NotReady,
            Self::Load(inner) => inner.code(),
            Self::Save(_) => ErrorCode::CacheWriteFailed,
        }
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Empty,
    Ready {
        index: GraphIndex,
        last_updated: DateTime<Local>,
    },
}

/// Holds at most one dependency graph and moves it between the asset source,
/// memory, and the cache file.
#[derive(Debug, Default)]
pub struct SummaryService {
    state: State,
}

impl SummaryService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once a graph has been loaded or built.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready { .. })
    }

    /// The current graph, if any.
    #[must_use]
    pub const fn graph(&self) -> Option<&GraphIndex> {
        match &self.state {
            State::Ready { index, .. } => Some(index),
            State::Empty => None,
        }
    }

    /// When the current graph was built, or the cache file's modification
    /// time for a loaded or saved graph.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        match &self.state {
            State::Ready { last_updated, .. } => Some(*last_updated),
            State::Empty => None,
        }
    }

    /// [`last_updated`](Self::last_updated) formatted as `YYYY-MM-DD HH:MM`.
    #[must_use]
    pub fn last_updated_display(&self) -> Option<String> {
        self.last_updated()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
    }

    /// Load the graph from `cache_path` unless one is already present.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Load`] if the file exists but is unreadable,
    /// corrupt, or structurally invalid. The service stays empty.
    #[instrument(skip(self), fields(path = %cache_path.display()))]
    pub fn load(&mut self, cache_path: &Path) -> Result<LoadOutcome, SummaryError> {
        if self.is_ready() {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let reader = match CacheReader::open(cache_path) {
            Ok(reader) => reader,
            Err(err) if err.is_not_found() => {
                info!("no dependency cache found");
                return Ok(LoadOutcome::Missing);
            }
            Err(err) => return Err(err.into()),
        };
        let index = reader.read_graph()?;
        let last_updated = modified_time(cache_path).unwrap_or_else(Local::now);

        info!(assets = index.len(), "dependency cache loaded");
        self.state = State::Ready {
            index,
            last_updated,
        };
        Ok(LoadOutcome::Loaded)
    }

    /// Build a fresh graph from `source`, replacing any current one.
    pub fn build<S>(
        &mut self,
        source: &S,
        options: &BuildOptions,
        progress: &dyn ProgressSink,
    ) -> BuildReport
    where
        S: AssetSource + ?Sized,
    {
        let output = build_graph(source, options, progress);
        self.state = State::Ready {
            index: output.index,
            last_updated: Local::now(),
        };
        output.report
    }

    /// Write the current graph to `cache_path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::NotReady`] when no graph is loaded, or
    /// [`SummaryError::Save`] when encoding or writing fails.
    #[instrument(skip(self), fields(path = %cache_path.display()))]
    pub fn save(&mut self, cache_path: &Path) -> Result<CacheStats, SummaryError> {
        let State::Ready {
            index,
            last_updated,
        } = &mut self.state
        else {
            return Err(SummaryError::NotReady);
        };

        let stats = CacheWriter::new(index).write_to_file(cache_path)?;
        match modified_time(cache_path) {
            Some(mtime) => *last_updated = mtime,
            None => warn!("could not read cache modification time"),
        }
        info!(bytes = stats.file_size_bytes, "dependency cache saved");
        Ok(stats)
    }

    /// Look up an asset by path. `None` when empty or the path is unknown.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<AssetView<'_>> {
        self.graph()?.lookup(path)
    }
}

fn modified_time(path: &Path) -> Option<DateTime<Local>> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::<Local>::from)
}
