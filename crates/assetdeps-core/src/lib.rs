//! assetdeps-core library.
//!
//! Builds a "uses" / "used by" dependency graph over the assets of a
//! project, keyed by dense interned identifiers, and persists it as a
//! compact binary cache.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at module boundaries, `anyhow::Result`
//!   where file I/O is involved.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod intern;
pub mod source;
pub mod summary;

pub use cache::{CacheError, CacheReader, CacheReaderError, CacheStats, CacheWriter};
pub use config::{ProjectConfig, UserConfig};
pub use error::ErrorCode;
pub use graph::{
    AssetId, AssetRecord, AssetView, BuildOptions, BuildOutput, BuildReport, GraphIndex,
    InvariantError, build_graph,
};
pub use intern::PathInterner;
pub use source::{
    AssetSource, ManifestSource, NoProgress, Phase, ProgressSink, SourceError, TracingProgress,
};
pub use summary::{LoadOutcome, SummaryError, SummaryService};
