//! Collaborator interfaces consumed by the graph builder.
//!
//! The builder never talks to a project database directly. It asks an
//! [`AssetSource`] to enumerate candidate paths, classify folders, and answer
//! "what does this path directly depend on", and it reports progress to an
//! optional [`ProgressSink`].

pub mod manifest;

use std::fmt;

pub use manifest::ManifestSource;

/// Errors raised by an [`AssetSource`].
///
/// The builder recovers from every variant locally: the affected root is
/// skipped or the affected asset gets an empty `uses` list.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A search root does not exist in the source.
    #[error("search root {0:?} is not reachable")]
    UnreachableRoot(String),

    /// The source has no record of the requested asset.
    #[error("asset {0:?} is unknown to the dependency source")]
    UnknownAsset(String),

    /// The source failed for an external reason.
    #[error("dependency source unavailable for {path:?}: {reason}")]
    Unavailable { path: String, reason: String },
}

impl SourceError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> crate::error::ErrorCode {
        crate::error::ErrorCode::SourceUnavailable
    }
}

/// The project database, seen from the graph builder.
pub trait AssetSource {
    /// List candidate asset paths under `roots`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the roots cannot be enumerated.
    fn enumerate_assets(&self, roots: &[String]) -> Result<Vec<String>, SourceError>;

    /// Returns true when `path` names a folder rather than a file.
    fn is_folder(&self, path: &str) -> bool;

    /// Direct (non-transitive) dependencies of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails for this path.
    fn direct_dependencies(&self, path: &str) -> Result<Vec<String>, SourceError>;
}

impl<S: AssetSource + ?Sized> AssetSource for &S {
    fn enumerate_assets(&self, roots: &[String]) -> Result<Vec<String>, SourceError> {
        (**self).enumerate_assets(roots)
    }

    fn is_folder(&self, path: &str) -> bool {
        (**self).is_folder(path)
    }

    fn direct_dependencies(&self, path: &str) -> Result<Vec<String>, SourceError> {
        (**self).direct_dependencies(path)
    }
}

/// Build phases reported to a [`ProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Enumerate,
    Resolve,
    Invert,
    Setup,
}

impl Phase {
    /// Stable lowercase name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enumerate => "enumerate",
            Self::Resolve => "resolve",
            Self::Invert => "invert",
            Self::Setup => "setup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer for build progress. Purely observational.
pub trait ProgressSink {
    /// Called with the current phase, the item being processed (may be
    /// empty) and the completed fraction in `0.0..=1.0`.
    fn report(&self, phase: Phase, item: &str, fraction: f32);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _phase: Phase, _item: &str, _fraction: f32) {}
}

/// Forwards progress to `tracing` at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, phase: Phase, item: &str, fraction: f32) {
        tracing::trace!(%phase, item, fraction, "build progress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(Phase, String)>>);

    impl ProgressSink for Recorder {
        fn report(&self, phase: Phase, item: &str, _fraction: f32) {
            self.0.borrow_mut().push((phase, item.to_string()));
        }
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(Phase::Enumerate.to_string(), "enumerate");
        assert_eq!(Phase::Resolve.as_str(), "resolve");
        assert_eq!(Phase::Invert.as_str(), "invert");
        assert_eq!(Phase::Setup.as_str(), "setup");
    }

    #[test]
    fn sinks_accept_reports() {
        NoProgress.report(Phase::Enumerate, "", 1.0);
        TracingProgress.report(Phase::Resolve, "Assets/A.mat", 0.5);

        let recorder = Recorder::default();
        recorder.report(Phase::Invert, "x", 1.0);
        assert_eq!(recorder.0.borrow().as_slice(), [(Phase::Invert, "x".to_string())]);
    }

    #[test]
    fn source_errors_map_to_source_unavailable() {
        let err = SourceError::UnknownAsset("Assets/missing.png".into());
        assert_eq!(err.code(), crate::error::ErrorCode::SourceUnavailable);
        assert!(err.to_string().contains("Assets/missing.png"));
    }
}
