use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ManifestInvalid,
    SourceUnavailable,
    CacheMissing,
    CacheCorrupt,
    InvariantViolation,
    NotReady,
    AssetNotFound,
    CacheWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::ManifestInvalid => "E1002",
            Self::SourceUnavailable => "E2001",
            Self::CacheMissing => "E3001",
            Self::CacheCorrupt => "E3002",
            Self::InvariantViolation => "E3003",
            Self::NotReady => "E4001",
            Self::AssetNotFound => "E4002",
            Self::CacheWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ManifestInvalid => "Dependency manifest is invalid",
            Self::SourceUnavailable => "Dependency source unavailable",
            Self::CacheMissing => "No dependency cache found",
            Self::CacheCorrupt => "Dependency cache is corrupt",
            Self::InvariantViolation => "Dependency graph invariant violated",
            Self::NotReady => "No dependency graph loaded",
            Self::AssetNotFound => "Asset not found in dependency graph",
            Self::CacheWriteFailed => "Dependency cache write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .assetdeps/config.toml and retry."),
            Self::ManifestInvalid => {
                Some("Re-export the dependency manifest from the project database.")
            }
            Self::SourceUnavailable => None,
            Self::CacheMissing | Self::NotReady => {
                Some("Run `adeps build` to create the dependency cache.")
            }
            Self::CacheCorrupt | Self::InvariantViolation => {
                Some("Run `adeps build` to rebuild the dependency cache from scratch.")
            }
            Self::AssetNotFound => Some("Check the asset path, or rebuild if the asset is new."),
            Self::CacheWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
